//! # RealityCheck Oracle
//!
//! Turns intent items and a code inventory into a validated
//! [`PartialReport`](realitycheck_protocol::PartialReport) by asking a
//! language-model backend.
//!
//! ## Flow
//!
//! ```text
//! Profile + strict ──> system prompt ─┐
//! Items + Index::summary() ──> user ──┼──> Oracle::complete ──> validate_response
//!                                     │                              │
//!                                     │          fatal? ── no ──> Analysis
//!                                     │            │
//!                                     └── repair prompt ──> Oracle::complete (last call)
//! ```
//!
//! Backends implement [`Oracle`]; [`build_oracle`] picks one from a
//! [`ProviderConfig`]. Tests and offline runs use [`ReplayOracle`].

mod analyze;
mod client;
mod error;
mod profile;
mod prompt;
mod providers;
mod validate;

pub use analyze::{
    analyze, Analysis, AnalysisRequest, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT,
};
pub use client::{CompletionRequest, Oracle};
pub use error::{AnalyzeError, OracleError, ProfileError, Result};
pub use profile::{load_profile, Profile, BUILTIN_PROFILE_NAMES};
pub use prompt::{build_repair_prompt, build_system_prompt, build_user_prompt};
pub use providers::{
    build_oracle, AnthropicOracle, GoogleOracle, OpenAiOracle, ProviderConfig, ProviderKind,
    ReplayOracle,
};
pub use validate::{
    repair_invalid_escapes, strip_enclosing_fence, validate_response, Validation,
    ValidationError, FIELD_JSON_PARSE, FIELD_REQUIRED,
};
