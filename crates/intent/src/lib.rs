//! # RealityCheck Intent
//!
//! Deterministic segmentation of free-form spec and plan documents into
//! line-accurate, ordered units of declared intent.
//!
//! ## Pipeline
//!
//! ```text
//! SPEC.md / PLAN.md
//!     │
//!     ├──> Line classifiers (heading, fence, list, decorator)
//!     │
//!     └──> Segmenter (single forward scan)
//!            ├─> flush on heading / blank / decorator
//!            ├─> list item + indented continuation
//!            └─> Item { id, line_start, line_end, text }
//! ```
//!
//! ## Example
//!
//! ```
//! use realitycheck_intent::spec_segmenter;
//!
//! let items = spec_segmenter().segment_str("## Rules\n1. Cache reads\n   - with a TTL\n");
//! assert_eq!(items.len(), 1);
//! assert_eq!(items[0].id, "SPEC-001");
//! assert_eq!(items[0].text, "Cache reads\n- with a TTL");
//! ```

mod dialect;
mod error;
pub mod markdown;
mod segment;

pub use dialect::{
    parse_plan, parse_spec, plan_segmenter, spec_segmenter, PLAN_ID_PREFIX, SPEC_ID_PREFIX,
};
pub use error::{IntentError, Result};
pub use segment::{Item, ItemMatcher, PrefixStripper, Segmenter};
