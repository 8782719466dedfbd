use crate::validate::ValidationError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure to obtain a completion from a provider.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("{env} is not set")]
    MissingApiKey { env: &'static str },

    #[error("unknown provider {0:?} (available: anthropic, openai, google, replay)")]
    UnknownProvider(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} response could not be decoded: {reason}")]
    Envelope {
        provider: &'static str,
        reason: String,
    },

    #[error("{provider} {reason}")]
    EmptyCompletion {
        provider: &'static str,
        reason: &'static str,
    },

    #[error("failed to read replay response {}: {source}", path.display())]
    ReplayRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("replay provider has no response left for call {call} ({available} recorded)")]
    ReplayExhausted { call: usize, available: usize },
}

/// Terminal outcome of an analysis that produced no report.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("oracle call {call} did not finish within {}s", timeout.as_secs())]
    Timeout { call: usize, timeout: Duration },

    #[error("invalid model output after repair attempt: {}", join_errors(.errors))]
    InvalidOutput { errors: Vec<ValidationError> },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("unknown profile {name:?} (available: {})", crate::profile::BUILTIN_PROFILE_NAMES.join(", "))]
    Unknown { name: String },

    #[error("failed to read profile file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("profile {name:?} is not valid JSON or TOML: {reason}")]
    Malformed { name: String, reason: String },

    #[error("profile {name:?} has unknown keys: {}", keys.join(", "))]
    UnknownKeys { name: String, keys: Vec<String> },
}

pub type Result<T> = std::result::Result<T, OracleError>;
