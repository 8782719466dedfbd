//! Provider backends behind the [`Oracle`] trait.

mod anthropic;
mod google;
mod openai;
mod replay;

pub use anthropic::AnthropicOracle;
pub use google::GoogleOracle;
pub use openai::OpenAiOracle;
pub use replay::ReplayOracle;

use crate::client::Oracle;
use crate::error::{OracleError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Error bodies are cut to this many characters in messages.
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Anthropic,
    OpenAi,
    Google,
    Replay,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Anthropic,
        ProviderKind::OpenAi,
        ProviderKind::Google,
        ProviderKind::Replay,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Google => "google",
            ProviderKind::Replay => "replay",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "claude-opus-4-6",
            ProviderKind::OpenAi => "gpt-4o",
            ProviderKind::Google => "gemini-2.0-flash",
            ProviderKind::Replay => "replay",
        }
    }

    /// Environment variable holding the API key; `None` for keyless providers.
    pub fn api_key_env(self) -> Option<&'static str> {
        match self {
            ProviderKind::Anthropic => Some("ANTHROPIC_API_KEY"),
            ProviderKind::OpenAi => Some("OPENAI_API_KEY"),
            ProviderKind::Google => Some("GOOGLE_API_KEY"),
            ProviderKind::Replay => None,
        }
    }
}

impl FromStr for ProviderKind {
    type Err = OracleError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| OracleError::UnknownProvider(s.to_string()))
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to construct a backend.
#[derive(Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub model: String,
    pub api_key: Option<String>,
    /// Canned responses for [`ProviderKind::Replay`], served in order.
    pub replay_responses: Vec<PathBuf>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("replay_responses", &self.replay_responses)
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            model: kind.default_model().to_string(),
            api_key: None,
            replay_responses: Vec::new(),
        }
    }

    /// Reads the API key from the provider's environment variable.
    #[must_use]
    pub fn with_api_key_from_env(mut self) -> Self {
        self.api_key = self
            .kind
            .api_key_env()
            .and_then(|env| std::env::var(env).ok())
            .filter(|key| !key.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_replay_responses(mut self, paths: Vec<PathBuf>) -> Self {
        self.replay_responses = paths;
        self
    }

    fn require_api_key(&self) -> Result<String> {
        match (&self.api_key, self.kind.api_key_env()) {
            (Some(key), _) => Ok(key.clone()),
            (None, Some(env)) => Err(OracleError::MissingApiKey { env }),
            (None, None) => Ok(String::new()),
        }
    }
}

/// Constructs the backend selected by `config`.
pub fn build_oracle(config: &ProviderConfig) -> Result<Box<dyn Oracle>> {
    log::debug!("Building {} oracle (model {})", config.kind, config.model);
    let oracle: Box<dyn Oracle> = match config.kind {
        ProviderKind::Anthropic => Box::new(AnthropicOracle::new(
            config.require_api_key()?,
            config.model.clone(),
        )?),
        ProviderKind::OpenAi => Box::new(OpenAiOracle::new(
            config.require_api_key()?,
            config.model.clone(),
        )?),
        ProviderKind::Google => Box::new(GoogleOracle::new(
            config.require_api_key()?,
            config.model.clone(),
        )?),
        ProviderKind::Replay => Box::new(ReplayOracle::from_files(&config.replay_responses)?),
    };
    Ok(oracle)
}

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("realitycheck/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(OracleError::Client)
}

/// Sends a JSON body and decodes a JSON reply, keeping the error body of
/// non-success statuses.
async fn post_json<B, R>(
    provider: &'static str,
    request: reqwest::RequestBuilder,
    body: &B,
) -> Result<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = request
        .json(body)
        .send()
        .await
        .map_err(|source| OracleError::Transport { provider, source })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(OracleError::Status {
            provider,
            status: status.as_u16(),
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        });
    }

    let text = response
        .text()
        .await
        .map_err(|source| OracleError::Transport { provider, source })?;
    serde_json::from_str(&text).map_err(|err| OracleError::Envelope {
        provider,
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn provider_names_parse_case_insensitively() {
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!(" google ".parse::<ProviderKind>().unwrap(), ProviderKind::Google);
        let err = "mistral".parse::<ProviderKind>().unwrap_err();
        assert!(err.to_string().contains("mistral"), "{err}");
    }

    #[test]
    fn http_providers_need_a_key() {
        let config = ProviderConfig::new(ProviderKind::Anthropic);
        let err = build_oracle(&config).err().expect("missing key");
        assert!(matches!(
            err,
            OracleError::MissingApiKey {
                env: "ANTHROPIC_API_KEY"
            }
        ));
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let mut config = ProviderConfig::new(ProviderKind::OpenAi);
        config.api_key = Some("sk-secret".to_string());
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn defaults_follow_the_provider() {
        assert_eq!(ProviderConfig::new(ProviderKind::Google).model, "gemini-2.0-flash");
        assert_eq!(ProviderKind::Replay.api_key_env(), None);
    }
}
