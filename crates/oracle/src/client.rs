use crate::error::Result;
use async_trait::async_trait;

/// One request to a text-completion backend.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// Request in, text out. Implementations hold no per-analysis state.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Short name used in logs.
    fn label(&self) -> &str {
        "oracle"
    }
}
