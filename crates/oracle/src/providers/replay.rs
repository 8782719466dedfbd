use crate::client::{CompletionRequest, Oracle};
use crate::error::{OracleError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves recorded responses in order, one per call. Used for offline runs
/// and for exercising the pipeline without a network.
pub struct ReplayOracle {
    responses: Vec<String>,
    next: AtomicUsize,
}

impl ReplayOracle {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses,
            next: AtomicUsize::new(0),
        }
    }

    /// Reads every file up front so a bad path fails before any call.
    pub fn from_files(paths: &[PathBuf]) -> Result<Self> {
        let responses = paths
            .iter()
            .map(|path| {
                std::fs::read_to_string(path).map_err(|source| OracleError::ReplayRead {
                    path: path.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        log::debug!("Loaded {} replay responses", responses.len());
        Ok(Self::new(responses))
    }

    pub fn calls(&self) -> usize {
        self.next.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Oracle for ReplayOracle {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
        let call = self.next.fetch_add(1, Ordering::SeqCst);
        self.responses
            .get(call)
            .cloned()
            .ok_or(OracleError::ReplayExhausted {
                call: call + 1,
                available: self.responses.len(),
            })
    }

    fn label(&self) -> &str {
        "replay"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn request() -> CompletionRequest {
        CompletionRequest {
            system: String::new(),
            user: String::new(),
            max_tokens: 1,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn serves_responses_in_order_then_runs_out() {
        let oracle = ReplayOracle::new(vec!["one".to_string(), "two".to_string()]);
        assert_eq!(oracle.complete(&request()).await.unwrap(), "one");
        assert_eq!(oracle.complete(&request()).await.unwrap(), "two");
        let err = oracle.complete(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            OracleError::ReplayExhausted {
                call: 3,
                available: 2
            }
        ));
        assert_eq!(oracle.calls(), 3);
    }

    #[test]
    fn missing_file_fails_at_construction() {
        let dir = tempdir().unwrap();
        let err = ReplayOracle::from_files(&[dir.path().join("absent.json")])
            .err()
            .expect("missing replay file");
        assert!(err.to_string().contains("absent.json"), "{err}");
    }
}
