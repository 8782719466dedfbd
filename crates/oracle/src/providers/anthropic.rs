use super::{http_client, post_json};
use crate::client::{CompletionRequest, Oracle};
use crate::error::{OracleError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const PROVIDER: &str = "anthropic";
const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Anthropic Messages API.
pub struct AnthropicOracle {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl AnthropicOracle {
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Ok(Self {
            http: http_client()?,
            api_key,
            model,
        })
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Concatenates the text blocks; other block kinds are ignored.
fn collect_text(response: MessagesResponse) -> Result<String> {
    let mut text = String::new();
    let mut found = false;
    for block in response.content.into_iter().filter(|b| b.kind == "text") {
        text.push_str(&block.text);
        found = true;
    }
    if !found {
        return Err(OracleError::EmptyCompletion {
            provider: PROVIDER,
            reason: "response contained no text content blocks",
        });
    }
    Ok(text)
}

#[async_trait]
impl Oracle for AnthropicOracle {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: &request.system,
            messages: [Message {
                role: "user",
                content: &request.user,
            }],
        };
        let builder = self
            .http
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION);
        let response: MessagesResponse = post_json(PROVIDER, builder, &body).await?;
        collect_text(response)
    }

    fn label(&self) -> &str {
        PROVIDER
    }
}
