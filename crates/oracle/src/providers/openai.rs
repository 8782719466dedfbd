use super::{http_client, post_json};
use crate::client::{CompletionRequest, Oracle};
use crate::error::{OracleError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const PROVIDER: &str = "openai";
const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI Chat Completions API.
pub struct OpenAiOracle {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiOracle {
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Ok(Self {
            http: http_client()?,
            api_key,
            model,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn first_choice(response: ChatResponse) -> Result<String> {
    let Some(choice) = response.choices.into_iter().next() else {
        return Err(OracleError::EmptyCompletion {
            provider: PROVIDER,
            reason: "response contained no choices",
        });
    };
    match choice.message.content {
        Some(content) if !content.is_empty() => Ok(content),
        _ => Err(OracleError::EmptyCompletion {
            provider: PROVIDER,
            reason: "response choice had empty content",
        }),
    }
}

#[async_trait]
impl Oracle for OpenAiOracle {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };
        let builder = self
            .http
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key);
        let response: ChatResponse = post_json(PROVIDER, builder, &body).await?;
        first_choice(response)
    }

    fn label(&self) -> &str {
        PROVIDER
    }
}
