use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};
use xthreads_core::{CoreError, LlmError};

const OPENAI_API_URL: &str = "https://api.openai.com/v1";
const PROVIDER: &str = "openai";

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, CoreError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Chat completions client for OpenAI-compatible endpoints.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    http: Client,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, model: &str) -> Result<Self, CoreError> {
        if api_key.trim().is_empty() {
            return Err(LlmError::InvalidApiKey {
                provider: PROVIDER.to_string(),
            }
            .into());
        }
        let http = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            http,
            base_url: OPENAI_API_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for OpenAiProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, CoreError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        debug!(model = %self.model, "OpenAI chat request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CoreError::from(LlmError::RequestTimeout {
                        provider: PROVIDER.to_string(),
                    })
                } else {
                    CoreError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("OpenAI API error ({})", status);
            let err = match status.as_u16() {
                401 => LlmError::AuthenticationFailed {
                    provider: PROVIDER.to_string(),
                },
                404 => LlmError::ModelNotAvailable {
                    model: self.model.clone(),
                },
                429 => {
                    let retry_after = response
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok())
                        .unwrap_or(20);
                    warn!("OpenAI rate limited, retry after {} seconds", retry_after);
                    LlmError::RateLimitExceeded {
                        provider: PROVIDER.to_string(),
                        retry_after,
                    }
                }
                code if code >= 500 => LlmError::ServiceUnavailable {
                    provider: PROVIDER.to_string(),
                    status_code: code,
                },
                _ => LlmError::RequestRejected {
                    provider: PROVIDER.to_string(),
                    details: response.text().await.unwrap_or_default(),
                },
            };
            return Err(err.into());
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            error!("Failed to parse OpenAI response: {}", e);
            LlmError::InvalidResponseFormat {
                provider: PROVIDER.to_string(),
            }
        })?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| {
                LlmError::InvalidResponseFormat {
                    provider: PROVIDER.to_string(),
                }
                .into()
            })
    }
}
