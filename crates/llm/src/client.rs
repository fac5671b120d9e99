use std::time::Duration;

use pmos_core::{env_parse_with_default, extract_json_block};
use serde::de::DeserializeOwned;

use crate::ai_types::{ChatRequest, ChatResponse, Message, ResponseFormat, ResponseMessage, Tool};
use crate::error::LlmError;

/// Default LLM model to use.
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";
/// Per-request timeout against the gateway.
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

const MAX_RETRIES: usize = 3;
const RETRY_DELAYS_SECS: [u64; MAX_RETRIES + 1] = [0, 1, 2, 4];

/// Client for LLM API calls.
pub struct LlmClient {
    pub(crate) client: reqwest::Client,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    pub(crate) model: String,
    retry_delays: [Duration; MAX_RETRIES + 1],
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("client", &self.client)
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl LlmClient {
    /// Creates a new LLM client with the given API key and base URL.
    ///
    /// The model comes from `PMOS_MODEL` when set.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(api_key: String, base_url: String) -> Result<Self, LlmError> {
        let model = std::env::var("PMOS_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_owned());
        let timeout = env_parse_with_default("PMOS_LLM_TIMEOUT_SECS", REQUEST_TIMEOUT_SECS);
        let base_url = base_url.trim_end_matches('/').to_owned();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .map_err(|e| LlmError::ClientInit(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            base_url,
            model,
            retry_delays: RETRY_DELAYS_SECS.map(Duration::from_secs),
        })
    }

    /// Sets a custom model for this client.
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Scales every retry delay by `unit` instead of one second.
    #[must_use]
    pub fn with_retry_unit(mut self, unit: Duration) -> Self {
        self.retry_delays = RETRY_DELAYS_SECS.map(|n| unit.saturating_mul(n as u32));
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    pub(crate) fn request(&self, messages: Vec<Message>) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages,
            response_format: None,
            tools: Vec::new(),
            tool_choice: None,
        }
    }

    /// Send a chat completion request and return the first choice's message.
    ///
    /// Transient failures (transport errors, 500/502/503/529) are retried.
    /// 429 and 402 are returned immediately as `RateLimited` / `PaymentRequired`.
    pub(crate) async fn send(&self, request: &ChatRequest) -> Result<ResponseMessage, LlmError> {
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let delay = self.retry_delays.get(attempt).copied().unwrap_or_default();
                tokio::time::sleep(delay).await;
                tracing::warn!("LLM retry attempt {attempt}/{MAX_RETRIES} after {delay:?}");
            }

            let response_result = self
                .client
                .post(format!("{}/v1/chat/completions", self.base_url))
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(request)
                .send()
                .await;

            let response = match response_result {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::HttpRequest(e));
                    continue;
                },
            };

            let status = response.status();
            if status.is_success() {
                let body = match response.text().await {
                    Ok(b) => b,
                    Err(e) => {
                        last_error = Some(LlmError::HttpRequest(e));
                        continue;
                    },
                };

                let chat_response: ChatResponse =
                    serde_json::from_str(&body).map_err(|e| LlmError::JsonParse {
                        context: format!(
                            "chat completion response (body: {})",
                            truncate(&body, 200)
                        ),
                        source: e,
                    })?;

                return chat_response
                    .choices
                    .into_iter()
                    .next()
                    .map(|choice| choice.message)
                    .ok_or(LlmError::EmptyResponse);
            }

            let status_code = status.as_u16();
            let body =
                response.text().await.unwrap_or_else(|_| "Could not read error body".to_owned());

            let err = match status_code {
                429 => return Err(LlmError::RateLimited(body)),
                402 => return Err(LlmError::PaymentRequired(body)),
                code => LlmError::HttpStatus { code, body },
            };
            if err.is_transient() {
                last_error = Some(err);
                continue;
            }
            return Err(err);
        }

        Err(LlmError::RetriesExhausted(Box::new(last_error.unwrap_or(LlmError::EmptyResponse))))
    }

    /// Plain completion: the text of the first choice.
    pub(crate) async fn chat_completion(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let message = self.send(request).await?;
        message
            .content
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty())
            .ok_or(LlmError::EmptyResponse)
    }

    /// Completion expected to be a JSON document in the message text.
    pub(crate) async fn json_completion<T: DeserializeOwned>(
        &self,
        mut request: ChatRequest,
        context: &str,
    ) -> Result<T, LlmError> {
        request.response_format = Some(ResponseFormat::json_object());
        let content = self.chat_completion(&request).await?;
        parse_json_text(&content, context)
    }

    /// Forces a call to `tool` and deserializes its arguments.
    ///
    /// Falls back to JSON found in the message text when the gateway ignores
    /// `tool_choice` and answers in prose.
    pub(crate) async fn tool_completion<T: DeserializeOwned>(
        &self,
        mut request: ChatRequest,
        tool: Tool,
    ) -> Result<T, LlmError> {
        let name = tool.function.name;
        request.tool_choice = Some(tool.forced_choice());
        request.tools = vec![tool];
        let message = self.send(&request).await?;

        let call = message
            .tool_calls
            .iter()
            .find(|c| c.function.name == name)
            .or_else(|| message.tool_calls.first());
        if let Some(call) = call {
            return serde_json::from_str(&call.function.arguments).map_err(|e| {
                LlmError::JsonParse {
                    context: format!(
                        "{name} arguments ({})",
                        truncate(&call.function.arguments, 300)
                    ),
                    source: e,
                }
            });
        }

        match message.content.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            Some(content) => {
                tracing::debug!(tool = name, "no tool call in response, parsing message text");
                parse_json_text(content, name)
            },
            None => Err(LlmError::MissingToolCall(name.to_owned())),
        }
    }
}

fn parse_json_text<T: DeserializeOwned>(content: &str, context: &str) -> Result<T, LlmError> {
    let json = extract_json_block(content);
    serde_json::from_str(json).map_err(|e| LlmError::JsonParse {
        context: format!("{context} ({})", truncate(json, 300)),
        source: e,
    })
}

/// Truncates a string to the given maximum length at a char boundary.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end = end.saturating_sub(1);
        }
        s.get(..end).unwrap_or("")
    }
}
