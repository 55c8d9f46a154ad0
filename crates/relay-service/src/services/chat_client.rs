//! Chat completion client for the OpenAI-compatible upstream.
//!
//! Relays conversation turns to the configured chat completion endpoint
//! with a fixed system prompt and a bounded history window.
//!
//! # Security
//!
//! - The API key is held as a `SecretString` and never logged
//! - Timeouts prevent hanging connections
//! - Upstream errors are logged server-side with generic messages returned

use crate::errors::RelayError;
use crate::observability::metrics::record_upstream_request;
use common::secret::{ExposeSecret, SecretString};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{error, instrument, warn};

/// Model requested from the chat completion upstream.
const CHAT_MODEL: &str = "llama3-70b-8192";

/// System prompt prepended to every completion request.
const SYSTEM_PROMPT: &str = "You are Nova X, a helpful AI assistant.";

/// Number of most recent history messages sent upstream.
const HISTORY_WINDOW: usize = 12;

/// Timeout for chat completion requests in seconds.
const CHAT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// A single conversation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role ("system", "user", or "assistant").
    pub role: String,

    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// A message from the end user.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// A message from the assistant.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }

    fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for the chat completion endpoint.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: &'static str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    stream: bool,
}

/// Response body from the chat completion endpoint.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// HTTP client for the chat completion upstream.
#[derive(Clone)]
pub struct ChatClient {
    /// HTTP client with configured timeouts.
    client: Client,

    /// Chat completion endpoint URL.
    api_url: String,

    /// Upstream API key, if configured.
    api_key: Option<SecretString>,
}

impl ChatClient {
    /// Create a new chat client.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Internal` if the HTTP client cannot be built.
    pub fn new(api_url: String, api_key: Option<SecretString>) -> Result<Self, RelayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(CHAT_REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| {
                error!(target: "relay.services.chat", error = %e, "Failed to build HTTP client");
                RelayError::Internal
            })?;

        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }

    /// Request a completion for the given conversation history.
    ///
    /// Sends the fixed system prompt plus the last [`HISTORY_WINDOW`]
    /// messages of `history` and returns the assistant's reply text.
    ///
    /// # Errors
    ///
    /// - `RelayError::MissingApiKey` if no API key is configured
    /// - `RelayError::Upstream` if the endpoint is unreachable, returns a
    ///   non-success status, or the response cannot be parsed
    #[instrument(skip_all, fields(history_len = history.len()))]
    pub async fn complete(&self, history: &[ChatMessage]) -> Result<String, RelayError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(RelayError::MissingApiKey("chat"))?;

        let window_start = history.len().saturating_sub(HISTORY_WINDOW);
        let mut messages = Vec::with_capacity(HISTORY_WINDOW + 1);
        messages.push(ChatMessage::system(SYSTEM_PROMPT));
        messages.extend(history.iter().skip(window_start).cloned());

        let request = ChatCompletionRequest {
            model: CHAT_MODEL,
            messages,
            temperature: 1.0,
            max_tokens: 1024,
            top_p: 1.0,
            stream: false,
        };

        let start = Instant::now();
        let result = self.send_completion(&request, api_key).await;
        let status = if result.is_ok() { "success" } else { "error" };
        record_upstream_request("chat", status, start.elapsed());

        result
    }

    async fn send_completion(
        &self,
        request: &ChatCompletionRequest,
        api_key: &SecretString,
    ) -> Result<String, RelayError> {
        let response = self
            .client
            .post(&self.api_url)
            .header(
                "Authorization",
                format!("Bearer {}", api_key.expose_secret()),
            )
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(target: "relay.services.chat", error = %e, "Chat upstream request failed");
                RelayError::Upstream {
                    service: "chat",
                    reason: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(target: "relay.services.chat", status = %status, "Chat upstream returned error");
            return Err(RelayError::Upstream {
                service: "chat",
                reason: format!("status {status}"),
            });
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!(target: "relay.services.chat", error = %e, "Failed to parse chat response");
            RelayError::Upstream {
                service: "chat",
                reason: "malformed response".to_string(),
            }
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                error!(target: "relay.services.chat", "Chat response contained no choices");
                RelayError::Upstream {
                    service: "chat",
                    reason: "empty choices".to_string(),
                }
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn completion_body(reply: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": reply},
                "finish_reason": "stop"
            }]
        })
    }

    #[test]
    fn test_chat_message_constructors() {
        assert_eq!(ChatMessage::user("hi").role, "user");
        assert_eq!(ChatMessage::assistant("hello").role, "assistant");
        assert_eq!(ChatMessage::system("prompt").role, "system");
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatCompletionRequest {
            model: CHAT_MODEL,
            messages: vec![ChatMessage::user("hi")],
            temperature: 1.0,
            max_tokens: 1024,
            top_p: 1.0,
            stream: false,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3-70b-8192");
        assert_eq!(json["max_tokens"], 1024);
        assert_eq!(json["stream"], false);
    }

    #[tokio::test]
    async fn test_complete_returns_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer gsk-test"))
            .and(body_partial_json(
                serde_json::json!({"model": "llama3-70b-8192"}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Hi there!")))
            .mount(&server)
            .await;

        let client = ChatClient::new(
            format!("{}/chat/completions", server.uri()),
            Some(SecretString::from("gsk-test")),
        )
        .unwrap();

        let reply = client.complete(&[ChatMessage::user("hello")]).await.unwrap();
        assert_eq!(reply, "Hi there!");
    }

    #[tokio::test]
    async fn test_complete_sends_system_prompt_first() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
            .mount(&server)
            .await;

        let client = ChatClient::new(server.uri(), Some(SecretString::from("k"))).unwrap();
        client.complete(&[ChatMessage::user("hello")]).await.unwrap();

        let requests: Vec<Request> = server.received_requests().await.unwrap();
        let body: serde_json::Value =
            serde_json::from_slice(&requests.first().unwrap().body).unwrap();
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(
            body["messages"][0]["content"],
            "You are Nova X, a helpful AI assistant."
        );
        assert_eq!(body["messages"][1]["role"], "user");
    }

    #[tokio::test]
    async fn test_complete_windows_history_to_last_twelve() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
            .mount(&server)
            .await;

        let client = ChatClient::new(server.uri(), Some(SecretString::from("k"))).unwrap();

        let history: Vec<ChatMessage> = (0..20).map(|i| ChatMessage::user(format!("m{i}"))).collect();
        client.complete(&history).await.unwrap();

        let requests: Vec<Request> = server.received_requests().await.unwrap();
        let body: serde_json::Value =
            serde_json::from_slice(&requests.first().unwrap().body).unwrap();
        let messages = body["messages"].as_array().unwrap();

        // System prompt plus the last 12 of 20 history messages
        assert_eq!(messages.len(), 13);
        assert_eq!(messages[1]["content"], "m8");
        assert_eq!(messages[12]["content"], "m19");
    }

    #[tokio::test]
    async fn test_complete_without_api_key() {
        let client = ChatClient::new("http://127.0.0.1:1".to_string(), None).unwrap();

        let result = client.complete(&[ChatMessage::user("hi")]).await;
        assert!(matches!(result, Err(RelayError::MissingApiKey("chat"))));
    }

    #[tokio::test]
    async fn test_complete_upstream_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = ChatClient::new(server.uri(), Some(SecretString::from("k"))).unwrap();

        let result = client.complete(&[ChatMessage::user("hi")]).await;
        assert!(matches!(
            result,
            Err(RelayError::Upstream { service: "chat", .. })
        ));
    }

    #[tokio::test]
    async fn test_complete_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": []
            })))
            .mount(&server)
            .await;

        let client = ChatClient::new(server.uri(), Some(SecretString::from("k"))).unwrap();

        let result = client.complete(&[ChatMessage::user("hi")]).await;
        assert!(matches!(result, Err(RelayError::Upstream { .. })));
    }
}
