//! Chat relay handler.
//!
//! Appends the caller's message to the shared conversation history, relays
//! the windowed history to the chat upstream, and records the reply.

use crate::errors::RelayError;
use crate::models::TextResponse;
use crate::routes::AppState;
use crate::services::ChatMessage;
use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

/// Request body for POST /chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's message. Whitespace-only messages are rejected.
    #[serde(default)]
    pub message: String,
}

/// Handler for POST /chat
///
/// Relays the conversation to the chat completion upstream and returns the
/// assistant's reply. History is shared across all callers and survives for
/// the lifetime of the process.
///
/// ## Errors
///
/// - 400 if the message is empty after trimming
/// - 500 if no chat API key is configured
/// - 502 if the upstream call fails
#[instrument(skip_all, name = "relay.handlers.chat")]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<TextResponse>, RelayError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(RelayError::BadRequest("Message is required".to_string()));
    }

    // Snapshot the history for the upstream call; the lock is never held
    // across an await
    let window = {
        let mut history = state.chat_history.lock().await;
        history.push(ChatMessage::user(message));
        history.clone()
    };

    let reply = state.chat.complete(&window).await?;

    {
        let mut history = state.chat_history.lock().await;
        history.push(ChatMessage::assistant(reply.clone()));
    }

    Ok(Json(TextResponse { response: reply }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    // Handler behavior against a mocked upstream is covered by integration
    // tests; unit tests exercise request parsing.

    #[test]
    fn test_chat_request_deserialization() {
        let request: ChatRequest = serde_json::from_str(r#"{"message":"hello"}"#).unwrap();
        assert_eq!(request.message, "hello");
    }

    #[test]
    fn test_chat_request_missing_message_defaults_empty() {
        let request: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(request.message.is_empty());
    }
}
