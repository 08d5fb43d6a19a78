//! Embedded assistant chat: the message history plus the send loop.

pub mod overlay;

use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::errors::ClientError;

/// Greeting shown before any exchange.
pub const GREETING: &str = "Hi! I can answer questions about your CV.";
/// Shown when the backend answered but carried no reply text.
const EMPTY_REPLY: &str = "Sorry, I didn't get that.";
/// Appended when the agent endpoint is unreachable.
const SEND_FAILED: &str = "Error talking to the agent. Try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One running conversation with the portfolio assistant.
pub struct ChatSession {
    client: ApiClient,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            messages: vec![ChatMessage::assistant(GREETING)],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Sends one user message and appends the exchange to the history.
    ///
    /// An empty message is rejected before any network call. A transport
    /// failure still leaves a visible assistant line in the history, then
    /// surfaces the error to the caller.
    pub async fn send(&mut self, text: &str) -> Result<String, ClientError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ClientError::Validation("message is required".into()));
        }
        self.messages.push(ChatMessage::user(text));
        match self.client.chat(text).await {
            Ok(reply) => {
                let reply = reply
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| EMPTY_REPLY.to_owned());
                self.messages.push(ChatMessage::assistant(reply.clone()));
                Ok(reply)
            }
            Err(e) => {
                self.messages.push(ChatMessage::assistant(SEND_FAILED));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::api::routes::RouteTable;
    use crate::api::transport::testing::ScriptedTransport;
    use crate::api::FailureMode;

    fn session(transport: Arc<ScriptedTransport>) -> ChatSession {
        ChatSession::new(ApiClient::with_transport(
            transport,
            RouteTable::new("http://test/api"),
            FailureMode::Silent,
        ))
    }

    #[test]
    fn test_history_starts_with_greeting() {
        let session = session(ScriptedTransport::new(vec![]));
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].role, Role::Assistant);
        assert_eq!(session.messages()[0].content, GREETING);
    }

    #[tokio::test]
    async fn test_empty_message_rejected_without_history_change() {
        let transport = ScriptedTransport::new(vec![]);
        let mut session = session(Arc::clone(&transport));

        let err = session.send("   ").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(session.messages().len(), 1);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_send_appends_user_and_assistant_messages() {
        let transport = ScriptedTransport::new(vec![ScriptedTransport::ok(
            200,
            json!({ "reply": "Four years of Rust." }),
        )]);
        let mut session = session(transport);

        let reply = session.send("  How much Rust?  ").await.unwrap();
        assert_eq!(reply, "Four years of Rust.");

        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "How much Rust?");
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[2].content, "Four years of Rust.");
    }

    #[tokio::test]
    async fn test_missing_reply_falls_back_to_placeholder() {
        let transport = ScriptedTransport::new(vec![ScriptedTransport::ok(200, json!({}))]);
        let mut session = session(transport);

        let reply = session.send("hello").await.unwrap();
        assert_eq!(reply, EMPTY_REPLY);
    }

    #[tokio::test]
    async fn test_transport_failure_leaves_error_line_and_surfaces() {
        let transport = ScriptedTransport::new(vec![Err(
            crate::api::transport::TransportError::Send("connection refused".into()),
        )]);
        let mut session = session(transport);

        let err = session.send("hello").await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));

        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].content, SEND_FAILED);
    }
}
