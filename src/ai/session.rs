use super::cascade::ModelCascade;
use super::error::ChatError;
use crate::types::{ChatMessage, Role};

pub const WELCOME_MESSAGE: &str = "Hi! I'm your AI sports assistant. I can help you with football matches, players, teams, and more. What would you like to know?";

pub const NOT_CONFIGURED_MESSAGE: &str = "⚠️ API key not configured. Add GEMINI_API_KEY to your environment or .env file to use the AI assistant.";

/// Transcript for one chat session. Kept in memory only.
pub struct ChatSession {
    cascade: Option<ModelCascade>,
    messages: Vec<ChatMessage>,
    /// Answered question/reply pairs; the only part of the transcript the
    /// model sees as history.
    exchanges: Vec<ChatMessage>,
}

impl ChatSession {
    /// `None` means no API key is configured; the session then only shows a
    /// notice and refuses to send.
    pub fn new(cascade: Option<ModelCascade>) -> Self {
        let greeting = if cascade.is_some() {
            WELCOME_MESSAGE
        } else {
            NOT_CONFIGURED_MESSAGE
        };
        Self {
            cascade,
            messages: vec![ChatMessage::assistant(greeting)],
            exchanges: Vec::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.cascade.is_some()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Sends `input` and returns the assistant message appended for it.
    /// Returns `None` without touching the transcript for blank input or an
    /// unconfigured session.
    pub async fn send(&mut self, input: &str) -> Option<&ChatMessage> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }
        let cascade = self.cascade.as_ref()?;

        let question = ChatMessage::user(text);
        self.messages.push(question.clone());

        let reply = match cascade.resolve(text, &self.exchanges).await {
            Ok(content) => {
                let reply = ChatMessage::new(Role::Assistant, content);
                self.exchanges.push(question);
                self.exchanges.push(reply.clone());
                reply
            }
            Err(err) => {
                tracing::warn!(error = %err, retryable = err.is_retryable(), "chat request failed");
                ChatMessage::assistant(error_reply(&err))
            }
        };

        self.messages.push(reply);
        self.messages.last()
    }
}

fn error_reply(err: &ChatError) -> String {
    format!("Sorry, I encountered an error: {err}. Please try again.")
}
