/// Terminal outcomes of a chat request, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("Message is empty")]
    EmptyMessage,

    /// Bad, revoked or leaked credential. Retrying cannot help.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Gemini quota exceeded for every available model, wait a minute before retrying")]
    QuotaExceeded,

    #[error("Unable to get a response from Gemini. Attempts: {}", .attempts.join("; "))]
    Unavailable { attempts: Vec<String> },
}

impl ChatError {
    pub fn invalid_key(leaked: bool, detail: &str) -> Self {
        let reason = if leaked {
            "The Gemini API key was reported as leaked and has been disabled"
        } else {
            "The Gemini API key was rejected"
        };
        ChatError::Configuration(format!(
            "{reason} ({detail}). Generate a new key, update GEMINI_API_KEY and restart"
        ))
    }

    /// Only quota exhaustion is worth retrying later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ChatError::QuotaExceeded)
    }
}

pub type ChatResult<T> = Result<T, ChatError>;

/// Model listing failures. Never fatal to a chat request.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("model listing request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model listing returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model listing could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
}
