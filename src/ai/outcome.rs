use serde::Deserialize;

/// Result of a single (mechanism, version, model) attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallOutcome {
    Success { text: String },
    RateLimited,
    InvalidKey { leaked: bool },
    NotFound,
    OtherError { message: String },
}

impl CallOutcome {
    pub fn other(message: impl Into<String>) -> Self {
        CallOutcome::OtherError {
            message: message.into(),
        }
    }

    /// Fatal outcomes stop the whole cascade.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CallOutcome::InvalidKey { .. })
    }

    /// Short reason used in attempt summaries.
    pub fn reason(&self) -> String {
        match self {
            CallOutcome::Success { .. } => "ok".to_string(),
            CallOutcome::RateLimited => "rate limited".to_string(),
            CallOutcome::InvalidKey { leaked: true } => "API key leaked".to_string(),
            CallOutcome::InvalidKey { leaked: false } => "API key invalid".to_string(),
            CallOutcome::NotFound => "model not found".to_string(),
            CallOutcome::OtherError { message } => message.clone(),
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

const MAX_MESSAGE_CHARS: usize = 240;

/// Classifies a non-success HTTP response from the Gemini REST API.
pub fn classify_failure(status: u16, body: &str) -> CallOutcome {
    match decode_envelope(body) {
        Some(error) => classify_error_body(Some(status), error),
        None => classify_status(status, body.trim(), "", None),
    }
}

/// Classifies an error that only exists as text, as returned by the SDK
/// mechanism. Provider errors carry the API's JSON error body, which is
/// decoded when present; otherwise only whole words are matched.
pub fn classify_message(message: &str) -> CallOutcome {
    if let Some(error) = find_envelope(message) {
        return classify_error_body(None, error);
    }

    let lowered = message.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .filter(|word| !word.is_empty())
        .collect();
    let has = |word: &str| words.contains(&word);

    if has("429")
        || has("resource_exhausted")
        || has("quota")
        || lowered.contains("rate limit")
    {
        return CallOutcome::RateLimited;
    }

    if has("leaked") {
        return CallOutcome::InvalidKey { leaked: true };
    }

    if lowered.contains("api key not valid")
        || has("api_key_invalid")
        || has("permission_denied")
        || has("unauthenticated")
        || has("401")
        || has("403")
    {
        return CallOutcome::InvalidKey { leaked: false };
    }

    if has("404") || has("not_found") || lowered.contains("not found") {
        return CallOutcome::NotFound;
    }

    CallOutcome::other(truncate(message))
}

fn decode_envelope(body: &str) -> Option<ErrorBody> {
    serde_json::from_str::<ErrorEnvelope>(body.trim())
        .ok()
        .map(|envelope| envelope.error)
}

/// Finds a `{"error": {...}}` body embedded in wrapper text such as
/// `CompletionError: ProviderError: {...}`.
fn find_envelope(message: &str) -> Option<ErrorBody> {
    let start = message.find('{')?;
    let end = message.rfind('}')?;
    if end < start {
        return None;
    }
    decode_envelope(&message[start..=end])
}

/// `http_status` is absent when the transport status was lost and only the
/// body's own code is known.
fn classify_error_body(http_status: Option<u16>, error: ErrorBody) -> CallOutcome {
    let status = http_status.or(error.code).unwrap_or_default();
    let message = error.message.unwrap_or_default();
    let body_status = error.status.unwrap_or_default();
    classify_status(status, &message, &body_status, error.code)
}

fn classify_status(
    status: u16,
    message: &str,
    body_status: &str,
    body_code: Option<u16>,
) -> CallOutcome {
    let lowered = message.to_lowercase();

    if status == 429
        || body_code == Some(429)
        || body_status == "RESOURCE_EXHAUSTED"
        || lowered.contains("quota")
    {
        return CallOutcome::RateLimited;
    }

    let key_rejected = matches!(status, 401 | 403)
        || matches!(body_status, "PERMISSION_DENIED" | "UNAUTHENTICATED")
        || (status == 400
            && (lowered.contains("api key not valid") || lowered.contains("api_key_invalid")));
    if key_rejected {
        return CallOutcome::InvalidKey {
            leaked: lowered.contains("leaked"),
        };
    }

    if status == 404 || body_status == "NOT_FOUND" {
        return CallOutcome::NotFound;
    }

    CallOutcome::other(format!("HTTP {status}: {}", truncate(message)))
}

fn truncate(message: &str) -> String {
    if message.chars().count() <= MAX_MESSAGE_CHARS {
        return message.to_string();
    }
    let mut cut: String = message.chars().take(MAX_MESSAGE_CHARS).collect();
    cut.push('…');
    cut
}
