use super::backend::CompletionBackend;
use super::candidates::{ApiVersion, ModelCandidate};
use super::outcome::{CallOutcome, classify_message};
use async_trait::async_trait;
use rig::client::{ClientBuilderError, CompletionClient};
use rig::completion::Prompt;
use rig::providers::gemini;

/// Secondary mechanism: the same Gemini models reached through the Rig
/// provider client instead of hand-built REST calls.
pub struct RigGeminiBackend {
    client: gemini::Client,
}

impl RigGeminiBackend {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: gemini::Client::new(api_key),
        }
    }

    /// Points the Rig client at another API host, e.g. a proxy or a mock server.
    pub fn with_base_url(base_url: &str, api_key: &str) -> Result<Self, ClientBuilderError> {
        let client = gemini::Client::builder(api_key)
            .base_url(base_url.trim_end_matches('/'))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl CompletionBackend for RigGeminiBackend {
    fn mechanism(&self) -> &str {
        "sdk"
    }

    // Rig pins its own API version.
    fn api_versions(&self) -> &[ApiVersion] {
        &[ApiVersion::V1Beta]
    }

    async fn generate(&self, candidate: &ModelCandidate, prompt: &str) -> CallOutcome {
        let agent = self.client.agent(&candidate.name).build();

        match agent.prompt(prompt).await {
            Ok(text) if !text.trim().is_empty() => CallOutcome::Success { text },
            Ok(_) => CallOutcome::other("empty response"),
            Err(err) => classify_message(&err.to_string()),
        }
    }
}
