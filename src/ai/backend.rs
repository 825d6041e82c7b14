use super::candidates::{ApiVersion, ModelCandidate};
use super::error::DiscoveryError;
use super::outcome::CallOutcome;
use async_trait::async_trait;

/// Lists the model names the provider currently serves for text generation.
#[async_trait]
pub trait ModelSource: Send + Sync {
    async fn list_models(&self) -> Result<Vec<String>, DiscoveryError>;
}

/// One way of calling the completion API. The cascade walks an ordered list
/// of these and never inspects how a backend talks to the provider.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Name shown in logs and attempt summaries.
    fn mechanism(&self) -> &str;

    /// Versions to walk, newest first.
    fn api_versions(&self) -> &[ApiVersion] {
        &ApiVersion::ALL
    }

    /// Issues exactly one request and classifies the result. Transport
    /// failures are reported as outcomes, never as panics or errors.
    async fn generate(&self, candidate: &ModelCandidate, prompt: &str) -> CallOutcome;
}

/// A source with nothing to offer; the cascade then runs on its fallback list.
pub struct NoDiscovery;

#[async_trait]
impl ModelSource for NoDiscovery {
    async fn list_models(&self) -> Result<Vec<String>, DiscoveryError> {
        Ok(Vec::new())
    }
}
