use super::backend::{CompletionBackend, ModelSource};
use super::candidates::{ApiVersion, ModelCandidate};
use super::error::DiscoveryError;
use super::outcome::{CallOutcome, classify_failure};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

const GENERATE_CONTENT: &str = "generateContent";

/// Direct REST access to the Gemini API. Serves both model discovery and the
/// primary completion mechanism.
pub struct GeminiRestBackend {
    client: Client,
    base_url: String,
    api_key: String,
    versions: Vec<ApiVersion>,
}

impl GeminiRestBackend {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_API_BASE, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            versions: ApiVersion::ALL.to_vec(),
        }
    }

    pub fn with_versions(mut self, versions: Vec<ApiVersion>) -> Self {
        if !versions.is_empty() {
            self.versions = versions;
        }
        self
    }

    fn generate_url(&self, candidate: &ModelCandidate) -> String {
        format!(
            "{}/{}/models/{}:{GENERATE_CONTENT}",
            self.base_url, candidate.api_version, candidate.name
        )
    }
}

// Gemini request/response shapes
#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelDescriptor>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelDescriptor {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

/// Pulls the first candidate's first text part out of a success body.
pub fn parse_generate_response(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<GenerateResponse>(body).ok()?;
    parsed
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .find_map(|part| part.text)
}

/// Names of the listed models that support `generateContent`, without the
/// `models/` prefix, in listing order.
pub fn parse_model_list(body: &str) -> Result<Vec<String>, serde_json::Error> {
    let list = serde_json::from_str::<ModelList>(body)?;
    Ok(list
        .models
        .into_iter()
        .filter(|model| {
            model
                .supported_generation_methods
                .iter()
                .any(|method| method == GENERATE_CONTENT)
        })
        .map(|model| {
            model
                .name
                .strip_prefix("models/")
                .map(str::to_string)
                .unwrap_or(model.name)
        })
        .collect())
}

/// Maps any completed HTTP exchange to an outcome.
pub fn classify_response(status: u16, body: &str) -> CallOutcome {
    if (200..300).contains(&status) {
        return match parse_generate_response(body) {
            Some(text) => CallOutcome::Success { text },
            None => CallOutcome::other("empty response"),
        };
    }
    classify_failure(status, body)
}

#[async_trait]
impl ModelSource for GeminiRestBackend {
    async fn list_models(&self) -> Result<Vec<String>, DiscoveryError> {
        let url = format!("{}/{}/models", self.base_url, ApiVersion::V1Beta);
        tracing::debug!(%url, "listing Gemini models");

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(reqwest::Error::without_url)?;

        if !status.is_success() {
            return Err(DiscoveryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let models = parse_model_list(&body)?;
        tracing::info!(count = models.len(), "discovered Gemini models");
        Ok(models)
    }
}

#[async_trait]
impl CompletionBackend for GeminiRestBackend {
    fn mechanism(&self) -> &str {
        "rest"
    }

    fn api_versions(&self) -> &[ApiVersion] {
        &self.versions
    }

    async fn generate(&self, candidate: &ModelCandidate, prompt: &str) -> CallOutcome {
        // The key travels as a query parameter, so only the bare URL is logged.
        let url = self.generate_url(candidate);
        tracing::debug!(%url, "calling generateContent");

        let request = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        let response = match self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return CallOutcome::other(format!("request failed: {}", err.without_url())),
        };

        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => classify_response(status, &body),
            Err(err) => CallOutcome::other(format!("reading body failed: {}", err.without_url())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_candidate_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Messi scored."}],"role":"model"}}]}"#;
        assert_eq!(
            parse_generate_response(body),
            Some("Messi scored.".to_string())
        );
    }

    #[test]
    fn success_without_text_is_not_success() {
        assert_eq!(
            classify_response(200, r#"{"candidates":[]}"#),
            CallOutcome::other("empty response")
        );
        assert_eq!(
            classify_response(200, "not json"),
            CallOutcome::other("empty response")
        );
    }

    #[test]
    fn model_list_keeps_generate_content_only() {
        let body = r#"{
            "models": [
                {"name": "models/gemini-2.5-flash", "supportedGenerationMethods": ["generateContent", "countTokens"]},
                {"name": "models/embedding-001", "supportedGenerationMethods": ["embedContent"]},
                {"name": "models/gemini-2.0-flash", "supportedGenerationMethods": ["generateContent"]},
                {"name": "models/aqa"}
            ]
        }"#;
        assert_eq!(
            parse_model_list(body).unwrap(),
            vec!["gemini-2.5-flash".to_string(), "gemini-2.0-flash".to_string()]
        );
    }

    #[test]
    fn generate_url_has_no_key() {
        let backend = GeminiRestBackend::with_base_url("http://localhost:9/", "secret");
        let url = backend.generate_url(&ModelCandidate {
            name: "gemini-pro".into(),
            api_version: ApiVersion::V1,
        });
        assert_eq!(url, "http://localhost:9/v1/models/gemini-pro:generateContent");
        assert!(!url.contains("secret"));
    }
}
