use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use soccerx::ai::{
    ApiVersion, CallOutcome, ChatError, CompletionBackend, DiscoveryError, GeminiRestBackend,
    ModelCandidate, ModelCascade, ModelCatalog, ModelSource, RigGeminiBackend,
};

const KEY: &str = "test-key";

fn backend(server: &MockServer) -> GeminiRestBackend {
    GeminiRestBackend::with_base_url(server.uri(), KEY)
}

fn candidate(version: ApiVersion, name: &str) -> ModelCandidate {
    ModelCandidate {
        name: name.to_string(),
        api_version: version,
    }
}

fn reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    }))
}

fn sdk_backend(server: &MockServer) -> RigGeminiBackend {
    RigGeminiBackend::with_base_url(&server.uri(), KEY).unwrap()
}

/// Full response shape, as the Rig client deserializes more than the text.
fn sdk_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "responseId": "resp-1",
        "modelVersion": "gemini-2.5-flash",
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP",
            "index": 0
        }],
        "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 6, "totalTokenCount": 18 }
    }))
}

fn gemini_error(code: u16, status: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(code).set_body_json(json!({
        "error": { "code": code, "status": status, "message": message }
    }))
}

fn cascade(server: &MockServer, catalog: ModelCatalog) -> ModelCascade {
    let rest: Box<dyn CompletionBackend> = Box::new(backend(server));
    ModelCascade::new(Box::new(backend(server)), vec![rest], catalog)
}

fn catalog(priority: &[&str], fallback: &[&str]) -> ModelCatalog {
    ModelCatalog {
        priority: priority.iter().map(|s| s.to_string()).collect(),
        fallback: fallback.iter().map(|s| s.to_string()).collect(),
    }
}

/// Discovery keeps only models that can generate content
#[tokio::test]
async fn test_list_models_filters_generate_content() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .and(query_param("key", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                { "name": "models/gemini-2.5-flash", "supportedGenerationMethods": ["generateContent"] },
                { "name": "models/text-embedding-004", "supportedGenerationMethods": ["embedContent"] },
                { "name": "models/gemini-2.0-flash", "supportedGenerationMethods": ["countTokens", "generateContent"] }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let models = backend(&server).list_models().await.unwrap();
    assert_eq!(models, vec!["gemini-2.5-flash", "gemini-2.0-flash"]);
}

#[tokio::test]
async fn test_list_models_reports_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend down"))
        .mount(&server)
        .await;

    let err = backend(&server).list_models().await.unwrap_err();
    assert!(matches!(err, DiscoveryError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_generate_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/models/gemini-2.5-pro:generateContent"))
        .and(query_param("key", KEY))
        .respond_with(reply("Kickoff is at 8:30 PM."))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = backend(&server)
        .generate(&candidate(ApiVersion::V1, "gemini-2.5-pro"), "When?")
        .await;
    assert_eq!(
        outcome,
        CallOutcome::Success {
            text: "Kickoff is at 8:30 PM.".to_string()
        }
    );
}

#[tokio::test]
async fn test_generate_classifies_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/leaky:generateContent"))
        .respond_with(gemini_error(
            403,
            "PERMISSION_DENIED",
            "Your API key was reported as leaked. Please use another API key.",
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/busy:generateContent"))
        .respond_with(gemini_error(429, "RESOURCE_EXHAUSTED", "Resource has been exhausted"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/retired:generateContent"))
        .respond_with(gemini_error(404, "NOT_FOUND", "models/retired is not found"))
        .mount(&server)
        .await;

    let rest = backend(&server);
    assert_eq!(
        rest.generate(&candidate(ApiVersion::V1Beta, "leaky"), "hi").await,
        CallOutcome::InvalidKey { leaked: true }
    );
    assert_eq!(
        rest.generate(&candidate(ApiVersion::V1Beta, "busy"), "hi").await,
        CallOutcome::RateLimited
    );
    assert_eq!(
        rest.generate(&candidate(ApiVersion::V1Beta, "retired"), "hi").await,
        CallOutcome::NotFound
    );
}

/// Rate limits and missing models are skipped until a model answers
#[tokio::test]
async fn test_cascade_walks_to_first_working_model() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                { "name": "models/gemini-2.5-pro", "supportedGenerationMethods": ["generateContent"] },
                { "name": "models/gemini-2.0-flash", "supportedGenerationMethods": ["generateContent"] }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .respond_with(gemini_error(429, "RESOURCE_EXHAUSTED", "quota"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
        .respond_with(gemini_error(404, "NOT_FOUND", "not found"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(reply("Barcelona won 2-1."))
        .expect(1)
        .mount(&server)
        .await;

    let reply = cascade(&server, catalog(&["gemini-2.5-flash", "gemini-2.5-pro"], &[]))
        .resolve("Who won?", &[])
        .await;

    assert_eq!(reply, Ok("Barcelona won 2-1.".to_string()));
}

/// A leaked key stops the cascade after the first call
#[tokio::test]
async fn test_cascade_aborts_on_leaked_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "models": [] })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/first:generateContent"))
        .respond_with(gemini_error(
            403,
            "PERMISSION_DENIED",
            "Your API key was reported as leaked. Please use another API key.",
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(reply("should not be reached"))
        .expect(0)
        .mount(&server)
        .await;

    let err = cascade(&server, catalog(&["first", "second"], &["third"]))
        .resolve("hi", &[])
        .await
        .unwrap_err();

    match err {
        ChatError::Configuration(message) => {
            assert!(message.contains("leaked"));
            assert!(message.contains("GEMINI_API_KEY"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

/// Discovery failure falls back to the static list; all 429s end in a quota error
#[tokio::test]
async fn test_cascade_quota_exceeded_after_fallback_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(gemini_error(429, "RESOURCE_EXHAUSTED", "Resource has been exhausted"))
        // two names, two API versions
        .expect(4)
        .mount(&server)
        .await;

    let err = cascade(&server, catalog(&["a"], &["b"]))
        .resolve("hi", &[])
        .await
        .unwrap_err();

    assert_eq!(err, ChatError::QuotaExceeded);
}

#[tokio::test]
async fn test_sdk_generate_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(query_param("key", KEY))
        .respond_with(sdk_reply("Liverpool kick off at 8:30 PM."))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = sdk_backend(&server)
        .generate(&candidate(ApiVersion::V1Beta, "gemini-2.5-flash"), "When?")
        .await;
    assert_eq!(
        outcome,
        CallOutcome::Success {
            text: "Liverpool kick off at 8:30 PM.".to_string()
        }
    );
}

#[tokio::test]
async fn test_sdk_blank_reply_is_not_a_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/quiet:generateContent"))
        .respond_with(sdk_reply("   "))
        .mount(&server)
        .await;

    let outcome = sdk_backend(&server)
        .generate(&candidate(ApiVersion::V1Beta, "quiet"), "hi")
        .await;
    assert_eq!(outcome, CallOutcome::other("empty response"));
}

/// Rig reports HTTP failures as text wrapping the API's error body
#[tokio::test]
async fn test_sdk_generate_classifies_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/busy:generateContent"))
        .respond_with(gemini_error(429, "RESOURCE_EXHAUSTED", "Resource has been exhausted"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/leaky:generateContent"))
        .respond_with(gemini_error(
            403,
            "PERMISSION_DENIED",
            "Your API key was reported as leaked. Please use another API key.",
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/flaky:generateContent"))
        .respond_with(gemini_error(500, "INTERNAL", "Internal error; request id 84290429"))
        .mount(&server)
        .await;

    let sdk = sdk_backend(&server);
    assert_eq!(
        sdk.generate(&candidate(ApiVersion::V1Beta, "busy"), "hi").await,
        CallOutcome::RateLimited
    );
    assert_eq!(
        sdk.generate(&candidate(ApiVersion::V1Beta, "leaky"), "hi").await,
        CallOutcome::InvalidKey { leaked: true }
    );
    assert!(matches!(
        sdk.generate(&candidate(ApiVersion::V1Beta, "flaky"), "hi").await,
        CallOutcome::OtherError { .. }
    ));
}

/// Every REST attempt fails, so the SDK mechanism answers
#[tokio::test]
async fn test_cascade_falls_back_to_sdk() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "models": [] })))
        .mount(&server)
        .await;
    // REST is limited to v1 here so its calls are told apart from the SDK's
    Mock::given(method("POST"))
        .and(path("/v1/models/gemini-2.5-flash:generateContent"))
        .respond_with(gemini_error(500, "INTERNAL", "Internal error"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .respond_with(sdk_reply("Chelsea drew 1-1."))
        .expect(1)
        .mount(&server)
        .await;

    let rest: Box<dyn CompletionBackend> =
        Box::new(backend(&server).with_versions(vec![ApiVersion::V1]));
    let sdk: Box<dyn CompletionBackend> = Box::new(sdk_backend(&server));
    let cascade = ModelCascade::new(
        Box::new(backend(&server)),
        vec![rest, sdk],
        catalog(&["gemini-2.5-flash"], &[]),
    );

    let answer = cascade.resolve("Chelsea score?", &[]).await;
    assert_eq!(answer, Ok("Chelsea drew 1-1.".to_string()));
}
