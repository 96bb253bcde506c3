//! Gemini backend implementation
//!
//! POSTs the prompt to `{base_url}/v1beta/models/{model}:generateContent` and
//! extracts the first non-empty text part of the first candidate. One attempt
//! per request, bounded by the configured timeout.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, warn};

use crate::error::Result;

use super::{AdviceBackend, AdviceFailure, AdviceOutcome};

/// Gemini `generateContent` client
#[derive(Clone)]
pub struct GeminiBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiBackend {
    /// Create a backend; `timeout` bounds each request end to end
    pub fn new(base_url: &str, model: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

impl std::fmt::Debug for GeminiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiBackend")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

/// Response from the `generateContent` endpoint
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// First non-blank text part of the first candidate
    ///
    /// Blank and whitespace-only parts are skipped on purpose: a candidate
    /// whose parts are all blank is an empty response, not empty advice.
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .find_map(|part| part.text.filter(|text| !text.trim().is_empty()))
    }
}

#[async_trait]
impl AdviceBackend for GeminiBackend {
    async fn generate(&self, prompt: &str) -> AdviceOutcome {
        let payload = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = match self
            .http_client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                // The request URL carries the API key
                error!(error = %e.without_url(), "Failed to reach the advice service");
                return AdviceOutcome::Fallback(AdviceFailure::GenerationError);
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Advice service returned an error status");
            return AdviceOutcome::Fallback(AdviceFailure::ConnectFailed);
        }

        let parsed: GenerateContentResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                error!(error = %e.without_url(), "Failed to decode advice response");
                return AdviceOutcome::Fallback(AdviceFailure::GenerationError);
            }
        };

        match parsed.into_text() {
            Some(text) => {
                debug!(model = %self.model, chars = text.len(), "Generated financial advice");
                AdviceOutcome::Advice(text)
            }
            None => {
                warn!(model = %self.model, "Advice response contained no text");
                AdviceOutcome::Fallback(AdviceFailure::EmptyResponse)
            }
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{gemini_body, MockGeminiServer, MockResponse};

    fn backend(url: &str) -> GeminiBackend {
        GeminiBackend::new(url, "gemini-2.0-flash", "test-key", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_well_formed_response_returns_text() {
        let server =
            MockGeminiServer::start_with(MockResponse::text("Cut eating out by half.")).await;

        let outcome = backend(&server.url()).generate("Monthly Income: ₹50000").await;
        assert_eq!(outcome, AdviceOutcome::Advice("Cut eating out by half.".into()));

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].path,
            "/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(requests[0].query.as_deref(), Some("key=test-key"));

        let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
        assert_eq!(
            body["contents"][0]["parts"][0]["text"],
            "Monthly Income: ₹50000"
        );
    }

    #[tokio::test]
    async fn test_not_found_is_connect_failure() {
        let server = MockGeminiServer::start_with(MockResponse::raw(404, "model not found")).await;

        let outcome = backend(&server.url()).generate("prompt").await;
        assert_eq!(outcome, AdviceOutcome::Fallback(AdviceFailure::ConnectFailed));
        assert!(outcome.text().contains("couldn't connect"));
    }

    #[tokio::test]
    async fn test_other_success_codes_are_connect_failures() {
        let server = MockGeminiServer::start_with(MockResponse::json(202, gemini_body("hi"))).await;
        let outcome = backend(&server.url()).generate("prompt").await;
        assert_eq!(outcome, AdviceOutcome::Fallback(AdviceFailure::ConnectFailed));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_empty_response() {
        let server =
            MockGeminiServer::start_with(MockResponse::json(200, json!({ "candidates": [] })))
                .await;

        let outcome = backend(&server.url()).generate("prompt").await;
        assert_eq!(outcome, AdviceOutcome::Fallback(AdviceFailure::EmptyResponse));
        assert!(outcome.text().contains("couldn't generate"));
    }

    #[tokio::test]
    async fn test_missing_parts_is_empty_response() {
        let body = json!({ "candidates": [{ "content": { "role": "model" } }] });
        let server = MockGeminiServer::start_with(MockResponse::json(200, body)).await;

        let outcome = backend(&server.url()).generate("prompt").await;
        assert_eq!(outcome, AdviceOutcome::Fallback(AdviceFailure::EmptyResponse));
    }

    #[tokio::test]
    async fn test_first_non_empty_part_wins() {
        let body = json!({
            "candidates": [{
                "content": {
                    "parts": [{ "text": "" }, { "text": "Second part" }, { "text": "Third" }]
                }
            }]
        });
        let server = MockGeminiServer::start_with(MockResponse::json(200, body)).await;

        let outcome = backend(&server.url()).generate("prompt").await;
        assert_eq!(outcome, AdviceOutcome::Advice("Second part".into()));
    }

    #[tokio::test]
    async fn test_blank_parts_are_empty_response() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "" }, { "text": "  \n " }] } }]
        });
        let server = MockGeminiServer::start_with(MockResponse::json(200, body)).await;

        let outcome = backend(&server.url()).generate("prompt").await;
        assert_eq!(outcome, AdviceOutcome::Fallback(AdviceFailure::EmptyResponse));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_generation_error() {
        let server =
            MockGeminiServer::start_with(MockResponse::raw(200, "<html>oops</html>")).await;

        let outcome = backend(&server.url()).generate("prompt").await;
        assert_eq!(outcome, AdviceOutcome::Fallback(AdviceFailure::GenerationError));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_generation_error() {
        // Bind then drop a listener to get a port nobody is serving
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let outcome = backend(&format!("http://{}", addr)).generate("prompt").await;
        assert_eq!(outcome, AdviceOutcome::Fallback(AdviceFailure::GenerationError));
        assert!(outcome.text().contains("error generating"));
    }

    #[tokio::test]
    async fn test_timeout_is_generation_error() {
        let server = MockGeminiServer::start_with(
            MockResponse::text("too late").delayed(Duration::from_secs(2)),
        )
        .await;
        let backend = GeminiBackend::new(
            &server.url(),
            "gemini-2.0-flash",
            "test-key",
            Duration::from_millis(200),
        )
        .unwrap();

        let outcome = backend.generate("prompt").await;
        assert_eq!(outcome, AdviceOutcome::Fallback(AdviceFailure::GenerationError));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let backend = backend("http://localhost:1");
        assert!(!format!("{:?}", backend).contains("test-key"));
    }
}
