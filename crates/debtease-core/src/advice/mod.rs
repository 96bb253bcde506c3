//! Financial advice generation
//!
//! # Architecture
//!
//! - `AdviceBackend` trait: turns a rendered prompt into an `AdviceOutcome`
//! - `AdviceClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `GeminiBackend`, `MockBackend`
//!
//! Advice never fails the request. Every failure mode becomes a
//! `AdviceOutcome::Fallback` carrying the user-facing message for that mode.

mod gemini;
mod mock;

pub use gemini::GeminiBackend;
pub use mock::MockBackend;

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::config::{AdviceBackendKind, AdviceConfig};
use crate::error::Result;

/// Why advice could not be produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceFailure {
    /// The service answered 200 without usable text
    EmptyResponse,
    /// The service answered with a non-200 status, or no service is configured
    ConnectFailed,
    /// Transport error, timeout, or an undecodable body
    GenerationError,
}

impl AdviceFailure {
    /// Message shown to the user in place of advice
    pub fn message(&self) -> &'static str {
        match self {
            Self::EmptyResponse => "I couldn't generate specific financial advice at this time.",
            Self::ConnectFailed => {
                "Sorry, I couldn't connect to the financial advice service. Please try again later."
            }
            Self::GenerationError => {
                "There was an error generating financial advice. Please try again later."
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyResponse => "empty_response",
            Self::ConnectFailed => "connect_failed",
            Self::GenerationError => "generation_error",
        }
    }
}

/// Result of one advice request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdviceOutcome {
    Advice(String),
    Fallback(AdviceFailure),
}

impl AdviceOutcome {
    /// Narrative text, or the fallback message
    pub fn text(&self) -> &str {
        match self {
            Self::Advice(text) => text,
            Self::Fallback(failure) => failure.message(),
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            Self::Advice(_) => "generated",
            Self::Fallback(failure) => failure.as_str(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Advice as reported to API and CLI consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdviceReport {
    pub status: String,
    pub text: Option<String>,
}

impl AdviceReport {
    /// Advice was not requested
    pub fn skipped() -> Self {
        Self {
            status: "skipped".to_string(),
            text: None,
        }
    }
}

impl From<AdviceOutcome> for AdviceReport {
    fn from(outcome: AdviceOutcome) -> Self {
        Self {
            status: outcome.status().to_string(),
            text: Some(outcome.text().to_string()),
        }
    }
}

/// Trait implemented by every advice backend
///
/// Backends must be Send + Sync to be shared across request handlers.
#[async_trait]
pub trait AdviceBackend: Send + Sync {
    /// Send the prompt and return narrative text or a tagged fallback
    async fn generate(&self, prompt: &str) -> AdviceOutcome;

    /// Model name (for logging and health output)
    fn model(&self) -> &str;

    /// Short backend identifier
    fn name(&self) -> &'static str;
}

/// Concrete advice client enum
#[derive(Clone)]
pub enum AdviceClient {
    /// Google Gemini `generateContent`
    Gemini(GeminiBackend),
    /// Canned narrative for tests and offline demos
    Mock(MockBackend),
}

impl AdviceClient {
    /// Build the configured backend
    ///
    /// Returns `Ok(None)` when Gemini is selected but no API key is available.
    pub fn from_config(config: &AdviceConfig) -> Result<Option<Self>> {
        match config.backend {
            AdviceBackendKind::Mock => Ok(Some(Self::mock())),
            AdviceBackendKind::Gemini => match &config.api_key {
                Some(api_key) => Ok(Some(Self::Gemini(GeminiBackend::new(
                    &config.base_url,
                    &config.model,
                    api_key,
                    config.timeout,
                )?))),
                None => {
                    info!("GEMINI_API_KEY not set, financial advice is unavailable");
                    Ok(None)
                }
            },
        }
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        Self::Mock(MockBackend::new())
    }
}

#[async_trait]
impl AdviceBackend for AdviceClient {
    async fn generate(&self, prompt: &str) -> AdviceOutcome {
        match self {
            Self::Gemini(b) => b.generate(prompt).await,
            Self::Mock(b) => b.generate(prompt).await,
        }
    }

    fn model(&self) -> &str {
        match self {
            Self::Gemini(b) => b.model(),
            Self::Mock(b) => b.model(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Gemini(b) => b.name(),
            Self::Mock(b) => b.name(),
        }
    }
}

/// Request advice, falling back to `ConnectFailed` without a configured client
pub async fn request_advice(client: Option<&AdviceClient>, prompt: &str) -> AdviceOutcome {
    match client {
        Some(client) => client.generate(prompt).await,
        None => AdviceOutcome::Fallback(AdviceFailure::ConnectFailed),
    }
}
