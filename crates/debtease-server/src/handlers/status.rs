//! Health, vocabulary and model metadata handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use debtease_core::{AdviceBackend, ArtifactFingerprint, CategoricalField};

/// Service health summary
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Number of loaded category models
    pub models: usize,
    /// `gemini`, `mock`, or `unavailable`
    pub advice_backend: &'static str,
    pub advice_model: Option<String>,
}

/// GET /api/health - Service health and advice backend
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        models: state.service.models().len(),
        advice_backend: state.advice_backend(),
        advice_model: state.advice.as_ref().map(|c| c.model().to_string()),
    })
}

/// Valid labels for the form's dropdowns
#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub occupation: Vec<String>,
    pub city_tier: Vec<String>,
}

/// GET /api/options - Encoder vocabularies, in code order
pub async fn options(State(state): State<Arc<AppState>>) -> Json<OptionsResponse> {
    let encoders = state.service.encoders();
    Json(OptionsResponse {
        occupation: encoders.classes_of(CategoricalField::Occupation).to_vec(),
        city_tier: encoders.classes_of(CategoricalField::CityTier).to_vec(),
    })
}

/// GET /api/models - Fingerprints of the loaded model artifacts
pub async fn models(State(state): State<Arc<AppState>>) -> Json<Vec<ArtifactFingerprint>> {
    Json(state.service.models().fingerprints().to_vec())
}
