//! Savings analysis and advice prompt handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppError, AppState};
use debtease_core::{
    request_advice, AdviceReport, CategoryBreakdown, ExpenseBreakdown, SavingsAnalysis,
    SavingsSummary, Submission, UserProfile,
};

fn default_include_advice() -> bool {
    true
}

/// Request body for analysis and prompt preview
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub profile: UserProfile,
    pub expenses: ExpenseBreakdown,
    /// Call the advice service (default: true)
    #[serde(default = "default_include_advice")]
    pub include_advice: bool,
}

impl AnalyzeRequest {
    /// Body rejections are client errors with a JSON message, like validation failures
    fn from_payload(payload: Result<Json<Self>, JsonRejection>) -> Result<Self, AppError> {
        payload
            .map(|Json(body)| body)
            .map_err(|rejection| AppError::bad_request(&rejection.body_text()))
    }

    fn into_parts(self) -> (Submission, bool) {
        (
            Submission {
                profile: self.profile,
                expenses: self.expenses,
            },
            self.include_advice,
        )
    }
}

/// Full analysis response
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub summary: SavingsSummary,
    pub categories: Vec<CategoryBreakdown>,
    pub advice: AdviceReport,
    pub generated_at: DateTime<Utc>,
}

/// Rendered advice prompt
#[derive(Debug, Serialize)]
pub struct PromptResponse {
    pub prompt: String,
}

fn run_analysis(state: &AppState, submission: &Submission) -> Result<SavingsAnalysis, AppError> {
    state
        .service
        .analyze(submission)
        .map_err(AppError::from_core)
}

/// POST /api/analyze - Estimate savings and optionally request advice
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let (submission, include_advice) = AnalyzeRequest::from_payload(payload)?.into_parts();
    let analysis = run_analysis(&state, &submission)?;

    let advice = if include_advice {
        let prompt = state
            .prompt
            .render_advice(&submission.profile, &analysis.summary, &analysis.estimate);
        let outcome = request_advice(state.advice.as_ref(), &prompt).await;
        AdviceReport::from(outcome)
    } else {
        AdviceReport::skipped()
    };

    info!(
        total_potential_savings = analysis.summary.total_potential_savings,
        advice = %advice.status,
        "Analyzed submission"
    );

    Ok(Json(AnalyzeResponse {
        summary: analysis.summary,
        categories: analysis.categories,
        advice,
        generated_at: analysis.generated_at,
    }))
}

/// POST /api/prompt - Render the advice prompt without calling the service
pub async fn prompt(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<PromptResponse>, AppError> {
    let (submission, _) = AnalyzeRequest::from_payload(payload)?.into_parts();
    let analysis = run_analysis(&state, &submission)?;

    let prompt = state
        .prompt
        .render_advice(&submission.profile, &analysis.summary, &analysis.estimate);

    Ok(Json(PromptResponse { prompt }))
}
