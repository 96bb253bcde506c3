//! DebtEase Core Library
//!
//! Shared functionality for the DebtEase savings advisor:
//! - Encoder store for categorical profile fields
//! - Feature row assembly in training column order
//! - Model bank of per-category regression oracles (gradient-boosted trees)
//! - Savings estimation with clamping and summary metrics
//! - Advice prompt rendering and pluggable advice backends (Gemini, mock)
//! - Batch scoring of CSV rows
//! - Layered configuration

pub mod advice;
pub mod batch;
pub mod config;
pub mod encoders;
pub mod error;
pub mod estimator;
pub mod features;
pub mod models;
pub mod oracle;
pub mod prompt;

/// Test utilities including mock Gemini server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use advice::{
    request_advice, AdviceBackend, AdviceClient, AdviceFailure, AdviceOutcome, AdviceReport,
    GeminiBackend, MockBackend,
};
pub use batch::{score_csv, BatchReport, RowError, ScoredRow};
pub use config::{AdviceBackendKind, AdviceConfig, Config};
pub use encoders::{EncoderStore, LabelEncoder};
pub use error::{Error, Result};
pub use estimator::{
    CategoryBreakdown, SavingsAnalysis, SavingsEstimate, SavingsService, SavingsSummary,
};
pub use features::{FeatureRow, FEATURE_NAMES};
pub use models::{CategoricalField, ExpenseBreakdown, SpendingCategory, Submission, UserProfile};
pub use oracle::{ArtifactFingerprint, ModelBank, RegressionOracle, TreeEnsemble};
pub use prompt::{build_advice_prompt, format_inr, PromptTemplate};
