//! Advice prompt rendering
//!
//! The prompt template is loaded with a two-layer resolution:
//! 1. An override file in the data dir (~/.local/share/debtease/prompts/financial_advice.md)
//! 2. The embedded default compiled into the binary
//!
//! Templates use `{{var}}` placeholders. Unknown placeholders are left as-is.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::estimator::{SavingsEstimate, SavingsSummary};
use crate::models::UserProfile;

/// Embedded default template
const DEFAULT_TEMPLATE: &str = include_str!("../../../prompts/financial_advice.md");

/// File name of the advice prompt template
pub const PROMPT_FILE: &str = "financial_advice.md";

/// Default prompt override directory
pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("debtease").join("prompts"))
}

/// Format a rupee amount with thousands separators and two decimals
///
/// `1234567.891` renders as `1,234,567.89`.
pub fn format_inr(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let negative = amount < 0.0 && fixed.chars().any(|c| c != '0' && c != '.');
    format!("{}{}.{}", if negative { "-" } else { "" }, grouped, fraction)
}

/// One-decimal percentage, or `N/A` when undefined
pub fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(rate) => format!("{:.1}%", rate),
        None => "N/A".to_string(),
    }
}

/// Advice prompt template
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    content: String,
    override_path: Option<PathBuf>,
}

impl PromptTemplate {
    /// The template compiled into the binary
    pub fn embedded() -> Self {
        Self {
            content: DEFAULT_TEMPLATE.to_string(),
            override_path: None,
        }
    }

    /// Use an override from `dir` if one exists, else the embedded template
    pub fn load(override_dir: Option<&Path>) -> Result<Self> {
        if let Some(dir) = override_dir {
            let path = dir.join(PROMPT_FILE);
            if path.exists() {
                let content = fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read prompt override: {}", e))
                })?;
                debug!(path = %path.display(), "Using prompt override");
                return Ok(Self {
                    content,
                    override_path: Some(path),
                });
            }
        }
        Ok(Self::embedded())
    }

    /// Path of the override file, if one is in use
    pub fn override_path(&self) -> Option<&Path> {
        self.override_path.as_deref()
    }

    /// Replace `{{var}}` placeholders in one left-to-right pass
    ///
    /// Substituted values are never rescanned. Unknown placeholders are kept
    /// verbatim.
    pub fn render(&self, vars: &HashMap<&str, String>) -> String {
        let mut result = String::with_capacity(self.content.len());
        let mut rest = self.content.as_str();

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let value = after
                .find("}}")
                .and_then(|end| vars.get(&after[..end]).map(|value| (end, value)));
            match value {
                Some((end, value)) => {
                    result.push_str(value);
                    rest = &after[end + 2..];
                }
                None => {
                    result.push_str("{{");
                    rest = after;
                }
            }
        }

        result.push_str(rest);
        result
    }

    /// Render the advice prompt for one analysed submission
    pub fn render_advice(
        &self,
        profile: &UserProfile,
        summary: &SavingsSummary,
        estimate: &SavingsEstimate,
    ) -> String {
        let savings_lines = estimate
            .iter()
            .map(|(category, amount)| format!("- {}: ₹{}", category, format_inr(amount)))
            .collect::<Vec<_>>()
            .join("\n");

        let vars: HashMap<&str, String> = HashMap::from([
            ("income", profile.income.to_string()),
            ("age", profile.age.to_string()),
            ("dependents", profile.dependents.to_string()),
            ("occupation", profile.occupation.clone()),
            ("city_tier", profile.city_tier.clone()),
            ("total_expenses", summary.total_expenses.to_string()),
            ("disposable_income", summary.disposable_income.to_string()),
            ("current_savings_rate", format_rate(summary.current_savings_rate)),
            ("savings_goal", profile.desired_savings.to_string()),
            ("savings_lines", savings_lines),
            (
                "total_potential_savings",
                format_inr(summary.total_potential_savings),
            ),
        ]);

        self.render(&vars)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::embedded()
    }
}

/// Render the advice prompt with the embedded template
pub fn build_advice_prompt(
    profile: &UserProfile,
    summary: &SavingsSummary,
    estimate: &SavingsEstimate,
) -> String {
    PromptTemplate::embedded().render_advice(profile, summary, estimate)
}
