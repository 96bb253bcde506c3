//! Savings estimation
//!
//! `SavingsService` bundles the encoder store and model bank. It is built
//! once at startup and shared read-only (`Arc<SavingsService>`) by every
//! request.
//!
//! Each model's raw prediction is clamped into `[0, spent]` for its category
//! and rounded to paise, so a misbehaving model can never suggest saving
//! more than was spent or a negative amount.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::encoders::EncoderStore;
use crate::error::Result;
use crate::features::FeatureRow;
use crate::models::{ExpenseBreakdown, SpendingCategory, Submission, UserProfile};
use crate::oracle::ModelBank;

/// Round to two decimal places
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn round_percent(percent: f64) -> f64 {
    (percent * 10.0).round() / 10.0
}

/// Clamp a raw prediction into `[0, spent]`, rounded to two decimals
pub fn clamp_savings(category: SpendingCategory, raw: f64, spent: f64) -> f64 {
    if !raw.is_finite() {
        warn!(category = %category, raw, "Model returned a non-finite prediction");
        return 0.0;
    }

    let clamped = raw.min(spent).max(0.0);
    if clamped != raw {
        debug!(category = %category, raw, spent, clamped, "Clamped savings prediction");
    }

    let rounded = round_currency(clamped);
    if rounded > spent {
        // Rounding up must not push past the amount spent
        ((spent * 100.0).floor() / 100.0).clamp(0.0, spent)
    } else {
        rounded
    }
}

/// Savings rate in percent; undefined without income
pub fn savings_rate(savings: f64, income: f64) -> Option<f64> {
    if income == 0.0 || !income.is_finite() {
        return None;
    }
    Some(savings * 100.0 / income)
}

/// Potential monthly savings per variable category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsEstimate {
    amounts: BTreeMap<SpendingCategory, f64>,
    total_potential_savings: f64,
}

impl SavingsEstimate {
    /// Build from already-clamped amounts
    pub fn from_amounts(amounts: BTreeMap<SpendingCategory, f64>) -> Self {
        let total_potential_savings = amounts.values().sum();
        Self {
            amounts,
            total_potential_savings,
        }
    }

    pub fn get(&self, category: SpendingCategory) -> f64 {
        self.amounts.get(&category).copied().unwrap_or(0.0)
    }

    /// Amounts in category order
    pub fn iter(&self) -> impl Iterator<Item = (SpendingCategory, f64)> + '_ {
        self.amounts.iter().map(|(c, v)| (*c, *v))
    }

    pub fn total(&self) -> f64 {
        self.total_potential_savings
    }

    /// Category with the largest estimate; the first one wins ties
    pub fn highest(&self) -> Option<SpendingCategory> {
        self.iter()
            .filter(|(_, amount)| *amount > 0.0)
            .fold(None, |best: Option<(SpendingCategory, f64)>, (c, amount)| match best {
                Some((_, top)) if top >= amount => best,
                _ => Some((c, amount)),
            })
            .map(|(c, _)| c)
    }
}

/// One row of the per-category table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub category: SpendingCategory,
    pub current_spending: f64,
    pub potential_savings: f64,
    pub remaining_spending: f64,
    /// Share of current spending that could be saved, one decimal
    pub savings_percent: f64,
}

/// Headline figures for a submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsSummary {
    pub income: f64,
    pub total_expenses: f64,
    pub disposable_income: f64,
    /// `None` when income is zero
    pub current_savings_rate: Option<f64>,
    pub total_potential_savings: f64,
    /// Rate if every suggested saving is realised; `None` when income is zero
    pub new_savings_rate: Option<f64>,
    pub desired_savings: f64,
    pub desired_savings_percentage: f64,
    pub meets_goal: bool,
    pub projected_meets_goal: bool,
    pub highest_savings_category: Option<SpendingCategory>,
}

/// Everything computed for one submission
#[derive(Debug, Clone, Serialize)]
pub struct SavingsAnalysis {
    pub summary: SavingsSummary,
    pub categories: Vec<CategoryBreakdown>,
    pub estimate: SavingsEstimate,
    pub generated_at: DateTime<Utc>,
}

/// Read-only savings pipeline shared by all requests
#[derive(Debug, Clone)]
pub struct SavingsService {
    encoders: EncoderStore,
    models: ModelBank,
}

impl SavingsService {
    pub fn new(encoders: EncoderStore, models: ModelBank) -> Self {
        Self { encoders, models }
    }

    /// Load the encoder bundle and all eight models from an artifact directory
    pub fn load(artifact_dir: &Path) -> Result<Self> {
        let encoders = EncoderStore::load(artifact_dir)?;
        let models = ModelBank::load(artifact_dir)?;
        Ok(Self::new(encoders, models))
    }

    pub fn encoders(&self) -> &EncoderStore {
        &self.encoders
    }

    pub fn models(&self) -> &ModelBank {
        &self.models
    }

    /// Build the model input row for a submission
    pub fn assemble(
        &self,
        profile: &UserProfile,
        expenses: &ExpenseBreakdown,
    ) -> Result<FeatureRow> {
        FeatureRow::assemble(profile, expenses, &self.encoders)
    }

    /// Run every category model on the row and clamp the results
    pub fn estimate(&self, row: &FeatureRow, expenses: &ExpenseBreakdown) -> SavingsEstimate {
        let amounts = SpendingCategory::all()
            .iter()
            .map(|category| {
                let raw = self.models.predict(*category, row);
                let amount = clamp_savings(*category, raw, expenses.spent(*category));
                (*category, amount)
            })
            .collect();

        SavingsEstimate::from_amounts(amounts)
    }

    /// Validate a submission and compute its full analysis
    pub fn analyze(&self, submission: &Submission) -> Result<SavingsAnalysis> {
        submission.validate()?;

        let profile = &submission.profile;
        let expenses = &submission.expenses;

        let row = self.assemble(profile, expenses)?;
        let estimate = self.estimate(&row, expenses);

        let summary = summarize(profile, &row, &estimate);
        let categories = breakdown(expenses, &estimate);

        Ok(SavingsAnalysis {
            summary,
            categories,
            estimate,
            generated_at: Utc::now(),
        })
    }
}

/// Derive the headline figures
pub fn summarize(
    profile: &UserProfile,
    row: &FeatureRow,
    estimate: &SavingsEstimate,
) -> SavingsSummary {
    let disposable_income = row.disposable_income();
    let total_potential_savings = estimate.total();

    let current_savings_rate = savings_rate(disposable_income, profile.income);
    let new_savings_rate = savings_rate(
        disposable_income + total_potential_savings,
        profile.income,
    );

    let goal = profile.desired_savings_percentage;

    SavingsSummary {
        income: profile.income,
        total_expenses: row.total_expenses(),
        disposable_income,
        current_savings_rate,
        total_potential_savings,
        new_savings_rate,
        desired_savings: profile.desired_savings,
        desired_savings_percentage: goal,
        meets_goal: current_savings_rate.is_some_and(|rate| rate >= goal),
        projected_meets_goal: new_savings_rate.is_some_and(|rate| rate >= goal),
        highest_savings_category: estimate.highest(),
    }
}

/// Per-category table rows, in category order
pub fn breakdown(
    expenses: &ExpenseBreakdown,
    estimate: &SavingsEstimate,
) -> Vec<CategoryBreakdown> {
    estimate
        .iter()
        .map(|(category, savings)| {
            let spent = expenses.spent(category);
            let savings_percent = if spent > 0.0 {
                round_percent(savings / spent * 100.0)
            } else {
                0.0
            };
            CategoryBreakdown {
                category,
                current_spending: spent,
                potential_savings: savings,
                remaining_spending: round_currency(spent - savings),
                savings_percent,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::oracle::RegressionOracle;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn encoders() -> EncoderStore {
        EncoderStore::from_classes(
            vec!["Professional".into(), "Student".into()],
            vec!["Tier_1".into(), "Tier_2".into(), "Tier_3".into()],
        )
        .unwrap()
    }

    /// Service whose oracles return a fixed raw value per category
    fn service_with(raw: impl Fn(SpendingCategory) -> f64) -> SavingsService {
        let oracles: BTreeMap<SpendingCategory, Arc<dyn RegressionOracle>> =
            SpendingCategory::all()
                .iter()
                .map(|c| {
                    let value = raw(*c);
                    let oracle: Arc<dyn RegressionOracle> =
                        Arc::new(move |_: &FeatureRow| value);
                    (*c, oracle)
                })
                .collect();
        SavingsService::new(encoders(), ModelBank::from_oracles(oracles).unwrap())
    }

    fn submission() -> Submission {
        Submission {
            profile: UserProfile {
                income: 50000.0,
                age: 30,
                dependents: 1,
                occupation: "Professional".to_string(),
                city_tier: "Tier_1".to_string(),
                desired_savings: 10000.0,
                desired_savings_percentage: 20.0,
            },
            expenses: ExpenseBreakdown {
                rent: 15000.0,
                loan_repayment: 5000.0,
                insurance: 2000.0,
                groceries: 8000.0,
                transport: 3000.0,
                eating_out: 4000.0,
                entertainment: 3000.0,
                utilities: 2000.0,
                healthcare: 1500.0,
                education: 2000.0,
                miscellaneous: 2000.0,
            },
        }
    }

    #[test]
    fn test_scenario_summary() {
        let service = service_with(|_| 0.0);
        let analysis = service.analyze(&submission()).unwrap();

        assert_eq!(analysis.summary.total_expenses, 47500.0);
        assert_eq!(analysis.summary.disposable_income, 2500.0);
        assert_eq!(analysis.summary.current_savings_rate, Some(5.0));
        assert!(!analysis.summary.meets_goal);
        assert_eq!(analysis.summary.highest_savings_category, None);
    }

    #[test]
    fn test_clamp_bounds() {
        // Wildly high, negative, fractional and NaN predictions
        let service = service_with(|c| match c {
            SpendingCategory::Groceries => 1_000_000.0,
            SpendingCategory::Transport => -250.0,
            SpendingCategory::EatingOut => 1234.5678,
            SpendingCategory::Entertainment => f64::NAN,
            SpendingCategory::Utilities => f64::INFINITY,
            _ => 100.0,
        });
        let sub = submission();
        let analysis = service.analyze(&sub).unwrap();
        let estimate = &analysis.estimate;

        assert_eq!(estimate.get(SpendingCategory::Groceries), 8000.0);
        assert_eq!(estimate.get(SpendingCategory::Transport), 0.0);
        assert_eq!(estimate.get(SpendingCategory::EatingOut), 1234.57);
        assert_eq!(estimate.get(SpendingCategory::Entertainment), 0.0);
        assert_eq!(estimate.get(SpendingCategory::Utilities), 0.0);

        for (category, amount) in estimate.iter() {
            assert!(amount >= 0.0, "{category} negative");
            assert!(amount <= sub.expenses.spent(category), "{category} exceeds spend");
        }
    }

    #[test]
    fn test_clamp_never_rounds_past_spend() {
        assert_eq!(clamp_savings(SpendingCategory::Education, 5.0, 0.005), 0.0);
        let amount = clamp_savings(SpendingCategory::Education, 99.0, 10.129);
        assert!(amount <= 10.129);
        assert_eq!(amount, 10.12);
    }

    fn any_prediction() -> impl Strategy<Value = f64> {
        prop_oneof![
            8 => any::<f64>(),
            1 => Just(f64::NAN),
            1 => Just(f64::INFINITY),
            1 => Just(f64::NEG_INFINITY),
        ]
    }

    proptest! {
        #[test]
        fn clamped_savings_stay_within_spend(raw in any_prediction(), spent in 0.0f64..1.0e9) {
            let amount = clamp_savings(SpendingCategory::Groceries, raw, spent);
            prop_assert!(amount >= 0.0, "raw={raw} spent={spent} amount={amount}");
            prop_assert!(amount <= spent, "raw={raw} spent={spent} amount={amount}");
        }

        #[test]
        fn estimates_stay_within_spend(raws in proptest::collection::vec(any_prediction(), 8)) {
            let service = service_with(|c| {
                let index = SpendingCategory::all().iter().position(|x| *x == c).unwrap();
                raws[index]
            });
            let sub = submission();
            let analysis = service.analyze(&sub).unwrap();

            for (category, amount) in analysis.estimate.iter() {
                prop_assert!(amount >= 0.0);
                prop_assert!(amount <= sub.expenses.spent(category));
            }
        }

        #[test]
        fn total_matches_sum(amounts in proptest::collection::vec(0.0f64..1.0e7, 8)) {
            let estimate = SavingsEstimate::from_amounts(
                SpendingCategory::all().iter().copied().zip(amounts).collect(),
            );

            let sum: f64 = estimate.iter().map(|(_, v)| v).sum();
            prop_assert_eq!(estimate.total(), sum);
        }
    }

    #[test]
    fn test_total_is_sum_of_estimates() {
        let service = service_with(|c| 100.0 + c.as_str().len() as f64 * 3.33);
        let analysis = service.analyze(&submission()).unwrap();

        let sum: f64 = analysis.estimate.iter().map(|(_, v)| v).sum();
        assert_eq!(analysis.estimate.total(), sum);
        assert_eq!(analysis.summary.total_potential_savings, sum);
    }

    #[test]
    fn test_new_savings_rate_and_goal() {
        let service = service_with(|_| 1000.0);
        let analysis = service.analyze(&submission()).unwrap();

        // 2500 disposable + 8 x 1000 potential = 10500 of 50000
        assert_eq!(analysis.summary.total_potential_savings, 8000.0);
        assert_eq!(analysis.summary.new_savings_rate, Some(21.0));
        assert!(analysis.summary.projected_meets_goal);
        assert_eq!(
            analysis.summary.highest_savings_category,
            Some(SpendingCategory::Groceries)
        );
    }

    #[test]
    fn test_zero_income_rates_are_undefined() {
        let service = service_with(|_| 10.0);
        let mut sub = submission();
        sub.profile.income = 0.0;

        let analysis = service.analyze(&sub).unwrap();
        assert_eq!(analysis.summary.current_savings_rate, None);
        assert_eq!(analysis.summary.new_savings_rate, None);
        assert!(!analysis.summary.meets_goal);
        assert!(!analysis.summary.projected_meets_goal);
    }

    #[test]
    fn test_breakdown_rows() {
        let service = service_with(|c| match c {
            SpendingCategory::Groceries => 1000.0,
            _ => 0.0,
        });
        let mut sub = submission();
        sub.expenses.education = 0.0;

        let analysis = service.analyze(&sub).unwrap();
        let groceries = &analysis.categories[0];
        assert_eq!(groceries.category, SpendingCategory::Groceries);
        assert_eq!(groceries.current_spending, 8000.0);
        assert_eq!(groceries.remaining_spending, 7000.0);
        assert_eq!(groceries.savings_percent, 12.5);

        let education = analysis
            .categories
            .iter()
            .find(|r| r.category == SpendingCategory::Education)
            .unwrap();
        assert_eq!(education.savings_percent, 0.0);
        assert_eq!(analysis.categories.len(), 8);
    }

    #[test]
    fn test_highest_prefers_first_on_tie() {
        let mut amounts = BTreeMap::new();
        amounts.insert(SpendingCategory::Transport, 50.0);
        amounts.insert(SpendingCategory::Healthcare, 50.0);
        amounts.insert(SpendingCategory::Groceries, 10.0);
        let estimate = SavingsEstimate::from_amounts(amounts);
        assert_eq!(estimate.highest(), Some(SpendingCategory::Transport));
    }

    #[test]
    fn test_unknown_city_tier_rejected() {
        let service = service_with(|_| 0.0);
        let mut sub = submission();
        sub.profile.city_tier = "Tier_9".to_string();

        let err = service.analyze(&sub).unwrap_err();
        assert!(matches!(err, Error::UnknownCategory { .. }));
    }

    #[test]
    fn test_invalid_submission_rejected() {
        let service = service_with(|_| 0.0);
        let mut sub = submission();
        sub.expenses.rent = -1.0;
        assert!(matches!(
            service.analyze(&sub),
            Err(Error::InvalidInput(_))
        ));
    }
}
