//! Feature row assembly
//!
//! Every savings model was trained on the same 19 columns. `FeatureRow` keeps
//! them in training order so oracles can address columns by index.

use serde::Serialize;

use crate::encoders::EncoderStore;
use crate::error::Result;
use crate::models::{CategoricalField, ExpenseBreakdown, SpendingCategory, UserProfile};

/// Training column names, in column order
pub const FEATURE_NAMES: [&str; 19] = [
    "Desired_Savings",
    "Desired_Savings_Percentage",
    "Income",
    "Age",
    "Dependents",
    "Rent",
    "Loan_Repayment",
    "Insurance",
    "Groceries",
    "Transport",
    "Eating_Out",
    "Entertainment",
    "Utilities",
    "Healthcare",
    "Education",
    "Miscellaneous",
    "Disposable_Income",
    "City_Tier",
    "Occupation",
];

/// Number of model input columns
pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// Column index of a training feature name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_NAMES.iter().position(|n| *n == name)
}

/// One model input row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    values: [f64; FEATURE_COUNT],
    total_expenses: f64,
}

impl FeatureRow {
    /// Build the row for a submission, encoding categorical fields
    pub fn assemble(
        profile: &UserProfile,
        expenses: &ExpenseBreakdown,
        encoders: &EncoderStore,
    ) -> Result<Self> {
        let occupation = encoders.encode(CategoricalField::Occupation, &profile.occupation)?;
        let city_tier = encoders.encode(CategoricalField::CityTier, &profile.city_tier)?;

        let total_expenses = expenses.total();
        let disposable_income = profile.income - total_expenses;

        let values = [
            profile.desired_savings,
            profile.desired_savings_percentage,
            profile.income,
            f64::from(profile.age),
            f64::from(profile.dependents),
            expenses.rent,
            expenses.loan_repayment,
            expenses.insurance,
            expenses.spent(SpendingCategory::Groceries),
            expenses.spent(SpendingCategory::Transport),
            expenses.spent(SpendingCategory::EatingOut),
            expenses.spent(SpendingCategory::Entertainment),
            expenses.spent(SpendingCategory::Utilities),
            expenses.spent(SpendingCategory::Healthcare),
            expenses.spent(SpendingCategory::Education),
            expenses.spent(SpendingCategory::Miscellaneous),
            disposable_income,
            city_tier as f64,
            occupation as f64,
        ];

        Ok(Self {
            values,
            total_expenses,
        })
    }

    /// Build a row from raw column values (training order)
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        let total_expenses = values[5..16].iter().sum();
        Self {
            values,
            total_expenses,
        }
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    /// Value of a column by training name
    pub fn get(&self, name: &str) -> Option<f64> {
        feature_index(name).map(|i| self.values[i])
    }

    pub fn income(&self) -> f64 {
        self.values[2]
    }

    pub fn total_expenses(&self) -> f64 {
        self.total_expenses
    }

    /// Income minus all expenses; negative when overspending
    pub fn disposable_income(&self) -> f64 {
        self.values[16]
    }
}
