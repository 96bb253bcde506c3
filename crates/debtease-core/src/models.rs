//! Domain models for DebtEase

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Youngest age accepted on a submission
pub const MIN_AGE: u32 = 18;

/// Oldest age accepted on a submission
pub const MAX_AGE: u32 = 100;

/// Largest household accepted on a submission
pub const MAX_DEPENDENTS: u32 = 10;

/// Upper bound of the desired savings percentage
pub const MAX_SAVINGS_PERCENTAGE: f64 = 80.0;

/// Variable spending categories with a dedicated savings model
///
/// Declaration order is the display order used by reports and prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SpendingCategory {
    Groceries,
    Transport,
    #[serde(rename = "Eating_Out")]
    EatingOut,
    Entertainment,
    Utilities,
    Healthcare,
    Education,
    Miscellaneous,
}

impl SpendingCategory {
    /// Column name of the category in the training data
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Groceries => "Groceries",
            Self::Transport => "Transport",
            Self::EatingOut => "Eating_Out",
            Self::Entertainment => "Entertainment",
            Self::Utilities => "Utilities",
            Self::Healthcare => "Healthcare",
            Self::Education => "Education",
            Self::Miscellaneous => "Miscellaneous",
        }
    }

    /// Get all categories
    pub fn all() -> &'static [SpendingCategory] {
        &[
            Self::Groceries,
            Self::Transport,
            Self::EatingOut,
            Self::Entertainment,
            Self::Utilities,
            Self::Healthcare,
            Self::Education,
            Self::Miscellaneous,
        ]
    }

    /// File name of the regressor artifact for this category
    pub fn artifact_file_name(&self) -> String {
        format!("model_{}.json", self.as_str())
    }
}

impl std::str::FromStr for SpendingCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | ' ' | '-'))
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "groceries" => Ok(Self::Groceries),
            "transport" => Ok(Self::Transport),
            "eatingout" => Ok(Self::EatingOut),
            "entertainment" => Ok(Self::Entertainment),
            "utilities" => Ok(Self::Utilities),
            "healthcare" => Ok(Self::Healthcare),
            "education" => Ok(Self::Education),
            "miscellaneous" | "misc" => Ok(Self::Miscellaneous),
            _ => Err(format!("Unknown spending category: {}", s)),
        }
    }
}

impl std::fmt::Display for SpendingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Categorical profile fields resolved through a label encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CategoricalField {
    Occupation,
    #[serde(rename = "City_Tier")]
    CityTier,
}

impl CategoricalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Occupation => "Occupation",
            Self::CityTier => "City_Tier",
        }
    }

    pub fn all() -> &'static [CategoricalField] {
        &[Self::Occupation, Self::CityTier]
    }
}

impl std::fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Household profile from one form submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Monthly income (₹)
    pub income: f64,
    pub age: u32,
    pub dependents: u32,
    pub occupation: String,
    pub city_tier: String,
    /// Desired monthly savings (₹)
    pub desired_savings: f64,
    /// Desired savings as a percentage of income
    pub desired_savings_percentage: f64,
}

impl UserProfile {
    /// Check numeric bounds. Categorical fields are checked by the encoder store.
    pub fn validate(&self) -> Result<()> {
        check_amount("income", self.income)?;
        check_amount("desired_savings", self.desired_savings)?;

        if !(MIN_AGE..=MAX_AGE).contains(&self.age) {
            return Err(Error::InvalidInput(format!(
                "age must be between {} and {}",
                MIN_AGE, MAX_AGE
            )));
        }
        if self.dependents > MAX_DEPENDENTS {
            return Err(Error::InvalidInput(format!(
                "dependents must be at most {}",
                MAX_DEPENDENTS
            )));
        }
        if !self.desired_savings_percentage.is_finite()
            || !(0.0..=MAX_SAVINGS_PERCENTAGE).contains(&self.desired_savings_percentage)
        {
            return Err(Error::InvalidInput(format!(
                "desired_savings_percentage must be between 0 and {}",
                MAX_SAVINGS_PERCENTAGE
            )));
        }
        Ok(())
    }
}

/// Monthly expense breakdown (₹)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseBreakdown {
    pub rent: f64,
    pub loan_repayment: f64,
    pub insurance: f64,
    pub groceries: f64,
    pub transport: f64,
    pub eating_out: f64,
    pub entertainment: f64,
    pub utilities: f64,
    pub healthcare: f64,
    pub education: f64,
    pub miscellaneous: f64,
}

impl ExpenseBreakdown {
    /// Amount spent in a variable category
    pub fn spent(&self, category: SpendingCategory) -> f64 {
        match category {
            SpendingCategory::Groceries => self.groceries,
            SpendingCategory::Transport => self.transport,
            SpendingCategory::EatingOut => self.eating_out,
            SpendingCategory::Entertainment => self.entertainment,
            SpendingCategory::Utilities => self.utilities,
            SpendingCategory::Healthcare => self.healthcare,
            SpendingCategory::Education => self.education,
            SpendingCategory::Miscellaneous => self.miscellaneous,
        }
    }

    /// Rent, loan repayments and insurance
    pub fn fixed_total(&self) -> f64 {
        self.rent + self.loan_repayment + self.insurance
    }

    /// Sum of every expense field
    pub fn total(&self) -> f64 {
        SpendingCategory::all()
            .iter()
            .fold(self.fixed_total(), |total, c| total + self.spent(*c))
    }

    pub fn validate(&self) -> Result<()> {
        check_amount("rent", self.rent)?;
        check_amount("loan_repayment", self.loan_repayment)?;
        check_amount("insurance", self.insurance)?;
        for category in SpendingCategory::all() {
            check_amount(category.as_str(), self.spent(*category))?;
        }
        Ok(())
    }
}

/// One form submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub profile: UserProfile,
    pub expenses: ExpenseBreakdown,
}

impl Submission {
    pub fn validate(&self) -> Result<()> {
        self.profile.validate()?;
        self.expenses.validate()
    }
}

fn check_amount(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidInput(format!(
            "{} must be a non-negative amount",
            name
        )));
    }
    Ok(())
}
