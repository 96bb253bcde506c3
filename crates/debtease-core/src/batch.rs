//! Batch scoring of CSV rows
//!
//! Input uses the training dataset's column names (`Income`, `Age`,
//! `City_Tier`, `Eating_Out`, ...). Extra columns such as
//! `Disposable_Income` or `Potential_Savings_*` are ignored. Output is JSON
//! Lines, one object per scored row.

use std::io::{Read, Write};

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::estimator::{SavingsService, SavingsSummary};
use crate::models::{ExpenseBreakdown, SpendingCategory, Submission, UserProfile};

/// One input row, keyed by training column names
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Income")]
    income: f64,
    #[serde(rename = "Age")]
    age: f64,
    #[serde(rename = "Dependents")]
    dependents: f64,
    #[serde(rename = "Occupation")]
    occupation: String,
    #[serde(rename = "City_Tier")]
    city_tier: String,
    #[serde(rename = "Rent")]
    rent: f64,
    #[serde(rename = "Loan_Repayment")]
    loan_repayment: f64,
    #[serde(rename = "Insurance")]
    insurance: f64,
    #[serde(rename = "Groceries")]
    groceries: f64,
    #[serde(rename = "Transport")]
    transport: f64,
    #[serde(rename = "Eating_Out")]
    eating_out: f64,
    #[serde(rename = "Entertainment")]
    entertainment: f64,
    #[serde(rename = "Utilities")]
    utilities: f64,
    #[serde(rename = "Healthcare")]
    healthcare: f64,
    #[serde(rename = "Education")]
    education: f64,
    #[serde(rename = "Miscellaneous")]
    miscellaneous: f64,
    #[serde(rename = "Desired_Savings_Percentage")]
    desired_savings_percentage: f64,
    #[serde(rename = "Desired_Savings")]
    desired_savings: f64,
}

/// Whole-number column that may be written as `30` or `30.0`
fn count(name: &str, value: f64) -> Result<u32> {
    if value.fract() != 0.0 || !(0.0..=f64::from(u32::MAX)).contains(&value) {
        return Err(Error::InvalidInput(format!(
            "{} must be a whole number, got {}",
            name, value
        )));
    }
    Ok(value as u32)
}

impl CsvRow {
    fn into_submission(self) -> Result<Submission> {
        Ok(Submission {
            profile: UserProfile {
                income: self.income,
                age: count("Age", self.age)?,
                dependents: count("Dependents", self.dependents)?,
                occupation: self.occupation,
                city_tier: self.city_tier,
                desired_savings: self.desired_savings,
                desired_savings_percentage: self.desired_savings_percentage,
            },
            expenses: ExpenseBreakdown {
                rent: self.rent,
                loan_repayment: self.loan_repayment,
                insurance: self.insurance,
                groceries: self.groceries,
                transport: self.transport,
                eating_out: self.eating_out,
                entertainment: self.entertainment,
                utilities: self.utilities,
                healthcare: self.healthcare,
                education: self.education,
                miscellaneous: self.miscellaneous,
            },
        })
    }
}

/// One JSON Lines output record
#[derive(Debug, Serialize)]
pub struct ScoredRow {
    /// 1-based line in the input file
    pub line: u64,
    pub estimate: std::collections::BTreeMap<SpendingCategory, f64>,
    pub summary: SavingsSummary,
}

/// A row that was skipped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    pub line: u64,
    pub message: String,
}

/// Outcome of a batch run
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub scored: usize,
    pub skipped: Vec<RowError>,
}

/// Score every row of `input`, writing JSON Lines to `output`
///
/// Rows that fail to parse or validate are recorded in the report and
/// skipped. I/O failures abort the run.
pub fn score_csv<R: Read, W: Write>(
    service: &SavingsService,
    input: R,
    mut output: W,
) -> Result<BatchReport> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = rdr.headers()?.clone();
    let mut report = BatchReport::default();

    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => match e.position() {
                Some(pos) => {
                    report.skip(pos.line(), e.to_string());
                    continue;
                }
                None => return Err(e.into()),
            },
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let analysis = record
            .deserialize::<CsvRow>(Some(&headers))
            .map_err(Error::from)
            .and_then(CsvRow::into_submission)
            .and_then(|submission| service.analyze(&submission));

        match analysis {
            Ok(analysis) => {
                let row = ScoredRow {
                    line,
                    estimate: analysis.estimate.iter().collect(),
                    summary: analysis.summary,
                };
                serde_json::to_writer(&mut output, &row)?;
                output.write_all(b"\n")?;
                report.scored += 1;
            }
            Err(e) => report.skip(line, e.to_string()),
        }
    }

    output.flush()?;
    debug!(
        scored = report.scored,
        skipped = report.skipped.len(),
        "Batch scoring finished"
    );
    Ok(report)
}

impl BatchReport {
    fn skip(&mut self, line: u64, message: String) {
        warn!(line, error = %message, "Skipping batch row");
        self.skipped.push(RowError { line, message });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoders::EncoderStore;
    use crate::features::FeatureRow;
    use crate::oracle::{ModelBank, RegressionOracle};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn service() -> SavingsService {
        let encoders = EncoderStore::from_classes(
            vec!["Professional".into(), "Student".into()],
            vec!["Tier_1".into(), "Tier_2".into(), "Tier_3".into()],
        )
        .unwrap();
        let oracles: BTreeMap<SpendingCategory, Arc<dyn RegressionOracle>> = SpendingCategory::all()
            .iter()
            .map(|c| {
                let oracle: Arc<dyn RegressionOracle> = Arc::new(|_: &FeatureRow| 500.0);
                (*c, oracle)
            })
            .collect();
        SavingsService::new(encoders, ModelBank::from_oracles(oracles).unwrap())
    }

    const HEADER: &str = "Income,Age,Dependents,Occupation,City_Tier,Rent,Loan_Repayment,Insurance,Groceries,Transport,Eating_Out,Entertainment,Utilities,Healthcare,Education,Miscellaneous,Desired_Savings_Percentage,Desired_Savings,Disposable_Income,Potential_Savings_Groceries";

    #[test]
    fn test_scores_valid_rows() {
        let csv = format!(
            "{}\n50000,30,1,Professional,Tier_1,15000,5000,2000,8000,3000,4000,3000,2000,1500,2000,2000,20.0,10000,2500,600\n\
             30000.0,45.0,3.0,Student,Tier_3,8000,0,500,6000,1500,1000,800,1200,900,3000,400,10,3000,6700,400\n",
            HEADER
        );

        let mut out = Vec::new();
        let report = score_csv(&service(), csv.as_bytes(), &mut out).unwrap();
        assert_eq!(report.scored, 2);
        assert!(report.skipped.is_empty());

        let lines: Vec<serde_json::Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["line"], 2);
        assert_eq!(lines[0]["summary"]["total_expenses"], 47500.0);
        assert_eq!(lines[0]["estimate"]["Groceries"], 500.0);
        assert_eq!(lines[1]["line"], 3);
    }

    #[test]
    fn test_invalid_rows_are_skipped_with_line_numbers() {
        let csv = format!(
            "{}\n50000,30,1,Astronaut,Tier_1,15000,5000,2000,8000,3000,4000,3000,2000,1500,2000,2000,20,10000,0,0\n\
             50000,12,1,Professional,Tier_1,15000,5000,2000,8000,3000,4000,3000,2000,1500,2000,2000,20,10000,0,0\n\
             50000,30,1.5,Professional,Tier_1,15000,5000,2000,8000,3000,4000,3000,2000,1500,2000,2000,20,10000,0,0\n\
             fifty,30,1,Professional,Tier_1,15000,5000,2000,8000,3000,4000,3000,2000,1500,2000,2000,20,10000,0,0\n\
             50000,30,1,Professional,Tier_2,15000,5000,2000,8000,3000,4000,3000,2000,1500,2000,2000,20,10000,0,0\n",
            HEADER
        );

        let mut out = Vec::new();
        let report = score_csv(&service(), csv.as_bytes(), &mut out).unwrap();

        assert_eq!(report.scored, 1);
        let lines: Vec<u64> = report.skipped.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![2, 3, 4, 5]);
        assert!(report.skipped[0].message.contains("Astronaut"));
        assert!(report.skipped[1].message.contains("age"));
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_missing_column_skips_row() {
        let csv = "Income,Age\n50000,30\n";
        let mut out = Vec::new();
        let report = score_csv(&service(), csv.as_bytes(), &mut out).unwrap();
        assert_eq!(report.scored, 0);
        assert_eq!(report.skipped.len(), 1);
    }
}
