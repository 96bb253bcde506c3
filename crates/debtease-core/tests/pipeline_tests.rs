//! Integration tests for debtease-core
//!
//! These tests exercise the full artifacts → estimate → prompt → advice workflow
//! against a temporary artifact directory.

use std::fs;
use std::path::Path;

use debtease_core::{
    build_advice_prompt, format_inr, request_advice, score_csv, AdviceClient, AdviceReport,
    CategoricalField, Config, ExpenseBreakdown, SavingsService, SpendingCategory, Submission,
    UserProfile,
};

/// Writes a label encoder bundle and one small tree ensemble per category.
///
/// Every model splits on its own spending column at 3000: below it the model
/// predicts 10% of the threshold, above it a large value that must be clamped.
fn write_artifacts(dir: &Path) {
    fs::write(
        dir.join("label_encoders.json"),
        r#"{
            "Occupation": ["Professional", "Retired", "Self_Employed", "Student"],
            "City_Tier": ["Tier_1", "Tier_2", "Tier_3"]
        }"#,
    )
    .unwrap();

    for category in SpendingCategory::all() {
        let artifact = format!(
            r#"{{
                "base_score": 0.5,
                "trees": [{{
                    "nodeid": 0, "split": "{}", "split_condition": 3000.0,
                    "yes": 1, "no": 2, "missing": 1,
                    "children": [
                        {{ "nodeid": 1, "leaf": 299.5 }},
                        {{ "nodeid": 2, "leaf": 99999.5 }}
                    ]
                }}]
            }}"#,
            category.as_str()
        );
        fs::write(dir.join(category.artifact_file_name()), artifact).unwrap();
    }
}

fn scenario() -> Submission {
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

// =============================================================================
// Estimation
// =============================================================================

#[test]
fn test_scenario_from_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());

    let service = SavingsService::load(dir.path()).expect("Failed to load artifacts");
    assert_eq!(service.models().len(), 8);
    assert_eq!(service.models().fingerprints().len(), 8);
    assert_eq!(
        service.encoders().classes_of(CategoricalField::CityTier),
        &["Tier_1", "Tier_2", "Tier_3"]
    );

    let submission = scenario();
    let analysis = service.analyze(&submission).unwrap();

    assert_eq!(analysis.summary.total_expenses, 47500.0);
    assert_eq!(analysis.summary.disposable_income, 2500.0);
    assert_eq!(analysis.summary.current_savings_rate, Some(5.0));

    // Below the split: 0.5 + 299.5
    assert_eq!(analysis.estimate.get(SpendingCategory::Utilities), 300.0);
    // At or above the split the prediction is clamped to what was spent
    assert_eq!(analysis.estimate.get(SpendingCategory::Groceries), 8000.0);
    assert_eq!(analysis.estimate.get(SpendingCategory::Transport), 3000.0);

    for (category, amount) in analysis.estimate.iter() {
        assert!(amount >= 0.0);
        assert!(amount <= submission.expenses.spent(category));
    }

    let sum: f64 = analysis.estimate.iter().map(|(_, v)| v).sum();
    assert_eq!(analysis.summary.total_potential_savings, sum);
}

#[test]
fn test_missing_artifact_fails_startup() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());
    fs::remove_file(dir.path().join(SpendingCategory::EatingOut.artifact_file_name())).unwrap();

    let err = SavingsService::load(dir.path()).unwrap_err();
    assert!(err.to_string().contains("Eating_Out"));
}

// =============================================================================
// Prompt and advice
// =============================================================================

#[tokio::test]
async fn test_prompt_and_mock_advice() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());
    let service = SavingsService::load(dir.path()).unwrap();

    let submission = scenario();
    let analysis = service.analyze(&submission).unwrap();
    let prompt = build_advice_prompt(&submission.profile, &analysis.summary, &analysis.estimate);

    assert!(prompt.contains("50000"));
    assert!(prompt.contains("Age: 30"));
    for (category, amount) in analysis.estimate.iter() {
        assert!(prompt.contains(&format!("- {}: ₹{}", category, format_inr(amount))));
    }

    let client = AdviceClient::mock();
    let report = AdviceReport::from(request_advice(Some(&client), &prompt).await);
    assert_eq!(report.status, "generated");

    let report = AdviceReport::from(request_advice(None, &prompt).await);
    assert_eq!(report.status, "connect_failed");
}

#[test]
fn test_config_drives_artifact_location() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());

    let config_path = dir.path().join("debtease.toml");
    fs::write(
        &config_path,
        format!(
            "[artifacts]\ndir = {:?}\n\n[advice]\nbackend = \"mock\"\n",
            dir.path().display().to_string()
        ),
    )
    .unwrap();

    let config = Config::from_files(Some(&config_path)).unwrap();
    let service = SavingsService::load(&config.artifacts_dir).unwrap();
    assert_eq!(service.models().len(), 8);

    let client = AdviceClient::from_config(&config.advice).unwrap();
    assert!(client.is_some());
}

// =============================================================================
// Batch scoring
// =============================================================================

#[test]
fn test_batch_scoring_file() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());
    let service = SavingsService::load(dir.path()).unwrap();

    let csv_path = dir.path().join("data.csv");
    fs::write(
        &csv_path,
        "Income,Age,Dependents,Occupation,City_Tier,Rent,Loan_Repayment,Insurance,Groceries,Transport,Eating_Out,Entertainment,Utilities,Healthcare,Education,Miscellaneous,Desired_Savings_Percentage,Desired_Savings\n\
         50000,30,1,Professional,Tier_1,15000,5000,2000,8000,3000,4000,3000,2000,1500,2000,2000,20,10000\n\
         40000,70,0,Retired,Tier_4,9000,0,1000,5000,1000,500,500,1500,4000,0,500,15,6000\n",
    )
    .unwrap();

    let out_path = dir.path().join("scores.jsonl");
    let report = score_csv(
        &service,
        fs::File::open(&csv_path).unwrap(),
        fs::File::create(&out_path).unwrap(),
    )
    .unwrap();

    assert_eq!(report.scored, 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].line, 3);
    assert!(report.skipped[0].message.contains("Tier_4"));

    let output = fs::read_to_string(&out_path).unwrap();
    let row: serde_json::Value = serde_json::from_str(output.lines().next().unwrap()).unwrap();
    assert_eq!(row["estimate"]["Groceries"], 8000.0);
}
