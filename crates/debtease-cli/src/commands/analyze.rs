//! Analyze and prompt commands

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use debtease_core::prompt::format_rate;
use debtease_core::{
    request_advice, AdviceClient, AdviceReport, CategoryBreakdown, Config, SavingsSummary,
};
use serde::Serialize;

use super::{load_prompt, load_service, read_submission};

/// Report printed by `analyze --json`
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub summary: SavingsSummary,
    pub categories: Vec<CategoryBreakdown>,
    pub advice: AdviceReport,
    pub generated_at: DateTime<Utc>,
}

pub async fn cmd_analyze(config: &Config, input: &Path, no_advice: bool, json: bool) -> Result<()> {
    let service = load_service(config)?;
    let submission = read_submission(input)?;
    let analysis = service
        .analyze(&submission)
        .context("Submission rejected")?;

    let advice = if no_advice {
        AdviceReport::skipped()
    } else {
        let client = AdviceClient::from_config(&config.advice)
            .context("Failed to configure advice backend")?;
        let prompt = load_prompt(config)?;
        let text = prompt.render_advice(&submission.profile, &analysis.summary, &analysis.estimate);
        AdviceReport::from(request_advice(client.as_ref(), &text).await)
    };

    let report = AnalysisReport {
        summary: analysis.summary,
        categories: analysis.categories,
        advice,
        generated_at: analysis.generated_at,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report);
    Ok(())
}

fn print_report(report: &AnalysisReport) {
    let summary = &report.summary;

    println!("💰 Savings Analysis");
    println!("   Income:              ₹{:.2}", summary.income);
    println!("   Total expenses:      ₹{:.2}", summary.total_expenses);
    println!("   Disposable income:   ₹{:.2}", summary.disposable_income);
    println!(
        "   Savings rate:        {}",
        format_rate(summary.current_savings_rate)
    );
    println!(
        "   Potential savings:   ₹{:.2}",
        summary.total_potential_savings
    );
    println!(
        "   New savings rate:    {}",
        format_rate(summary.new_savings_rate)
    );
    println!(
        "   Savings goal:        ₹{:.2} ({:.1}%) {}",
        summary.desired_savings,
        summary.desired_savings_percentage,
        if summary.projected_meets_goal {
            "✅ reachable"
        } else {
            "⚠️  out of reach"
        }
    );
    if let Some(category) = summary.highest_savings_category {
        println!("   Biggest opportunity: {}", category);
    }

    println!();
    println!(
        "{:<15} {:>12} {:>12} {:>12} {:>8}",
        "Category", "Spending", "Savings", "Remaining", "Saved %"
    );
    println!("{}", "-".repeat(63));
    for row in &report.categories {
        println!(
            "{:<15} {:>12.2} {:>12.2} {:>12.2} {:>7.1}%",
            row.category.as_str(),
            row.current_spending,
            row.potential_savings,
            row.remaining_spending,
            row.savings_percent
        );
    }

    println!();
    match &report.advice.text {
        Some(text) => {
            println!("📝 Financial Advice ({})", report.advice.status);
            println!();
            println!("{}", text);
        }
        None => println!("📝 Financial advice skipped"),
    }
}

pub fn cmd_prompt(config: &Config, input: &Path) -> Result<()> {
    let service = load_service(config)?;
    let submission = read_submission(input)?;
    let analysis = service
        .analyze(&submission)
        .context("Submission rejected")?;

    let template = load_prompt(config)?;
    if let Some(path) = template.override_path() {
        eprintln!("Using prompt override: {}", path.display());
    }

    println!(
        "{}",
        template.render_advice(&submission.profile, &analysis.summary, &analysis.estimate)
    );
    Ok(())
}
