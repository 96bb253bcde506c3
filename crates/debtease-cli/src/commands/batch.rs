//! Batch scoring command

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use debtease_core::{score_csv, BatchReport, Config};

use super::load_service;

pub fn cmd_batch(config: &Config, file: &Path, output: Option<&Path>) -> Result<()> {
    let service = load_service(config)?;
    let input = File::open(file).with_context(|| format!("Failed to open {}", file.display()))?;
    let input = BufReader::new(input);

    let report = match output {
        Some(path) => {
            let out = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(out);
            let report = score_csv(&service, input, &mut writer)?;
            writer.flush()?;
            println!("📊 Wrote {} scored rows to {}", report.scored, path.display());
            report
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            let report = score_csv(&service, input, &mut writer)?;
            writer.flush()?;
            report
        }
    };

    print_skipped(&report);
    Ok(())
}

/// Skipped rows go to stderr so stdout stays valid JSON Lines
fn print_skipped(report: &BatchReport) {
    if report.skipped.is_empty() {
        return;
    }
    eprintln!("⚠️  Skipped {} rows:", report.skipped.len());
    for row in &report.skipped {
        eprintln!("   line {}: {}", row.line, row.message);
    }
}
