//! Artifact check and vocabulary commands

use anyhow::{Context, Result};
use debtease_core::{AdviceBackend, AdviceClient, CategoricalField, Config};

use super::load_service;

pub fn cmd_options(config: &Config) -> Result<()> {
    let service = load_service(config)?;

    for field in CategoricalField::all() {
        println!("{}:", field);
        for class in service.encoders().classes_of(*field) {
            println!("   {}", class);
        }
    }
    Ok(())
}

pub fn cmd_check(config: &Config) -> Result<()> {
    println!("🔍 DebtEase Check");
    match &config.source {
        Some(path) => println!("   Config: {}", path.display()),
        None => println!("   Config: built-in defaults"),
    }
    println!("   Artifacts: {}", config.artifacts_dir.display());
    println!();

    let service = load_service(config)?;
    println!("{:<15} {:>6} {:>10}  {}", "Category", "Trees", "Bytes", "SHA-256");
    for fp in service.models().fingerprints() {
        println!(
            "{:<15} {:>6} {:>10}  {}",
            fp.category.as_str(),
            fp.trees,
            fp.size_bytes,
            &fp.sha256[..12.min(fp.sha256.len())]
        );
    }
    println!();

    for field in CategoricalField::all() {
        println!(
            "   {}: {} classes",
            field,
            service.encoders().classes_of(*field).len()
        );
    }

    let advice = AdviceClient::from_config(&config.advice)
        .context("Failed to configure advice backend")?;
    match advice {
        Some(client) => println!(
            "   ✅ Advice backend: {} (model: {})",
            client.name(),
            client.model()
        ),
        None => println!("   ℹ️  Advice backend not configured (set GEMINI_API_KEY)"),
    }

    println!();
    println!("✅ All {} models loaded", service.models().len());
    Ok(())
}
