//! Shared utilities for commands
//!
//! This module contains:
//! - `load_config` - Resolve config with CLI overrides
//! - `load_service` - Load encoders and models from the artifact directory
//! - `load_prompt` - Advice prompt, honouring the configured override dir
//! - `read_submission` - Parse a TOML or JSON submission file

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use debtease_core::{Config, PromptTemplate, SavingsService, Submission};

/// Resolve config, letting `--artifacts` win over file and environment
pub fn load_config(config_path: Option<&Path>, artifacts: Option<&Path>) -> Result<Config> {
    let mut config = Config::load(config_path).context("Failed to load configuration")?;
    if let Some(dir) = artifacts {
        config.artifacts_dir = dir.to_path_buf();
    }
    Ok(config)
}

/// Load encoders and every category model
pub fn load_service(config: &Config) -> Result<SavingsService> {
    SavingsService::load(&config.artifacts_dir).with_context(|| {
        format!(
            "Failed to load model artifacts from {}",
            config.artifacts_dir.display()
        )
    })
}

/// Load the advice prompt from the configured override dir, else the embedded one
pub fn load_prompt(config: &Config) -> Result<PromptTemplate> {
    PromptTemplate::load(config.prompts_dir.as_deref()).context("Failed to load advice prompt")
}

/// Read a submission from `.json`, otherwise TOML
pub fn read_submission(path: &Path) -> Result<Submission> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let submission = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON submission in {}", path.display()))?
    } else {
        toml::from_str(&content)
            .with_context(|| format!("Invalid TOML submission in {}", path.display()))?
    };
    Ok(submission)
}
