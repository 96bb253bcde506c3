//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use debtease_core::{AdviceClient, Config};
use debtease_server::{AppState, ServerConfig};

use super::{load_prompt, load_service};

pub async fn cmd_serve(
    config: &Config,
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
    allowed_origins: Vec<String>,
) -> Result<()> {
    println!("🚀 Starting DebtEase web server...");
    println!("   Artifacts: {}", config.artifacts_dir.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }
    if !allowed_origins.is_empty() {
        println!("   🌐 CORS origins: {}", allowed_origins.join(", "));
    }

    let service = load_service(config)?;
    let advice = AdviceClient::from_config(&config.advice)
        .context("Failed to configure advice backend")?;
    if advice.is_none() {
        println!("   💡 Tip: Set GEMINI_API_KEY to enable financial advice");
    }

    let prompt = load_prompt(config)?;
    if let Some(path) = prompt.override_path() {
        println!("   📝 Prompt override: {}", path.display());
    }

    let state = AppState::new(service, advice).with_prompt(prompt);
    let static_dir = static_dir.and_then(|p| p.to_str());
    let server_config = ServerConfig { allowed_origins };

    debtease_server::serve_with_config(state, host, port, static_dir, server_config).await
}
