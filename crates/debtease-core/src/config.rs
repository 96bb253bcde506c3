//! Runtime configuration
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path (`--config`), else an override in the data dir
//!    (~/.local/share/debtease/config.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Environment variables are applied on top:
//! - `DEBTEASE_ARTIFACTS_DIR`: artifact directory
//! - `DEBTEASE_PROMPTS_DIR`: prompt override directory
//! - `DEBTEASE_ADVICE_BACKEND`: `gemini` or `mock`
//! - `GEMINI_BASE_URL`, `GEMINI_MODEL`: text-generation endpoint
//! - `GEMINI_API_KEY`: API key (only read from the environment)

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::prompt::default_prompts_dir;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/debtease.toml");

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Which advice backend to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdviceBackendKind {
    Gemini,
    Mock,
}

impl AdviceBackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Mock => "mock",
        }
    }
}

impl FromStr for AdviceBackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "mock" => Ok(Self::Mock),
            other => Err(Error::Config(format!(
                "unknown advice backend '{}' (expected gemini or mock)",
                other
            ))),
        }
    }
}

impl fmt::Display for AdviceBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settings for the advice client
#[derive(Clone)]
pub struct AdviceConfig {
    pub backend: AdviceBackendKind,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub api_key: Option<String>,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            backend: AdviceBackendKind::Gemini,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            api_key: None,
        }
    }
}

// The API key is redacted
impl fmt::Debug for AdviceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdviceConfig")
            .field("backend", &self.backend)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Full DebtEase configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub artifacts_dir: PathBuf,
    pub advice: AdviceConfig,
    /// Directory searched for prompt overrides; `None` uses the embedded prompt
    pub prompts_dir: Option<PathBuf>,
    /// File the config was read from; `None` for embedded defaults
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            artifacts_dir: PathBuf::from("artifacts"),
            advice: AdviceConfig::default(),
            prompts_dir: default_prompts_dir(),
            source: None,
        }
    }
}

impl Config {
    /// Resolve config from files, then apply environment overrides
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::from_files(explicit)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Resolve config from files only
    pub fn from_files(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Self::read(path);
        }

        if let Some(path) = default_config_path() {
            if path.exists() {
                return Self::read(&path);
            }
        }

        Self::parse(DEFAULT_CONFIG)
    }

    /// The embedded default config
    pub fn embedded() -> Result<Self> {
        Self::parse(DEFAULT_CONFIG)
    }

    fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;
        let mut config = Self::parse(&content)?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse config from TOML content; absent keys keep their defaults
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Config::default();

        if let Some(dir) = raw.artifacts.and_then(|a| a.dir) {
            config.artifacts_dir = dir;
        }

        if let Some(dir) = raw.prompts.and_then(|p| p.dir) {
            config.prompts_dir = Some(dir);
        }

        if let Some(advice) = raw.advice {
            if let Some(backend) = advice.backend {
                config.advice.backend = backend.parse()?;
            }
            if let Some(base_url) = advice.base_url {
                config.advice.base_url = base_url;
            }
            if let Some(model) = advice.model {
                config.advice.model = model;
            }
            if let Some(timeout) = advice.timeout_secs {
                if timeout == 0 {
                    return Err(Error::Config("advice.timeout_secs must be positive".into()));
                }
                config.advice.timeout = Duration::from_secs(timeout);
            }
        }

        Ok(config)
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = lookup("DEBTEASE_ARTIFACTS_DIR") {
            self.artifacts_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("DEBTEASE_PROMPTS_DIR") {
            self.prompts_dir = Some(PathBuf::from(dir));
        }
        if let Some(backend) = lookup("DEBTEASE_ADVICE_BACKEND") {
            match backend.parse() {
                Ok(kind) => self.advice.backend = kind,
                Err(_) => {
                    warn!(
                        backend = %backend,
                        "Unknown DEBTEASE_ADVICE_BACKEND, keeping {}",
                        self.advice.backend
                    )
                }
            }
        }
        if let Some(base_url) = lookup("GEMINI_BASE_URL") {
            self.advice.base_url = base_url;
        }
        if let Some(model) = lookup("GEMINI_MODEL") {
            self.advice.model = model;
        }
        self.advice.api_key = lookup("GEMINI_API_KEY");
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("debtease").join("config.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    artifacts: Option<RawArtifacts>,
    prompts: Option<RawPrompts>,
    advice: Option<RawAdvice>,
}

#[derive(Debug, Deserialize)]
struct RawArtifacts {
    dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawPrompts {
    dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawAdvice {
    backend: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}
