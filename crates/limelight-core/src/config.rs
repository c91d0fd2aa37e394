use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Poll cadence of the timer engine. One second gives at-or-after firing
/// without meaningful drift for social posting.
pub const DEFAULT_TICK_SECS: u64 = 1;

/// Top-level config (limelight.toml + LIMELIGHT_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LimelightConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub publisher: PublisherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Generation collaborator settings. `api_key` absent means the daemon runs
/// with fallback-only content (every generation call degrades).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_generator_base_url")]
    pub base_url: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_generator_base_url(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_secs: default_tick_secs(),
        }
    }
}

/// Publish side-effect settings. `dry_run` keeps the daemon from touching a
/// real platform account — posts are logged and marked posted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    #[serde(default = "bool_true")]
    pub dry_run: bool,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self { dry_run: true }
    }
}

fn bool_true() -> bool {
    true
}

fn default_model() -> String {
    "claude-sonnet-4-6".to_string()
}

fn default_generator_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_tick_secs() -> u64 {
    DEFAULT_TICK_SECS
}

fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.limelight/limelight.db", home)
}

impl LimelightConfig {
    /// Load config from a TOML file with LIMELIGHT_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.limelight/limelight.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: LimelightConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("LIMELIGHT_").split("_"))
            .extract()
            .map_err(|e| crate::error::LimelightError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.limelight/limelight.toml", home)
}
