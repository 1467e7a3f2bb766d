//! Load — config loading from file and environment variables.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::model::{BatchConfig, UnknownLinePolicy};

impl BatchConfig {
    /// Load configuration from file or environment variables.
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = std::env::var("APITRAIL_CONFIG_FILE")
            .unwrap_or_else(|_| "apitrail.toml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            tracing::info!("Loading configuration from: {}", config_path);
            Self::from_file(&config_path)?
        } else {
            tracing::info!(
                "Config file not found at {}, using environment variables",
                config_path
            );
            Self::from_env()
        };

        // Environment variables override file config.
        if let Ok(input) = std::env::var("APITRAIL_INPUT") {
            config.input_path = input;
        }
        if let Ok(report) = std::env::var("APITRAIL_REPORT") {
            config.report_path = report;
        }
        if let Ok(columns) = std::env::var("APITRAIL_COLUMNS") {
            if let Ok(n) = columns.parse() {
                config.columns = n;
            }
        }
        if let Ok(policy) = std::env::var("APITRAIL_POLICY") {
            if let Some(p) = UnknownLinePolicy::parse(&policy) {
                config.policy = p;
            }
        }

        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: BatchConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self {
            input_path: std::env::var("APITRAIL_INPUT")
                .unwrap_or_else(|_| Self::default().input_path),
            report_path: std::env::var("APITRAIL_REPORT").unwrap_or_default(),
            columns: std::env::var("APITRAIL_COLUMNS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            policy: std::env::var("APITRAIL_POLICY")
                .ok()
                .and_then(|s| UnknownLinePolicy::parse(&s))
                .unwrap_or_default(),
        }
    }
}
