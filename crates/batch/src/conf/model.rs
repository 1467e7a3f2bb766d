//! Model — BatchConfig and related types.

use serde::{Deserialize, Serialize};

/// What to do with a data line matching none of the known grammars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownLinePolicy {
    /// Abort the whole run on the first unrecognized line, reporting
    /// the offending text verbatim.
    #[default]
    Fail,
    /// Retry the loose method+URL fallback grammar; failing that, fold
    /// the whole line into the non-API catch-all bucket.
    Bucket,
}

impl UnknownLinePolicy {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "fail" => Some(UnknownLinePolicy::Fail),
            "bucket" => Some(UnknownLinePolicy::Bucket),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// CSV file containing the collected log lines.
    pub input_path: String,
    /// Report destination (`.csv` or `.json`); empty writes the text
    /// table to stdout only.
    pub report_path: String,
    /// Expected columns per row: 1 (line only) or 2 (line plus
    /// response-time override).
    pub columns: usize,
    pub policy: UnknownLinePolicy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_path: "dataset/api-log-lines.csv".to_string(),
            report_path: "".to_string(),
            columns: 2,
            policy: UnknownLinePolicy::default(),
        }
    }
}

impl BatchConfig {
    /// Validate configuration values before the run starts.
    pub fn validate(&self) -> Result<(), String> {
        if self.input_path.is_empty() {
            return Err("input_path must not be empty".to_string());
        }
        if !(1..=2).contains(&self.columns) {
            return Err(format!("columns must be 1 or 2, got {}", self.columns));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Defaults ─────────────────────────────────────────────────

    #[test]
    fn test_default_config() {
        let cfg = BatchConfig::default();
        assert_eq!(cfg.input_path, "dataset/api-log-lines.csv");
        assert!(cfg.report_path.is_empty());
        assert_eq!(cfg.columns, 2);
        assert_eq!(cfg.policy, UnknownLinePolicy::Fail);
    }

    // ── Validation ───────────────────────────────────────────────

    #[test]
    fn test_validate_default_passes() {
        assert!(BatchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_input() {
        let cfg = BatchConfig {
            input_path: "".to_string(),
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.contains("input_path"), "error should name the field: {}", err);
    }

    #[test]
    fn test_validate_rejects_bad_column_count() {
        let cfg = BatchConfig {
            columns: 3,
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.contains("columns"), "error should name the field: {}", err);
    }

    // ── Policy parsing ───────────────────────────────────────────

    #[test]
    fn test_policy_parse() {
        assert_eq!(UnknownLinePolicy::parse("fail"), Some(UnknownLinePolicy::Fail));
        assert_eq!(UnknownLinePolicy::parse("bucket"), Some(UnknownLinePolicy::Bucket));
        assert_eq!(UnknownLinePolicy::parse("drop"), None);
    }

    // ── Serialization ────────────────────────────────────────────

    #[test]
    fn test_deserialize_partial_toml() {
        // Only set policy; rest should use defaults via #[serde(default)]
        let cfg: BatchConfig = toml::from_str(r#"policy = "bucket""#).unwrap();
        assert_eq!(cfg.policy, UnknownLinePolicy::Bucket);
        assert_eq!(cfg.columns, 2); // default
    }

    #[test]
    fn test_toml_round_trip() {
        let cfg = BatchConfig {
            input_path: "lines.csv".to_string(),
            report_path: "out.csv".to_string(),
            columns: 1,
            policy: UnknownLinePolicy::Bucket,
        };
        let text = toml::to_string(&cfg).unwrap();
        let back: BatchConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.input_path, cfg.input_path);
        assert_eq!(back.columns, cfg.columns);
        assert_eq!(back.policy, cfg.policy);
    }
}
