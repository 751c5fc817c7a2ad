//! PipelineConfig - デモパイプラインの設定
//!
//! JSON ファイルから読み込みます。省略したフィールドはデフォルト値
//! （`[10, 20, 30]` を 10 で割って 2 を除外し、2 秒遅らせる）になります。

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("divisor must not be zero")]
    ZeroDivisor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Values pushed by the fixed-sequence source.
    pub values: Vec<i64>,
    pub divisor: i64,
    /// Mapped value dropped by the filter stage.
    pub exclude: i64,
    pub delay_ms: u64,
    /// Simulated click positions for the event-driven demo.
    pub clicks: Vec<i64>,
    /// Clicks at or beyond this x coordinate are filtered out.
    pub max_click_x: i64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            values: vec![10, 20, 30],
            divisor: 10,
            exclude: 2,
            delay_ms: 2000,
            clicks: vec![120, 340, 45],
            max_click_x: 200,
        }
    }
}

impl PipelineConfig {
    /// Load from `path`, or fall back to defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                Self::from_json(&raw)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.divisor == 0 {
            return Err(ConfigError::ZeroDivisor);
        }
        Ok(())
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_uses_defaults() {
        let config = PipelineConfig::from_json("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn partial_json_overrides_only_given_fields() {
        let config = PipelineConfig::from_json(r#"{ "values": [1, 2], "delay_ms": 5 }"#).unwrap();
        assert_eq!(config.values, vec![1, 2]);
        assert_eq!(config.delay(), Duration::from_millis(5));
        assert_eq!(config.divisor, 10);
    }

    #[test]
    fn zero_divisor_is_rejected() {
        let config = PipelineConfig {
            divisor: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroDivisor)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = PipelineConfig::load(Some(Path::new("/definitely/not/here.json"))).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = PipelineConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
