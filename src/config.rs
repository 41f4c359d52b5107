//! Configuration management for the fraud dashboard

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration file read when no path is given
pub const DEFAULT_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub holdout: HoldoutConfig,
    pub detection: DetectionConfig,
    pub simulation: SimulationConfig,
    pub notifier: NotifierConfig,
    pub logging: LoggingConfig,
}

/// Classifier artifact configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Path of the ONNX classifier
    pub path: PathBuf,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_onnx_threads() -> usize {
    1
}

/// Held-out dataset configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HoldoutConfig {
    /// CSV of pre-encoded feature rows
    pub path: PathBuf,
    /// Seed for batch and live sampling; random when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Detection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    /// Fraud probability above which an alert is sent
    pub alert_threshold: f64,
    /// Rows scored by the batch action
    pub batch_size: usize,
}

/// Live feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Iteration budget of one live run
    pub max_iterations: u32,
    /// Pause between live iterations in seconds
    pub interval_secs: u64,
}

impl SimulationConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Messaging provider configuration. Credentials come from the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    /// Base URL of the Twilio REST API
    pub api_base: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_PATH)
    }

    /// Load configuration from a specific path.
    ///
    /// Values can be overridden with `FRAUD_DASHBOARD__<SECTION>__<KEY>`.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("FRAUD_DASHBOARD").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig {
                path: PathBuf::from("models/fraud_model.onnx"),
                onnx_threads: 1,
            },
            holdout: HoldoutConfig {
                path: PathBuf::from("data/X_test.csv"),
                seed: None,
            },
            detection: DetectionConfig {
                alert_threshold: 0.90,
                batch_size: 5,
            },
            simulation: SimulationConfig {
                max_iterations: 100,
                interval_secs: 2,
            },
            notifier: NotifierConfig {
                api_base: "https://api.twilio.com".to_string(),
                timeout_secs: 10,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

/// Twilio WhatsApp credentials, read once at startup.
#[derive(Clone, Default, PartialEq)]
pub struct TwilioCredentials {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl TwilioCredentials {
    /// Load from `TWILIO_SID`, `TWILIO_AUTH`, `TWILIO_WHATSAPP_FROM` and
    /// `TWILIO_WHATSAPP_TO`. Call `dotenvy::dotenv()` first to honour `.env`.
    pub fn from_env() -> Self {
        Self {
            account_sid: non_empty_var("TWILIO_SID"),
            auth_token: non_empty_var("TWILIO_AUTH"),
            from: non_empty_var("TWILIO_WHATSAPP_FROM"),
            to: non_empty_var("TWILIO_WHATSAPP_TO"),
        }
    }

    /// Names of the variables that are not set.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("TWILIO_SID", &self.account_sid),
            ("TWILIO_AUTH", &self.auth_token),
            ("TWILIO_WHATSAPP_FROM", &self.from),
            ("TWILIO_WHATSAPP_TO", &self.to),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }
}

impl std::fmt::Debug for TwilioCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioCredentials")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "***"))
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.detection.alert_threshold, 0.90);
        assert_eq!(config.detection.batch_size, 5);
        assert_eq!(config.simulation.max_iterations, 100);
        assert_eq!(config.simulation.interval(), Duration::from_secs(2));
        assert_eq!(config.holdout.seed, None);
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[model]
path = "models/xgb.onnx"

[holdout]
path = "data/holdout.csv"
seed = 42

[detection]
alert_threshold = 0.9
batch_size = 5

[simulation]
max_iterations = 100
interval_secs = 2

[notifier]
api_base = "https://api.twilio.com"
timeout_secs = 10

[logging]
level = "debug"
format = "json"
"#
        )
        .unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.model.path, PathBuf::from("models/xgb.onnx"));
        assert_eq!(config.model.onnx_threads, 1);
        assert_eq!(config.holdout.seed, Some(42));
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_missing_credentials_listed() {
        let creds = TwilioCredentials {
            account_sid: Some("AC123".to_string()),
            auth_token: None,
            from: Some("whatsapp:+14155238886".to_string()),
            to: None,
        };
        assert_eq!(creds.missing(), vec!["TWILIO_AUTH", "TWILIO_WHATSAPP_TO"]);
    }

    #[test]
    fn test_auth_token_redacted_in_debug() {
        let creds = TwilioCredentials {
            auth_token: Some("s3cr3t-token".to_string()),
            ..TwilioCredentials::default()
        };
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("s3cr3t-token"));
        assert!(debug.contains("***"));
    }
}
