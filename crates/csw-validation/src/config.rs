//! # Engine Configuration
//!
//! Loaded from YAML, then overridden from `CSW_*` environment variables,
//! then validated.
//!
//! ```yaml
//! company_id: "nl01/COMPANY"
//! home_country: NL
//! permit_exempt_countries: [BE, LU]
//! serialize_usage_checks: true
//! notify_on_pass: true
//! webhook:
//!   url: https://hooks.example.org/csw
//!   timeout_secs: 10
//! log:
//!   filter: "info,csw_validation=debug"
//!   json: false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use csw_core::{CountryCode, HolderId};

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The YAML could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A value is missing or malformed.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Webhook endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Endpoint receiving POSTed events.
    pub url: String,
    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Bearer token sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

/// Log output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

/// Validation engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Holder id of the operating company.
    pub company_id: String,
    /// Country of the operating company.
    pub home_country: String,
    /// Counterpart countries for which no permit is demanded.
    #[serde(default)]
    pub permit_exempt_countries: Vec<String>,
    /// Serialise validations per customer through the lock registry.
    #[serde(default = "default_true")]
    pub serialize_usage_checks: bool,
    /// Notify on a pass outcome.
    #[serde(default = "default_true")]
    pub notify_on_pass: bool,
    /// Webhook endpoint, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookConfig>,
    /// Logging.
    #[serde(default)]
    pub log: LogConfig,
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl EngineConfig {
    /// Minimal configuration for `company_id` in `home_country`.
    pub fn new(company_id: impl Into<String>, home_country: impl Into<String>) -> Self {
        Self {
            company_id: company_id.into(),
            home_country: home_country.into(),
            permit_exempt_countries: Vec::new(),
            serialize_usage_checks: true,
            notify_on_pass: true,
            webhook: None,
            log: LogConfig::default(),
        }
    }

    /// Parse YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Apply `CSW_*` environment overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (the environment, in production).
    pub fn apply_overrides_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(v) = lookup("CSW_COMPANY_ID") {
            self.company_id = v;
        }
        if let Some(v) = lookup("CSW_HOME_COUNTRY") {
            self.home_country = v;
        }
        if let Some(v) = lookup("CSW_SERIALIZE_USAGE_CHECKS") {
            self.serialize_usage_checks = parse_bool("CSW_SERIALIZE_USAGE_CHECKS", &v)?;
        }
        if let Some(url) = lookup("CSW_WEBHOOK_URL") {
            match self.webhook.as_mut() {
                Some(webhook) => webhook.url = url,
                None => {
                    self.webhook = Some(WebhookConfig {
                        url,
                        timeout_secs: default_timeout_secs(),
                        auth_token: None,
                    })
                }
            }
        }
        if let Some(v) = lookup("CSW_LOG_FILTER") {
            self.log.filter = v;
        }
        if let Some(v) = lookup("CSW_LOG_JSON") {
            self.log.json = parse_bool("CSW_LOG_JSON", &v)?;
        }
        Ok(())
    }

    /// Reject a blank company id and malformed country codes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.company_holder()?;
        self.home_country_code()?;
        self.exempt_country_codes()?;
        if let Some(webhook) = &self.webhook {
            if webhook.url.trim().is_empty() {
                return Err(ConfigError::Invalid("webhook.url must not be empty".into()));
            }
        }
        Ok(())
    }

    /// The company's holder id.
    pub fn company_holder(&self) -> Result<HolderId, ConfigError> {
        HolderId::new(self.company_id.as_str())
            .map_err(|e| ConfigError::Invalid(format!("company_id: {e}")))
    }

    /// The parsed home country.
    pub fn home_country_code(&self) -> Result<CountryCode, ConfigError> {
        CountryCode::new(&self.home_country)
            .map_err(|e| ConfigError::Invalid(format!("home_country: {e}")))
    }

    /// The parsed permit-exempt countries.
    pub fn exempt_country_codes(&self) -> Result<Vec<CountryCode>, ConfigError> {
        self.permit_exempt_countries
            .iter()
            .map(|c| {
                CountryCode::new(c)
                    .map_err(|e| ConfigError::Invalid(format!("permit_exempt_countries: {e}")))
            })
            .collect()
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid(format!("{key}: not a boolean: {other}"))),
    }
}
