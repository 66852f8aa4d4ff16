//! Configuration loader and validator.
//!
//! Settings come from a YAML file, optionally overlaid by the JSON
//! credentials file the companion export tool produces and by the
//! `GRUPETA_API_KEY` environment variable. Validation runs after all
//! overlays, in `main`, so secrets never have to live in the YAML itself.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::importer::{ColumnAliases, HeaderRow, ParseOptions};
use crate::phone;

/// Environment variable overriding the provider API key.
const API_KEY_ENV: &str = "GRUPETA_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("credentials parse error: {0}")]
    Credentials(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Config {
    #[serde(default)]
    pub import: Import,
    #[serde(default)]
    pub provider: Provider,
}

/// Importer settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Import {
    #[serde(default)]
    pub delimiter: DelimiterSetting,
    #[serde(default)]
    pub header_row: HeaderSetting,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DelimiterSetting {
    #[default]
    Auto,
    Comma,
    Semicolon,
    Tab,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HeaderSetting {
    None,
    #[default]
    Skip,
    Named,
}

/// Group-messaging provider settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Provider {
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub admin_phone: String,
}

/// Credentials file as the companion tool exports it:
/// `{ "telefono": …, "apiKey": …, "apiUrl": … }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Credentials {
    pub telefono: Option<String>,
    pub api_key: Option<String>,
    pub api_url: Option<String>,
}

impl Import {
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            delimiter: match self.delimiter {
                DelimiterSetting::Auto => None,
                DelimiterSetting::Comma => Some(','),
                DelimiterSetting::Semicolon => Some(';'),
                DelimiterSetting::Tab => Some('\t'),
            },
            header: match self.header_row {
                HeaderSetting::None => HeaderRow::None,
                HeaderSetting::Skip => HeaderRow::Skip,
                HeaderSetting::Named => HeaderRow::Named,
            },
            aliases: ColumnAliases::default(),
        }
    }
}

impl Config {
    /// Overlay present, non-empty credential fields onto the provider
    /// settings.
    pub fn apply_credentials(&mut self, creds: &Credentials) {
        let set = |target: &mut String, value: &Option<String>| {
            if let Some(v) = value {
                if !v.trim().is_empty() {
                    *target = v.trim().to_string();
                }
            }
        };
        set(&mut self.provider.admin_phone, &creds.telefono);
        set(&mut self.provider.api_key, &creds.api_key);
        set(&mut self.provider.api_url, &creds.api_url);
    }

    /// Overlay the API key from the environment, if set.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.provider.api_key = key.trim().to_string();
            }
        }
    }

    /// Check that the provider settings are usable. Runs after all overlays;
    /// commands that never touch the network skip it.
    pub fn validate_provider(&self) -> Result<(), ConfigError> {
        if self.provider.api_url.trim().is_empty() {
            return Err(ConfigError::Invalid("provider.api_url must be non-empty"));
        }
        if reqwest::Url::parse(self.provider.api_url.trim()).is_err() {
            return Err(ConfigError::Invalid("provider.api_url must be a valid URL"));
        }
        if self.provider.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid("provider.api_key must be non-empty"));
        }
        let admin = phone::normalize(&self.provider.admin_phone);
        if !phone::is_valid(&admin) {
            return Err(ConfigError::Invalid(
                "provider.admin_phone must be a Spanish mobile number",
            ));
        }
        Ok(())
    }
}

/// Load configuration from a YAML file.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Like [`load`], but a missing file yields the defaults instead of an
/// error, so commands that only parse local text keep working without any
/// configuration at all.
pub fn load_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    if path.exists() {
        load(Some(path))
    } else {
        Ok(Config::default())
    }
}

/// Load the JSON credentials overlay file.
pub fn load_credentials(path: &Path) -> Result<Credentials, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Returns a complete example configuration.
pub fn example() -> &'static str {
    r#"import:
  # auto | comma | semicolon | tab
  delimiter: auto
  # none | skip | named
  header_row: skip

provider:
  api_url: "https://gate.example.com/v1"
  api_key: "YOUR_PROVIDER_TOKEN"
  admin_phone: "612 345 678"
"#
}
