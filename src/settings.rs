use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::{ReportError, Result};

pub const API_KEY_VAR: &str = "STRIPE_API_KEY";
const API_BASE_VAR: &str = "STRIPE_API_BASE";
const CONFIG_PATH_VAR: &str = "PAYOUT_REPORT_CONFIG";
const RESTRICTED_KEY_PREFIX: &str = "rk_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Product label used for direct charges that have no checkout line items.
    #[serde(default = "default_topup_label")]
    pub topup_label: String,
    #[serde(default = "default_require_restricted_key")]
    pub require_restricted_key: bool,
}

fn default_api_base() -> String {
    "https://api.stripe.com".to_string()
}

fn default_topup_label() -> String {
    "Top-up".to_string()
}

fn default_require_restricted_key() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            topup_label: default_topup_label(),
            require_restricted_key: default_require_restricted_key(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("payout-report")
}

/// Settings file merged with environment overrides. The default file falls
/// back to the defaults when missing or malformed; a file named through
/// `PAYOUT_REPORT_CONFIG` must exist and parse.
pub fn load_settings() -> Result<Settings> {
    let mut settings = match std::env::var_os(CONFIG_PATH_VAR) {
        Some(path) => read_explicit_settings(Path::new(&path))?,
        None => read_settings(&config_dir().join("settings.json")),
    };
    if let Ok(base) = std::env::var(API_BASE_VAR) {
        if !base.trim().is_empty() {
            settings.api_base = base.trim().to_string();
        }
    }
    Ok(settings)
}

fn read_explicit_settings(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ReportError::Settings(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&content)
        .map_err(|e| ReportError::Settings(format!("{}: {e}", path.display())))
}

fn read_settings(path: &Path) -> Settings {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Settings::default();
    };
    serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), "ignoring malformed settings file: {e}");
        Settings::default()
    })
}

/// Stripe secret, wiped from memory when dropped.
pub struct ApiKey(String);

impl ApiKey {
    pub fn from_env(settings: &Settings) -> Result<Self> {
        let raw = std::env::var(API_KEY_VAR)
            .map_err(|_| ReportError::Authentication(format!("{API_KEY_VAR} is not set")))?;
        Self::parse(raw, settings.require_restricted_key)
    }

    pub fn parse(mut raw: String, require_restricted: bool) -> Result<Self> {
        let key = ApiKey(raw.trim().to_string());
        raw.zeroize();

        if key.0.is_empty() {
            return Err(ReportError::Authentication(format!("{API_KEY_VAR} is empty")));
        }
        if require_restricted && !key.0.starts_with(RESTRICTED_KEY_PREFIX) {
            return Err(ReportError::Authentication(format!(
                "{API_KEY_VAR} must be a restricted API key ({RESTRICTED_KEY_PREFIX}...)"
            )));
        }
        Ok(key)
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl Drop for ApiKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let visible: String = self.0.chars().take(8).collect();
        write!(f, "ApiKey({visible}***)")
    }
}
