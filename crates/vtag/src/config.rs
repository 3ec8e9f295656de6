//! Validator configuration from `VTAG_*` environment variables.
//!
//! | Variable | Field | Default |
//! |---|---|---|
//! | `VTAG_DEFAULT_LOCALE` | `default_locale` | `en` |
//! | `VTAG_FALLBACK_LOCALE` | `fallback_locale` | unset |
//! | `VTAG_SNIFF_LIMIT` | `sniff_limit` | `512` (at most 1 MiB) |
//!
//! ```ignore
//! use vtag::config::{load_dotenv, ValidatorConfig};
//! use vtag::Validator;
//!
//! load_dotenv();
//! let config = ValidatorConfig::from_env()?;
//! let validator = Validator::with_config(config);
//! ```

use crate::upload::{DEFAULT_SNIFF_LEN, MAX_SNIFF_LIMIT};
use serde::Deserialize;
use thiserror::Error;

/// Prefix of every configuration variable.
pub const ENV_PREFIX: &str = "VTAG_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Env(#[from] envy::Error),

    #[error("sniff limit must be greater than zero")]
    ZeroSniffLimit,

    #[error("sniff limit {0} exceeds the maximum of {MAX_SNIFF_LIMIT} bytes")]
    SniffLimitTooLarge(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Locale used by [`Validator::validate`](crate::Validator::validate)
    pub default_locale: String,
    /// Locale tried when a message is missing in the requested one
    pub fallback_locale: Option<String>,
    /// Bytes read from an upload for content sniffing
    pub sniff_limit: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            default_locale: "en".to_string(),
            fallback_locale: None,
            sniff_limit: DEFAULT_SNIFF_LEN,
        }
    }
}

impl ValidatorConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        envy::prefixed(ENV_PREFIX)
            .from_env::<Self>()
            .map_err(ConfigError::from)
            .and_then(Self::checked)
    }

    /// Read the configuration from explicit `(name, value)` pairs, using the
    /// same prefixed names as [`from_env`](Self::from_env).
    pub fn from_iter<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(ENV_PREFIX)
            .from_iter::<_, Self>(vars)
            .map_err(ConfigError::from)
            .and_then(Self::checked)
    }

    fn checked(self) -> Result<Self, ConfigError> {
        if self.sniff_limit == 0 {
            return Err(ConfigError::ZeroSniffLimit);
        }
        if self.sniff_limit > MAX_SNIFF_LIMIT {
            return Err(ConfigError::SniffLimitTooLarge(self.sniff_limit));
        }
        Ok(self)
    }

    pub fn default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into();
        self
    }

    pub fn fallback_locale(mut self, locale: impl Into<String>) -> Self {
        self.fallback_locale = Some(locale.into());
        self
    }

    pub fn sniff_limit(mut self, limit: usize) -> Self {
        self.sniff_limit = limit;
        self
    }
}

/// Load a `.env` file from the current directory or its parents, if any.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Load a `.env` file from `path`, if it exists.
pub fn load_dotenv_from<P: AsRef<std::path::Path>>(path: P) {
    let _ = dotenvy::from_path(path);
}
