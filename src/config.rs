//! Runtime configuration loaded from `config.toml`.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use iso_currency::Currency;
use serde::{Deserialize, Serialize};

use crate::core::DEFAULT_EXCHANGE_RATE;
use crate::store::CsvLedgerStore;

/// Environment variable overriding [`Config::data_dir`].
pub const DATA_DIR_ENV: &str = "HOME_EXPENSE_DIR";

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read configuration: {e}"),
            ConfigError::Parse(msg) => write!(f, "cannot parse configuration: {msg}"),
            ConfigError::Invalid(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the monthly ledger files.
    pub data_dir: PathBuf,
    /// Multiplier from the primary to the secondary currency.
    pub exchange_rate: f64,
    /// ISO 4217 code of the currency amounts are entered in.
    pub primary_currency: String,
    /// ISO 4217 code of the converted display currency.
    pub secondary_currency: String,
    /// Extra attempts after a transient storage failure.
    pub save_retries: u32,
    /// Delay before the first retry, doubled on each attempt.
    pub retry_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("HomeExpense"),
            exchange_rate: DEFAULT_EXCHANGE_RATE,
            primary_currency: "AED".to_string(),
            secondary_currency: "INR".to_string(),
            save_retries: 2,
            retry_delay_ms: 50,
        }
    }
}

impl Config {
    /// Parses and validates a TOML document.
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_toml(&data)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(data) => Self::from_toml(&data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::Io(e)),
        }
    }

    /// Applies [`DATA_DIR_ENV`] from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_data_dir_override(std::env::var_os(DATA_DIR_ENV))
    }

    /// Replaces the data directory when `value` is set and non-empty.
    pub fn with_data_dir_override(mut self, value: Option<OsString>) -> Self {
        if let Some(dir) = value.filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.exchange_rate.is_finite() || self.exchange_rate <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "exchange_rate must be positive, got {}",
                self.exchange_rate
            )));
        }
        self.currencies().map(|_| ())
    }

    /// Primary and secondary currencies.
    pub fn currencies(&self) -> Result<(Currency, Currency), ConfigError> {
        let lookup = |code: &str| {
            Currency::from_code(code)
                .ok_or_else(|| ConfigError::Invalid(format!("unknown currency code {code:?}")))
        };
        Ok((
            lookup(&self.primary_currency)?,
            lookup(&self.secondary_currency)?,
        ))
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// File store rooted at the configured data directory.
    pub fn store(&self) -> CsvLedgerStore {
        CsvLedgerStore::with_exchange_rate(&self.data_dir, self.exchange_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn env_override_replaces_data_dir() {
        let cfg = Config::default().with_data_dir_override(Some(OsString::from("/tmp/ledgers")));
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/ledgers"));
        let cfg = Config::default().with_data_dir_override(Some(OsString::new()));
        assert_eq!(cfg.data_dir, PathBuf::from("HomeExpense"));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("home-expense-no-such-config.toml");
        assert_eq!(Config::load_or_default(&path).unwrap(), Config::default());
        assert!(matches!(Config::load(&path), Err(ConfigError::Io(_))));
    }
}
