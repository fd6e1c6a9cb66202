//! Configuration types for Moot.

use crate::error::MootError;
use crate::Result;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration for the Moot governance facade.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MootConfig {
    /// Storage configuration.
    pub store: StoreConfig,

    /// Proposal rules.
    pub governance: GovernanceConfig,

    /// Points ledger settings.
    pub points: PointsConfig,

    /// Logging settings.
    pub log: LogConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the sled database directory.
    pub db_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./moot.db"),
        }
    }
}

/// Proposal rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceConfig {
    /// Points debited from the initiator to open a proposal. Never refunded.
    pub stake: u64,

    /// Percent of the electorate that must vote yes (1 to 100).
    pub approval_percent: u8,

    /// Time between opening a proposal and its deadline.
    pub voting_window_secs: u64,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            stake: 100,
            approval_percent: 51,
            voting_window_secs: 86_400,
        }
    }
}

/// Points ledger settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointsConfig {
    /// Opening balance of a new account.
    pub initial_balance: u64,

    /// Maximum gap between logins that keeps a streak alive.
    pub streak_window_secs: u64,
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            initial_balance: 100,
            streak_window_secs: 86_400,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing-subscriber` filter directive; `RUST_LOG` overrides it.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl MootConfig {
    /// Loads a TOML configuration file. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// `Config` if the file cannot be read or parsed, or fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| MootError::Config(format!("cannot read {}: {e}", path.display())))?;
        let config = Self::from_toml(&text)?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| MootError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| MootError::Config(e.to_string()))
    }

    /// Checks the governance rules.
    pub fn validate(&self) -> Result<()> {
        if self.governance.stake == 0 {
            return Err(MootError::Config("governance.stake must be positive".to_string()));
        }
        if self.governance.voting_window_secs == 0 {
            return Err(MootError::Config(
                "governance.voting_window_secs must be positive".to_string(),
            ));
        }
        if !(1..=100).contains(&self.governance.approval_percent) {
            return Err(MootError::Config(format!(
                "governance.approval_percent must be between 1 and 100, got {}",
                self.governance.approval_percent
            )));
        }
        Ok(())
    }

    pub fn voting_window(&self) -> Duration {
        Duration::seconds(saturating_secs(self.governance.voting_window_secs))
    }

    pub fn streak_window(&self) -> Duration {
        Duration::seconds(saturating_secs(self.points.streak_window_secs))
    }
}

// chrono panics past roughly 292 million years; clamp to a century.
fn saturating_secs(secs: u64) -> i64 {
    const CENTURY: i64 = 100 * 365 * 86_400;
    i64::try_from(secs).map_or(CENTURY, |s| s.min(CENTURY))
}
