//! Voting core configuration with TOML file support.

use agora_types::Address;
use agora_utils::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::session::MAX_WIN_THRESHOLD;
use crate::VotingError;

/// What happens to a voter's earlier ballot when vote changing is enabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChangePolicy {
    /// Overwrite the voter record and add fresh totals; the earlier
    /// contribution stays counted.
    #[default]
    Accumulate,
    /// Subtract the earlier same-round contribution before adding the new one.
    Replace,
}

/// Configuration for a voting core instance.
///
/// Can be loaded from a TOML file via [`VotingConfig::from_toml_file`] or
/// built programmatically (e.g. for tests) via [`VotingConfig::new`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VotingConfig {
    /// The administrator identity.
    pub admin: Address,

    /// Winning threshold (percent) assigned to every new session.
    #[serde(default = "default_win_threshold")]
    pub default_win_threshold: u8,

    #[serde(default)]
    pub vote_change_policy: VoteChangePolicy,

    /// Reject rankings that name unknown, inactive or repeated options.
    #[serde(default = "default_true")]
    pub validate_rankings: bool,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_win_threshold() -> u8 {
    50
}

fn default_true() -> bool {
    true
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl VotingConfig {
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            default_win_threshold: default_win_threshold(),
            vote_change_policy: VoteChangePolicy::default(),
            validate_rankings: default_true(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, VotingError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| VotingError::InvalidConfig(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, VotingError> {
        let config: Self =
            toml::from_str(s).map_err(|e| VotingError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, VotingError> {
        toml::to_string_pretty(self).map_err(|e| VotingError::Serialization(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), VotingError> {
        if !self.admin.is_valid() {
            return Err(VotingError::InvalidConfig(format!(
                "admin address {:?} is malformed",
                self.admin.as_str()
            )));
        }
        if self.default_win_threshold > MAX_WIN_THRESHOLD {
            return Err(VotingError::InvalidConfig(format!(
                "default_win_threshold {} exceeds {MAX_WIN_THRESHOLD}",
                self.default_win_threshold
            )));
        }
        self.parsed_log_format()?;
        Ok(())
    }

    pub fn parsed_log_format(&self) -> Result<LogFormat, VotingError> {
        self.log_format.parse().map_err(VotingError::InvalidConfig)
    }

    /// Install the global tracing subscriber described by this config.
    ///
    /// Returns `false` when a subscriber was already installed.
    pub fn init_logging(&self) -> Result<bool, VotingError> {
        let format = self.parsed_log_format()?;
        Ok(agora_utils::init_logging(format, &self.log_level))
    }
}
