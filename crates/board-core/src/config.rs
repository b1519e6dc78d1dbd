//! Configuration management for painboard

use crate::error::{BoardError, Result};
use crate::poll::MIN_POLL_OPTIONS;
use crate::validator::{MAX_COMMENT_LENGTH, MAX_TITLE_LENGTH};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default location of the project config file
pub const DEFAULT_CONFIG_PATH: &str = ".painboard/config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage locations
    pub store: StoreConfig,
    /// Moderation settings
    pub moderation: ModerationConfig,
    /// Submission limits
    pub submissions: SubmissionConfig,
    /// Comment limits
    pub comments: CommentConfig,
    /// Poll settings
    pub polls: PollConfig,
}

impl Config {
    /// Load from a TOML file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| BoardError::from(e).with_context(format!("reading {}", path.display())))?;
        let config = Self::from_toml(&content)?;
        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| BoardError::Toml(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| BoardError::Toml(e.to_string()))
    }

    /// Write to a TOML file, creating the parent directory
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.submissions.max_title_length == 0 {
            return Err(BoardError::Config(
                "submissions.max_title_length must be positive".to_string(),
            ));
        }
        if self.comments.max_length == 0 {
            return Err(BoardError::Config(
                "comments.max_length must be positive".to_string(),
            ));
        }
        if self.polls.min_options < 2 {
            return Err(BoardError::Config(
                "polls.min_options must be at least 2".to_string(),
            ));
        }
        if let Some(bad) = self.moderation.admins.iter().find(|a| !a.contains('@')) {
            return Err(BoardError::Config(format!(
                "moderation.admins entry '{}' is not an email",
                bad
            )));
        }
        Ok(())
    }

    /// Whether the email belongs to a configured admin
    pub fn is_admin(&self, email: &str) -> bool {
        let email = email.trim();
        self.moderation
            .admins
            .iter()
            .any(|a| a.trim().eq_ignore_ascii_case(email))
    }
}

/// Storage locations; unset paths fall back to the platform data directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding one JSON document per collection
    pub data_dir: Option<PathBuf>,
    /// Directory holding the local vote history
    pub history_dir: Option<PathBuf>,
}

/// Moderation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationConfig {
    /// Reject transitions outside the moderation state machine
    pub enforce_transitions: bool,
    /// Emails with admin rights
    pub admins: Vec<String>,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            enforce_transitions: true,
            admins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    pub max_title_length: usize,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            max_title_length: MAX_TITLE_LENGTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentConfig {
    pub max_length: usize,
}

impl Default for CommentConfig {
    fn default() -> Self {
        Self {
            max_length: MAX_COMMENT_LENGTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub min_options: usize,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            min_options: MIN_POLL_OPTIONS,
        }
    }
}
