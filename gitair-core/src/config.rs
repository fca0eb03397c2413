//! Configuration management for git-air
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (GIT_AIR_*)
//! 3. Config file (~/.config/git-air/config.toml)
//! 4. Default values
//!
//! The layered [`Config`] is only a loading format. Before the loop starts it
//! is validated into an immutable [`SyncSettings`] which is what every
//! component receives.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Smallest accepted check interval, in minutes
pub const MIN_INTERVAL_MINUTES: f64 = 0.5;

/// Largest accepted check interval, in minutes
pub const MAX_INTERVAL_MINUTES: f64 = 30.0;

/// Pull passes never run more often than this
pub const MIN_PULL_INTERVAL: Duration = Duration::from_secs(60);

/// Loop-related configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Minutes between commit/push passes
    pub interval_minutes: f64,

    /// Treat every repository as composite regardless of its layout
    pub force_composite: bool,

    /// Directory to discover repositories under
    pub root: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_minutes: MIN_INTERVAL_MINUTES,
            force_composite: false,
            root: PathBuf::from("."),
        }
    }
}

/// Commit message provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MessageConfig {
    /// Ask the external provider for commit messages
    pub enabled: bool,

    /// Executable invoked with the prompt as its only argument
    pub command: String,

    /// How long to wait for the provider before falling back
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Staged diff is cut to this many characters before prompting
    pub max_diff_chars: usize,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: "gemini".to_string(),
            timeout: Duration::from_secs(30),
            max_diff_chars: 2000,
        }
    }
}

/// Git tool configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitConfig {
    /// Path to the git executable
    pub program: String,

    /// Branch pushed and pulled when the current branch cannot be determined
    pub default_branch: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
            default_branch: "main".to_string(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Loop configuration
    pub sync: SyncConfig,

    /// Commit message provider configuration
    pub message: MessageConfig,

    /// Git configuration
    pub git: GitConfig,
}

/// Overrides collected from command line flags
///
/// Boolean flags can only switch a feature on; leaving a flag off keeps
/// whatever the file or environment configured.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// Raw interval argument in minutes
    pub interval: Option<String>,
    /// `--monorepo`
    pub force_composite: bool,
    /// `--ai-commits`
    pub ai_commits: bool,
    /// `--root`
    pub root: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/git-air/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("git-air").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - GIT_AIR_INTERVAL: check interval in minutes
    /// - GIT_AIR_MONOREPO: force composite mode
    /// - GIT_AIR_AI_COMMITS: enable the message provider
    /// - GIT_AIR_MESSAGE_COMMAND: provider executable
    /// - GIT_AIR_GIT: git executable
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(interval) = lookup("GIT_AIR_INTERVAL") {
            self.sync.interval_minutes = parse_minutes(&interval)?;
        }

        if let Some(flag) = lookup("GIT_AIR_MONOREPO") {
            self.sync.force_composite = parse_flag("GIT_AIR_MONOREPO", &flag)?;
        }

        if let Some(flag) = lookup("GIT_AIR_AI_COMMITS") {
            self.message.enabled = parse_flag("GIT_AIR_AI_COMMITS", &flag)?;
        }

        if let Some(command) = lookup("GIT_AIR_MESSAGE_COMMAND") {
            self.message.command = command;
        }

        if let Some(program) = lookup("GIT_AIR_GIT") {
            self.git.program = program;
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, overrides: CliOverrides) -> Result<Self> {
        if let Some(interval) = overrides.interval {
            self.sync.interval_minutes = parse_minutes(&interval)?;
        }

        if overrides.force_composite {
            self.sync.force_composite = true;
        }

        if overrides.ai_commits {
            self.message.enabled = true;
        }

        if let Some(root) = overrides.root {
            self.sync.root = root;
        }

        Ok(self)
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(config_file: Option<&Path>, overrides: CliOverrides) -> Result<Self> {
        let base = match config_file {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };

        base.with_env_overrides()?.with_cli_overrides(overrides)
    }

    /// Check the configuration and freeze it into the settings the loop runs with
    pub fn validate(&self) -> Result<SyncSettings> {
        let check_interval = interval_from_minutes(self.sync.interval_minutes)?;

        if self.git.program.trim().is_empty() {
            return Err(Error::Config("git program must not be empty".to_string()));
        }

        let messages = if self.message.enabled {
            if self.message.command.trim().is_empty() {
                return Err(Error::Config(
                    "message provider is enabled but no command is configured".to_string(),
                ));
            }
            Some(MessageSettings {
                command: self.message.command.clone(),
                timeout: self.message.timeout,
                max_diff_chars: self.message.max_diff_chars,
            })
        } else {
            None
        };

        Ok(SyncSettings {
            check_interval,
            pull_interval: check_interval.max(MIN_PULL_INTERVAL),
            force_composite: self.sync.force_composite,
            root: self.sync.root.clone(),
            git_program: self.git.program.clone(),
            default_branch: self.git.default_branch.clone(),
            messages,
        })
    }
}

/// Immutable settings threaded through every pass of the loop
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Time between commit/push passes
    pub check_interval: Duration,
    /// Minimum time between pull passes
    pub pull_interval: Duration,
    /// Classify every repository as composite
    pub force_composite: bool,
    /// Discovery root
    pub root: PathBuf,
    /// Git executable
    pub git_program: String,
    /// Fallback when the current branch cannot be resolved
    pub default_branch: String,
    /// Present only when the message provider is enabled
    pub messages: Option<MessageSettings>,
}

/// Message provider settings
#[derive(Debug, Clone)]
pub struct MessageSettings {
    pub command: String,
    pub timeout: Duration,
    pub max_diff_chars: usize,
}

/// Parse an interval given in minutes and check it is within bounds
pub fn parse_interval(value: &str) -> Result<Duration> {
    interval_from_minutes(parse_minutes(value)?)
}

/// Convert minutes to a check interval, enforcing the inclusive bounds
pub fn interval_from_minutes(minutes: f64) -> Result<Duration> {
    if !(MIN_INTERVAL_MINUTES..=MAX_INTERVAL_MINUTES).contains(&minutes) {
        return Err(Error::Config(format!(
            "interval must be between {} and {} minutes, got: {}",
            MIN_INTERVAL_MINUTES, MAX_INTERVAL_MINUTES, minutes
        )));
    }

    Ok(Duration::from_secs_f64(minutes * 60.0))
}

fn parse_minutes(value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| Error::Config(format!("invalid interval format '{}': {}", value, e)))
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(Error::Config(format!("{} must be a boolean, got '{}'", name, other))),
    }
}
