// Copyright (c) 2026 - present reword contributors
// SPDX-License-Identifier: MIT

//! Persistent settings
//!
//! Settings come from a TOML file with four sections. Every key is optional
//! and falls back to a built-in default; environment variables are applied
//! on top.
//!
//! Lookup order for the file:
//! 1. the path given with `--config`
//! 2. `.reword.toml` in the current directory
//! 3. `reword/config.toml` under the platform config directory

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// File name looked up in the current directory
pub const LOCAL_SETTINGS_FILE: &str = ".reword.toml";

/// Environment variable holding the provider API key
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";
/// Environment variable overriding the model
pub const MODEL_ENV: &str = "REWORD_MODEL";
/// Environment variable overriding auto-apply
pub const AUTO_APPLY_ENV: &str = "REWORD_AUTO_APPLY";

/// All settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Generation service
    pub provider: ProviderSettings,
    /// Run defaults
    pub defaults: DefaultSettings,
    /// Review and safety behaviour
    pub behavior: BehaviorSettings,
    /// Output and message formatting
    pub formatting: FormattingSettings,
}

/// `[provider]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// API key; usually supplied through the environment instead
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
    /// Base URL of an OpenAI-compatible API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Sampling temperature
    pub temperature: f32,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4".to_string(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            timeout_secs: 60,
            temperature: 0.7,
            max_tokens: 500,
        }
    }
}

/// `[defaults]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultSettings {
    /// Commits processed when no scope is given
    pub default_commit_count: usize,
    /// Apply generated messages without asking
    pub auto_apply: bool,
    /// Ask the operator why the changes were made
    pub prompt_user_for_why: bool,
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            default_commit_count: 5,
            auto_apply: false,
            prompt_user_for_why: true,
        }
    }
}

/// `[behavior]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorSettings {
    /// Print the diff of each commit before generating
    pub show_diff: bool,
    /// Leave merge commits out of every scope
    pub skip_merge_commits: bool,
    /// Ask before rewriting a branch that exists on a remote
    pub warn_on_shared_branches: bool,
    /// Strip one pair of enclosing double quotes from messages
    pub remove_quotes: bool,
    /// Ask for a reason per commit even in multi-commit runs
    pub rationale_per_commit: bool,
}

impl Default for BehaviorSettings {
    fn default() -> Self {
        Self {
            show_diff: true,
            skip_merge_commits: true,
            warn_on_shared_branches: true,
            remove_quotes: true,
            rationale_per_commit: false,
        }
    }
}

/// `[formatting]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormattingSettings {
    /// Colour terminal output
    pub use_color: bool,
    /// Shape of generated messages
    pub message_style: MessageStyle,
}

impl Default for FormattingSettings {
    fn default() -> Self {
        Self {
            use_color: true,
            message_style: MessageStyle::Descriptive,
        }
    }
}

/// Shape of generated messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStyle {
    /// Subject line plus an optional body
    #[default]
    Descriptive,
    /// Conventional Commits (`type(scope): subject`)
    Conventional,
    /// A single subject line
    Concise,
}

impl fmt::Display for MessageStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageStyle::Descriptive => "descriptive",
            MessageStyle::Conventional => "conventional",
            MessageStyle::Concise => "concise",
        };
        f.write_str(name)
    }
}

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A settings file named on the command line does not exist
    #[error("Settings file not found: {0}")]
    NotFound(PathBuf),

    /// The settings file could not be read
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for these settings
    #[error("Invalid settings in {path}: {source}")]
    Parse {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: toml::de::Error,
    },

    /// Settings could not be rendered as TOML
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The settings file could not be written
    #[error("Failed to write settings file {path}: {source}")]
    Write {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
}

impl Settings {
    /// Load settings using the standard lookup order, then apply the environment
    ///
    /// Returns the settings and the file they came from, if any.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if an explicit file is missing, or if the
    /// chosen file cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), SettingsError> {
        let (mut settings, source) = Self::load_file(explicit, &Self::search_paths())?;
        settings.apply_env();
        Ok((settings, source))
    }

    /// Load from `explicit`, or from the first existing file in `candidates`
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if `explicit` does not exist, or if the chosen
    /// file cannot be read or parsed.
    pub fn load_file(
        explicit: Option<&Path>,
        candidates: &[PathBuf],
    ) -> Result<(Self, Option<PathBuf>), SettingsError> {
        let path = match explicit {
            Some(path) if !path.exists() => return Err(SettingsError::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => candidates.iter().find(|p| p.is_file()).cloned(),
        };

        let Some(path) = path else {
            debug!("no settings file found; using defaults");
            return Ok((Self::default(), None));
        };

        let content = fs::read_to_string(&path).map_err(|source| SettingsError::Read {
            path: path.clone(),
            source,
        })?;
        let settings = Self::from_toml_str(&content).map_err(|source| SettingsError::Parse {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "loaded settings");
        Ok((settings, Some(path)))
    }

    /// Parse settings from TOML text
    ///
    /// # Errors
    ///
    /// Returns the TOML error if the text is malformed or a value has the
    /// wrong type.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Default settings file locations, most specific first
    #[must_use]
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_SETTINGS_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("reword").join("config.toml"));
        }
        paths
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.provider.api_key = Some(key);
        }
        if let Some(model) = lookup(MODEL_ENV).filter(|m| !m.trim().is_empty()) {
            debug!(%model, "model overridden from environment");
            self.provider.model = model;
        }
        if let Some(value) = lookup(AUTO_APPLY_ENV) {
            self.defaults.auto_apply = is_truthy(&value);
        }
    }

    /// Write settings as TOML, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let content = toml::to_string_pretty(self)?;
        let write_err = |source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, content).map_err(write_err)
    }
}

/// `true`, `yes` and `1` (any case) are true; everything else is false
fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "1"
    )
}
