//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/corpview/corpview.toml`
//! 3. Local config: `<dir>/.corpview.toml`
//! 4. Environment variables: `CORPVIEW_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Tree rendering options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Append the relevance score to every rendered node
    pub show_priority: bool,
    /// Render nodes with priority 0 dimmed
    pub dim_unmatched: bool,
    /// Start with every node expanded
    pub expand_all: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_priority: false,
            dim_unmatched: true,
            expand_all: false,
        }
    }
}

/// Defaults for the search request built from the selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchConfig {
    /// Search language code, None for any language
    pub language: Option<String>,
    /// First record to request (1-based)
    pub start_record: u32,
    /// Records requested per corpus
    pub max_records: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            language: None,
            start_record: 1,
            max_records: 10,
        }
    }
}

/// Raw display config for intermediate parsing (Option detects "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDisplayConfig {
    pub show_priority: Option<bool>,
    pub dim_unmatched: Option<bool>,
    pub expand_all: Option<bool>,
}

/// Raw search config for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSearchConfig {
    pub language: Option<String>,
    pub start_record: Option<u32>,
    pub max_records: Option<u32>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub corpora_file: Option<PathBuf>,
    pub display: RawDisplayConfig,
    pub search: RawSearchConfig,
}

/// Unified configuration for corpview.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    /// Cached corpora JSON used when no file is given on the command line
    pub corpora_file: Option<PathBuf>,
    pub display: DisplayConfig,
    pub search: SearchConfig,
}

/// Get the XDG config directory for corpview.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "corpview").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("corpview.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".corpview.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

/// Expand `~`, `$VAR` and `${VAR}`; unresolvable input is kept as is.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl Settings {
    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            corpora_file: overlay
                .corpora_file
                .clone()
                .or_else(|| self.corpora_file.clone()),
            display: DisplayConfig {
                show_priority: overlay
                    .display
                    .show_priority
                    .unwrap_or(self.display.show_priority),
                dim_unmatched: overlay
                    .display
                    .dim_unmatched
                    .unwrap_or(self.display.dim_unmatched),
                expand_all: overlay
                    .display
                    .expand_all
                    .unwrap_or(self.display.expand_all),
            },
            search: SearchConfig {
                language: overlay
                    .search
                    .language
                    .clone()
                    .or_else(|| self.search.language.clone()),
                start_record: overlay
                    .search
                    .start_record
                    .unwrap_or(self.search.start_record),
                max_records: overlay
                    .search
                    .max_records
                    .unwrap_or(self.search.max_records),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.corpview.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path().filter(|p| p.exists());
        Self::load_from(global.as_deref(), local_dir)
    }

    /// Load settings from explicit config locations.
    ///
    /// Missing files are skipped; a file that exists but does not parse is an error.
    pub fn load_from(
        global_file: Option<&Path>,
        local_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_file.filter(|p| p.exists()) {
            let raw = load_raw_settings(global_path)?;
            current = current.merge_with(&raw);
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;

        if let Some(file) = current.corpora_file.as_deref() {
            current.corpora_file = Some(expand_path(file));
        }

        current.validate()?;
        Ok(current)
    }

    /// Apply CORPVIEW_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("CORPVIEW").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("corpora_file") {
            settings.corpora_file = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_bool("display.show_priority") {
            settings.display.show_priority = val;
        }
        if let Ok(val) = config.get_bool("display.dim_unmatched") {
            settings.display.dim_unmatched = val;
        }
        if let Ok(val) = config.get_bool("display.expand_all") {
            settings.display.expand_all = val;
        }
        if let Ok(val) = config.get_string("search.language") {
            settings.search.language = Some(val);
        }
        if let Ok(val) = config.get::<u32>("search.start_record") {
            settings.search.start_record = val;
        }
        if let Ok(val) = config.get::<u32>("search.max_records") {
            settings.search.max_records = val;
        }

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.search.start_record == 0 {
            return Err(ApplicationError::Config {
                message: "search.start_record must be at least 1".into(),
            });
        }
        if self.search.max_records == 0 {
            return Err(ApplicationError::Config {
                message: "search.max_records must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Render the effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}
