//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/breedpath/breedpath.toml`
//! 3. Local config: `<dir>/.breedpath.toml`
//! 4. Environment variables: `BREEDPATH_*` prefix
//!
//! Command-line flags are applied on top by the CLI layer.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::{expand_env_vars, DEFAULT_MAX_DEPTH};

/// Name of the local config file.
pub const LOCAL_CONFIG_FILE: &str = ".breedpath.toml";

/// Unified configuration for breedpath.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Catalog used when no `--file` is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_file: Option<PathBuf>,
    /// Longest breeding path the search explores (default: 10)
    pub max_depth: usize,
    /// Reject malformed catalog lines instead of skipping them
    pub strict: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_file: None,
            max_depth: DEFAULT_MAX_DEPTH,
            strict: false,
        }
    }
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub catalog_file: Option<PathBuf>,
    pub max_depth: Option<usize>,
    pub strict: Option<bool>,
}

/// Get the XDG config directory for breedpath.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "breedpath").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("breedpath.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(LOCAL_CONFIG_FILE)
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

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(file) = &self.catalog_file {
            let expanded = expand_env_vars(file.to_string_lossy().as_ref());
            self.catalog_file = Some(PathBuf::from(expanded));
        }
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            catalog_file: overlay
                .catalog_file
                .clone()
                .or_else(|| self.catalog_file.clone()),
            max_depth: overlay.max_depth.unwrap_or(self.max_depth),
            strict: overlay.strict.unwrap_or(self.strict),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.breedpath.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_layers(global_config_path().as_deref(), local_dir)
    }

    /// Load settings from an explicit global config file and local directory.
    ///
    /// Missing files are skipped; unreadable or invalid ones are errors.
    pub fn load_layers(
        global_path: Option<&Path>,
        local_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_path {
            if global_path.exists() {
                debug!("config: global {}", global_path.display());
                let raw = load_raw_settings(global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("config: local {}", local_path.display());
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        Ok(current)
    }

    /// Apply BREEDPATH_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("BREEDPATH")
                    .prefix_separator("_")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("catalog_file") {
            settings.catalog_file = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_int("max_depth") {
            settings.max_depth = usize::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("BREEDPATH_MAX_DEPTH must not be negative: {val}"),
            })?;
        }
        if let Ok(val) = config.get_bool("strict") {
            settings.strict = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# breedpath configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/breedpath/breedpath.toml
#   Local:  ./.breedpath.toml
#   Env:    BREEDPATH_* environment variables (e.g. BREEDPATH_MAX_DEPTH=6)
#   Flags:  --file, --max-depth, --strict

# Catalog of breeding formulas, one "parent1+parent2=child" per line
# catalog_file = "~/breeding.txt"

# Longest breeding path to search for
# max_depth = 10

# Fail on malformed lines instead of skipping them
# strict = false
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
