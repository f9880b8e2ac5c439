//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/casemix/casemix.toml`
//! 3. Local config: file given with `--config`
//! 4. Environment variables: `CASEMIX_*` prefix, `__` between sections

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Pricing grid layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PricingConfig {
    /// Number of duration rows (durations `0..max_duration`)
    pub max_duration: u32,
    /// Merge adjacent equal header cells
    pub merge_cells: bool,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            max_duration: 200,
            merge_cells: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct TreeConfig {
    /// Node where reconstruction starts
    pub start_node: usize,
}

/// Raw settings for intermediate parsing: `None` means "not specified, inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_dir: Option<PathBuf>,
    pub pricing: RawPricingConfig,
    pub tree: RawTreeConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawPricingConfig {
    pub max_duration: Option<u32>,
    pub merge_cells: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTreeConfig {
    pub start_node: Option<usize>,
}

/// Unified configuration for casemix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Root of the per-version data directories (default: ~/.casemix/data)
    pub data_dir: PathBuf,
    pub pricing: PricingConfig,
    pub tree: TreeConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            pricing: PricingConfig::default(),
            tree: TreeConfig::default(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".casemix").join("data"))
        .unwrap_or_else(|| PathBuf::from("~/.casemix/data"))
}

/// Get the XDG config directory for casemix.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "casemix").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("casemix.toml"))
}

/// Expand `~`, `$VAR` and `${VAR}`; unknown variables leave the input unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.data_dir.to_string_lossy().as_ref());
        self.data_dir = PathBuf::from(expanded);
    }

    /// Overlay the values specified in `raw`.
    fn merge_with(&self, raw: &RawSettings) -> Self {
        Self {
            data_dir: raw.data_dir.clone().unwrap_or_else(|| self.data_dir.clone()),
            pricing: PricingConfig {
                max_duration: raw.pricing.max_duration.unwrap_or(self.pricing.max_duration),
                merge_cells: raw.pricing.merge_cells.unwrap_or(self.pricing.merge_cells),
            },
            tree: TreeConfig {
                start_node: raw.tree.start_node.unwrap_or(self.tree.start_node),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// A `local` file that does not exist is an error; the global file is optional.
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(local_path) = local {
            current = current.merge_with(&load_raw_settings(local_path)?);
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply CASEMIX_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("CASEMIX")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        let raw = RawSettings {
            data_dir: optional(config.get_string("data_dir"))?.map(PathBuf::from),
            pricing: RawPricingConfig {
                max_duration: optional(config.get::<u32>("pricing.max_duration"))?,
                merge_cells: optional(config.get_bool("pricing.merge_cells"))?,
            },
            tree: RawTreeConfig {
                start_node: optional(config.get::<usize>("tree.start_node"))?,
            },
        };
        Ok(settings.merge_with(&raw))
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# casemix configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/casemix/casemix.toml
#   Local:  file passed with --config
#   Env:    CASEMIX_* environment variables, e.g. CASEMIX_PRICING__MAX_DURATION=60

# Root of the version directories (<data_dir>/<YYYY-MM-DD>/classifier_tree.json)
# data_dir = "~/.casemix/data"

[pricing]
# Durations shown in a pricing grid: 0 .. max_duration - 1 nights
# max_duration = 200

# Merge adjacent header cells showing the same value
# merge_cells = true

[tree]
# Node where tree reconstruction starts
# start_node = 0
"#
        .to_string()
    }
}

/// Missing keys are "not specified"; malformed values are errors.
fn optional<T>(value: Result<T, ConfigError>) -> Result<Option<T>, ApplicationError> {
    match value {
        Ok(v) => Ok(Some(v)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::load(None).expect("load defaults");
        assert!(settings.data_dir.to_string_lossy().contains(".casemix"));
        assert_eq!(settings.pricing.max_duration, 200);
        assert!(settings.pricing.merge_cells);
        assert_eq!(settings.tree.start_node, 0);
    }

    #[test]
    fn given_tilde_in_data_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            data_dir: PathBuf::from("~/casemix"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let dir = settings.data_dir.to_string_lossy();
        assert!(dir.starts_with(&home), "data_dir should start with home dir: {}", dir);
        assert!(!dir.contains('~'));
    }

    #[test]
    fn given_partial_overlay_when_merging_then_keeps_unspecified_values() {
        let base = Settings::default();
        let raw = RawSettings {
            pricing: RawPricingConfig {
                max_duration: Some(40),
                merge_cells: None,
            },
            ..RawSettings::default()
        };

        let merged = base.merge_with(&raw);

        assert_eq!(merged.pricing.max_duration, 40);
        assert!(merged.pricing.merge_cells);
        assert_eq!(merged.data_dir, base.data_dir);
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("template parses");
        assert!(raw.data_dir.is_none());
    }

    #[test]
    fn given_settings_when_serialized_then_round_trips() {
        let settings = Settings::default();
        let text = settings.to_toml().unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }
}
