//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/fmodel/fmodel.toml`
//! 3. Local config: `<project_dir>/.fmodel.toml`
//! 4. Environment variables: `FMODEL_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::notes::{DEFAULT_TAG_CAP, MIN_TAG_CAP};
use crate::domain::RootPolicy;

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub store_path: Option<PathBuf>,
    pub root_policy: Option<RootPolicy>,
    pub note_tag_cap: Option<usize>,
    pub default_scope: Option<String>,
}

/// Unified configuration for fmodel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Model store file used when `--store` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
    /// What to do when a scope has several parentless elements
    pub root_policy: RootPolicy,
    /// Maximum number of `$XX$` tags honored when unpacking notes
    pub note_tag_cap: usize,
    /// Scope element used when a command does not name one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_scope: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: None,
            root_policy: RootPolicy::default(),
            note_tag_cap: DEFAULT_TAG_CAP,
            default_scope: None,
        }
    }
}

/// Get the XDG config directory for fmodel.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "fmodel").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("fmodel.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".fmodel.toml")
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
    ///
    /// Handles `~`, `$VAR`, and `${VAR}` syntax. Unknown variables are left as-is.
    fn expand_paths(&mut self) {
        if let Some(path) = &self.store_path {
            let raw = path.to_string_lossy();
            let expanded = shellexpand::full(raw.as_ref())
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| raw.to_string());
            self.store_path = Some(PathBuf::from(expanded));
        }
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            store_path: overlay
                .store_path
                .clone()
                .or_else(|| self.store_path.clone()),
            root_policy: overlay.root_policy.unwrap_or(self.root_policy),
            note_tag_cap: overlay.note_tag_cap.unwrap_or(self.note_tag_cap),
            default_scope: overlay
                .default_scope
                .clone()
                .or_else(|| self.default_scope.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Directory searched for `.fmodel.toml` (default: none)
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Project-local config
        if let Some(dir) = project_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Apply FMODEL_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder =
            Config::builder().add_source(Environment::with_prefix("FMODEL").separator("__"));
        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("store_path") {
            settings.store_path = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_string("root_policy") {
            settings.root_policy = val.parse().map_err(|e| ApplicationError::Config {
                message: format!("FMODEL_ROOT_POLICY: {e}"),
            })?;
        }
        if let Ok(val) = config.get_string("note_tag_cap") {
            settings.note_tag_cap = val.trim().parse().map_err(|_| ApplicationError::Config {
                message: format!("FMODEL_NOTE_TAG_CAP: not a number: {val}"),
            })?;
        }
        if let Ok(val) = config.get_string("default_scope") {
            settings.default_scope = Some(val);
        }

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.note_tag_cap < MIN_TAG_CAP {
            return Err(ApplicationError::Config {
                message: format!(
                    "note_tag_cap must be at least {MIN_TAG_CAP}, got {}",
                    self.note_tag_cap
                ),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# fmodel configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/fmodel/fmodel.toml
#   Local:  ./.fmodel.toml
#   Env:    FMODEL_* environment variables (e.g. FMODEL_ROOT_POLICY=strict)

# Model store file used when --store is not given
# store_path = "~/models/ehr-s-fm.toml"

# Several parentless elements in one scope:
#   "last-wins" keeps the last one as root and warns about the others
#   "strict"    refuses to build the tree
# root_policy = "last-wins"

# Maximum number of $XX$ tags read from one note
# note_tag_cap = 5

# Scope element used when a command does not name one
# default_scope = "EHR-S FM"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
