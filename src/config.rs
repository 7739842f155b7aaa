//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/phosys/phosys.toml` (or an explicit file)
//! 3. Local config: `<dir>/.phosys.toml` next to the documents
//! 4. Environment variables: `PHOSYS__*` prefix (`PHOSYS__PARSER__CLOSING=nested`)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{ClosingMode, ParseOptions};

/// Parser behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ParserConfig {
    /// Required name of the top-level wrapper block (any name when unset)
    pub root_name: Option<String>,
    /// How start markers find their end markers
    pub closing: ClosingMode,
}

/// CLI output behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// Print structural diagnostics after `parse` and `get`
    pub show_diagnostics: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            show_diagnostics: true,
        }
    }
}

/// Raw parser config for intermediate parsing (Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawParserConfig {
    pub root_name: Option<String>,
    pub closing: Option<ClosingMode>,
}

/// Raw output config for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawOutputConfig {
    pub show_diagnostics: Option<bool>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub parser: RawParserConfig,
    pub output: RawOutputConfig,
}

/// Unified configuration for phosys.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub parser: ParserConfig,
    pub output: OutputConfig,
}

/// Get the XDG config directory for phosys.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "phosys").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("phosys.toml"))
}

/// Get the path to the local config file in a document directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".phosys.toml")
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
    /// Parser options for the tree builder.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            root_name: self.parser.root_name.clone(),
            closing: self.parser.closing,
        }
    }

    /// Overlay wins where it specifies a value, otherwise keep self.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            parser: ParserConfig {
                root_name: overlay
                    .parser
                    .root_name
                    .clone()
                    .or_else(|| self.parser.root_name.clone()),
                closing: overlay.parser.closing.unwrap_or(self.parser.closing),
            },
            output: OutputConfig {
                show_diagnostics: overlay
                    .output
                    .show_diagnostics
                    .unwrap_or(self.output.show_diagnostics),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Explicit config file, replaces the global config file
    /// * `local_dir` - Optional directory holding a `.phosys.toml`
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. `config_file`, else global config `$XDG_CONFIG_HOME/phosys/phosys.toml`
    /// 3. Local config: `<local_dir>/.phosys.toml`
    /// 4. Environment variables: `PHOSYS__*`
    pub fn load(config_file: Option<&Path>, local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        match config_file {
            Some(path) => {
                if !path.is_file() {
                    return Err(ApplicationError::Config {
                        message: format!("config file not found: {}", path.display()),
                    });
                }
                current = current.merge_with(&load_raw_settings(path)?);
            }
            None => {
                if let Some(global_path) = global_config_path() {
                    if global_path.exists() {
                        current = current.merge_with(&load_raw_settings(&global_path)?);
                    }
                }
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        Self::apply_env_overrides(current)
    }

    /// Apply PHOSYS__* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let builder = Config::builder().add_source(
            Environment::with_prefix("PHOSYS")
                .prefix_separator("__")
                .separator("__"),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("parser.root_name") {
            settings.parser.root_name = Some(val).filter(|name| !name.is_empty());
        }
        if let Ok(val) = config.get_string("parser.closing") {
            settings.parser.closing = parse_closing(&val)?;
        }
        if let Ok(val) = config.get_bool("output.show_diagnostics") {
            settings.output.show_diagnostics = val;
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
        r#"# phosys configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/phosys/phosys.toml  (or --config <file>)
#   Local:  <document dir>/.phosys.toml
#   Env:    PHOSYS__* environment variables, e.g. PHOSYS__PARSER__CLOSING=nested

[parser]
# Required name of the top-level wrapper block; any name is accepted when unset
# root_name = "PHOSYS"

# How a start marker finds its end marker:
#   "first-match": first downstream end marker with the same name (legacy behaviour)
#   "nested":      same-named blocks nest, start/end markers are counted
# closing = "first-match"

[output]
# Print structural diagnostics after parse/get
# show_diagnostics = true
"#
        .to_string()
    }
}

fn parse_closing(value: &str) -> Result<ClosingMode, ApplicationError> {
    match value {
        "first-match" => Ok(ClosingMode::FirstMatch),
        "nested" => Ok(ClosingMode::Nested),
        other => Err(ApplicationError::Config {
            message: format!("unknown closing mode {other:?} (expected first-match or nested)"),
        }),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
