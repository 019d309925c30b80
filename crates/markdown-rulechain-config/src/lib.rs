use markdown_rulechain_engine::{Markdown, OptionsUpdate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Engine(#[from] markdown_rulechain_engine::Error),
}

/// Renderer setup read from `config.toml`.
///
/// ```toml
/// preset = "commonmark"
/// enable = ["table", "strikethrough"]
///
/// [options]
/// typographer = true
/// quotes = "«»‹›"
/// ```
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    pub options: OptionsUpdate,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enable: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub disable: Vec<String>,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        log::debug!("loaded config from {}", config_path.display());
        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/markdown-rulechain");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Builds a renderer: preset first, then option overrides, then the
    /// `enable` and `disable` lists in that order.
    pub fn build(&self) -> Result<Markdown, ConfigError> {
        let mut md = match &self.preset {
            Some(name) => Markdown::with_preset(name)?,
            None => Markdown::new(),
        };
        md.set(&self.options);
        if !self.enable.is_empty() {
            md.enable(&self.enable, false)?;
        }
        if !self.disable.is_empty() {
            md.disable(&self.disable, false)?;
        }
        Ok(md)
    }
}
