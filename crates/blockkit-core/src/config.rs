/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! `blockkit.toml` configuration.
//!
//! ```toml
//! [render]
//! strict = false
//! max_iterations = 10000
//!
//! [registry]
//! path = "blocks.yaml"
//! ```
//!
//! Every key is optional.

use blockkit_template::{DEFAULT_MAX_ITERATIONS, RenderOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory when no path is given.
pub const CONFIG_FILE_NAME: &str = "blockkit.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlockKitConfig {
    pub render: RenderConfig,
    pub registry: RegistryConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub strict: bool,
    pub max_iterations: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            strict: false,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Registry file, relative to the config file.
    pub path: Option<PathBuf>,
}

impl BlockKitConfig {
    pub fn from_toml_str(source: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Read a config file. A relative registry path is resolved against
    /// the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_toml_str(&source, path)?;

        if let Some(registry) = config.registry.path.take() {
            config.registry.path = Some(match path.parent() {
                Some(dir) if registry.is_relative() => dir.join(registry),
                _ => registry,
            });
        }

        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load `path` if given, else `blockkit.toml` in `dir` if it exists,
    /// else defaults.
    pub fn discover(path: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let candidate = dir.join(CONFIG_FILE_NAME);
                if candidate.is_file() {
                    Self::load(&candidate)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            strict_mode: self.render.strict,
            max_iterations: self.render.max_iterations,
        }
    }
}
