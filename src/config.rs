use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Bundled defaults, checked by `build.rs`.
const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Largest number of blocks the content API accepts in one call.
pub const MAX_CHUNK_SIZE: usize = 100;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub notion: NotionConfig,
    pub publish: PublishConfig,
    pub parse: ParseConfig,
    /// Default tracing filter; `RUST_LOG` takes precedence.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notion: NotionConfig::default(),
            publish: PublishConfig::default(),
            parse: ParseConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotionConfig {
    pub api_base: String,
    pub version: String,
    pub parent_page_id: Option<String>,
    pub token_env: String,
    pub token_file: Option<PathBuf>,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.notion.com/v1".to_string(),
            version: "2022-06-28".to_string(),
            parent_page_id: None,
            token_env: "NOTION_API_KEY".to_string(),
            token_file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PublishConfig {
    pub chunk_size: usize,
    pub default_icon: Option<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            chunk_size: MAX_CHUNK_SIZE,
            default_icon: None,
        }
    }
}

impl PublishConfig {
    /// Configured chunk size, clamped to what the API accepts.
    pub fn effective_chunk_size(&self) -> usize {
        self.chunk_size.clamp(1, MAX_CHUNK_SIZE)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParseConfig {
    pub strip_frontmatter: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            strip_frontmatter: true,
        }
    }
}

impl Config {
    /// The bundled default configuration.
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Load config from a TOML file, or return defaults if not found.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::compiled_default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Parent page for new pages: the override if given, else the configured one.
    pub fn parent_page_id<'a>(
        &'a self,
        cli_override: Option<&'a str>,
    ) -> Result<&'a str, ConfigError> {
        cli_override
            .or(self.notion.parent_page_id.as_deref())
            .filter(|id| !id.trim().is_empty())
            .ok_or(ConfigError::MissingParent)
    }

    /// Resolve the API token from the process environment or the token file.
    pub fn resolve_token(&self) -> Result<String, ConfigError> {
        self.resolve_token_with(|name| std::env::var(name).ok())
    }

    /// Resolve the API token using `lookup` for environment variables.
    pub fn resolve_token_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<String, ConfigError> {
        let from_env = lookup(&self.notion.token_env)
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());
        if let Some(token) = from_env {
            return Ok(token);
        }

        if let Some(path) = &self.notion.token_file {
            let token = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            let token = token.trim();
            if !token.is_empty() {
                return Ok(token.to_string());
            }
        }

        Err(ConfigError::MissingToken {
            env_var: self.notion.token_env.clone(),
        })
    }
}
