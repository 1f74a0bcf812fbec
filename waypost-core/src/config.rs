//! Configuration parsing and management.

use crate::date::parse_offset;
use crate::extract::RenderContext;
use crate::markdown::{CdnConfig, NofollowExceptions, TransformConfig, DEFAULT_EXCERPT_LENGTH};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid timezone '{0}': expected a fixed offset such as +09:00 or UTC")]
    InvalidTimezone(String),

    #[error("CDN is enabled but base_url is empty")]
    MissingCdnBaseUrl,
}

/// Main configuration struct matching the waypost.yml schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub paths: PathsConfig,

    /// Treat every content error as fatal
    #[serde(default)]
    pub strict: bool,

    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_excerpt_length")]
    pub excerpt_length: usize,

    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default)]
    pub nofollow_exceptions: Vec<String>,

    #[serde(default)]
    pub cdn: Option<CdnConfig>,

    /// Regexes matched against paths relative to the content directory
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

fn default_timezone() -> String {
    String::from("+00:00")
}

fn default_excerpt_length() -> usize {
    DEFAULT_EXCERPT_LENGTH
}

fn default_page_size() -> usize {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub content: PathBuf,

    #[serde(default)]
    pub tag_descriptions: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&contents)?;

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Parse configuration text; relative paths stay relative to the
    /// working directory.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.render_context()?;
        Ok(config)
    }

    /// Get the content directory, resolved relative to config file
    pub fn content_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.content)
    }

    /// Get the tag descriptions file, resolved relative to config file
    pub fn tag_descriptions_path(&self) -> Option<PathBuf> {
        self.paths
            .tag_descriptions
            .as_ref()
            .map(|p| self.resolve_path(p))
    }

    /// Build the immutable per-run rendering settings
    pub fn render_context(&self) -> Result<RenderContext, ConfigError> {
        let timezone = parse_offset(&self.timezone)
            .ok_or_else(|| ConfigError::InvalidTimezone(self.timezone.clone()))?;

        if let Some(cdn) = &self.cdn {
            if cdn.enabled && cdn.base_url.trim().is_empty() {
                return Err(ConfigError::MissingCdnBaseUrl);
            }
        }

        Ok(RenderContext {
            transform: TransformConfig {
                cdn: self.cdn.clone(),
                nofollow_exceptions: NofollowExceptions::new(&self.nofollow_exceptions),
            },
            timezone,
            excerpt_length: self.excerpt_length,
        })
    }

    /// Resolve a path relative to the config file location
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(parent) = self.config_path.as_ref().and_then(|p| p.parent()) {
            parent.join(path)
        } else {
            path.to_path_buf()
        }
    }
}
