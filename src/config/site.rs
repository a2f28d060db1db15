//! Site configuration (config.yaml)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{Result, SiteError};

/// Name of the configuration file in the site root
pub const CONFIG_FILE: &str = "config.yaml";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,

    // URL
    pub base_url: String,

    // Directory
    pub source_dir: String,
    pub template_dir: String,
    pub public_dir: String,
    #[serde(default)]
    pub ignore: Vec<String>,

    // Rendering
    pub default_template: String,
    pub index_drafts: bool,
    pub highlight_theme: String,

    #[serde(default)]
    pub serve: ServeConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),

            base_url: "/".to_string(),

            source_dir: "content".to_string(),
            template_dir: "templates".to_string(),
            public_dir: "public".to_string(),
            ignore: Vec::new(),

            default_template: "default".to_string(),
            index_drafts: false,
            highlight_theme: "base16-ocean.dark".to_string(),

            serve: ServeConfig::default(),
            extra: BTreeMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| SiteError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Parse configuration text; an empty file yields the defaults
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Whether links are emitted relative to each page rather than from a fixed root
    pub fn is_relative_base(&self) -> bool {
        !(self.base_url.starts_with('/') || self.base_url.contains("://"))
    }
}

/// Dev server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.base_url, "/");
        assert_eq!(config.public_dir, "public");
        assert_eq!(config.serve.port, 3000);
        assert!(!config.index_drafts);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
base-url: ./
index-drafts: true
serve:
  port: 8080
github: someone
"#;
        let config = SiteConfig::parse(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.base_url, "./");
        assert!(config.index_drafts);
        assert_eq!(config.serve.port, 8080);
        assert_eq!(config.serve.host, "localhost");
        assert_eq!(
            config.extra.get("github").and_then(|v| v.as_str()),
            Some("someone")
        );
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = SiteConfig::parse("\n").unwrap();
        assert_eq!(config.source_dir, "content");
    }

    #[test]
    fn test_relative_base() {
        let mut config = SiteConfig::default();
        assert!(!config.is_relative_base());
        config.base_url = "https://example.com/blog/".to_string();
        assert!(!config.is_relative_base());
        config.base_url = ".".to_string();
        assert!(config.is_relative_base());
    }

    #[test]
    fn test_malformed_config_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "serve: [1, 2").unwrap();
        let err = SiteConfig::load(&path).unwrap_err();
        assert!(matches!(err, SiteError::Config { .. }));
    }
}
