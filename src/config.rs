//! Analysis configuration.
//!
//! Configuration is read from YAML. Every field has a default, so an empty
//! file (or no file at all) yields a usable [`Config`].
//!
//! ```yaml
//! max_file_size: 524288
//! enabled_languages: [python, typescript, go]
//! top_n: 5
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::parser::LanguageId;

/// File names searched by [`Config::discover`], in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["codeshape.yaml", ".codeshape.yaml"];

/// Default maximum size of a parsed file (1 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576;

/// Default length of the "most imported" / "most importing" lists.
pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Files larger than this many bytes are rejected before parsing.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Languages the registry will parse. Anything else is unsupported.
    #[serde(default = "default_enabled_languages")]
    pub enabled_languages: Vec<LanguageId>,
    /// Number of entries in the top-N dependency metric lists.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_enabled_languages() -> Vec<LanguageId> {
    LanguageId::ALL.to_vec()
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            enabled_languages: default_enabled_languages(),
            top_n: default_top_n(),
        }
    }
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Parse and validate a configuration from YAML text.
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        // serde_yaml rejects an empty document for a struct
        let config: Config = if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Find the configuration for a project root.
    ///
    /// Looks for `codeshape.yaml` then `.codeshape.yaml` in `root`, then
    /// `config.yaml` in the user configuration directory. Falls back to
    /// defaults when none exists.
    pub fn discover<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        for name in CONFIG_FILE_NAMES {
            let candidate = root.as_ref().join(name);
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "using project config");
                return Self::parse_file(candidate);
            }
        }
        if let Some(user) = user_config_path() {
            if user.is_file() {
                tracing::debug!(path = %user.display(), "using user config");
                return Self::parse_file(user);
            }
        }
        Ok(Self::default())
    }

    /// Check the configuration for values the registry cannot honor.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_file_size == 0 {
            bail!("max_file_size must be greater than zero");
        }
        if self.enabled_languages.contains(&LanguageId::Unknown) {
            bail!("enabled_languages cannot contain 'unknown'");
        }
        Ok(())
    }

    /// Whether the registry may parse files of this language.
    pub fn is_enabled(&self, language: LanguageId) -> bool {
        self.enabled_languages.contains(&language)
    }
}

/// Location of the per-user configuration file, if the platform has one.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "codeshape").map(|d| d.config_dir().join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_file_size, 1_048_576);
        assert_eq!(config.top_n, 10);
        assert!(config.is_enabled(LanguageId::Ruby));
        assert!(config.is_enabled(LanguageId::Tsx));
        assert!(!config.is_enabled(LanguageId::Unknown));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml("max_file_size: 2048\n").unwrap();
        assert_eq!(config.max_file_size, 2048);
        assert_eq!(config.top_n, DEFAULT_TOP_N);
        assert_eq!(config.enabled_languages.len(), LanguageId::ALL.len());
    }

    #[test]
    fn test_enabled_languages_subset() {
        let config = Config::from_yaml("enabled_languages: [python, go]\n").unwrap();
        assert!(config.is_enabled(LanguageId::Python));
        assert!(config.is_enabled(LanguageId::Go));
        assert!(!config.is_enabled(LanguageId::Rust));
    }

    #[test]
    fn test_empty_document() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_validate_rejects_zero_size() {
        let err = Config::from_yaml("max_file_size: 0\n").unwrap_err();
        assert!(err.to_string().contains("max_file_size"));
    }

    #[test]
    fn test_validate_rejects_unknown_language() {
        assert!(Config::from_yaml("enabled_languages: [unknown]\n").is_err());
        assert!(Config::from_yaml("enabled_languages: [cobol]\n").is_err());
    }

    #[test]
    fn test_discover_project_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".codeshape.yaml"), "top_n: 3\n").unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.top_n, 3);
    }

    #[test]
    fn test_discover_prefers_visible_name() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("codeshape.yaml"), "top_n: 4\n").unwrap();
        fs::write(dir.path().join(".codeshape.yaml"), "top_n: 7\n").unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.top_n, 4);
    }
}
