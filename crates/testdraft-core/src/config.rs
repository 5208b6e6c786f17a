//! testdraft configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::difficulty::enforce_locked_difficulty;
use crate::model::{DifficultyDistribution, LockedTiers};
use crate::payload::DEFAULT_TITLE;

/// Top-level testdraft configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestDraftConfig {
    /// Total used when a draft does not set one.
    #[serde(default = "default_total_questions")]
    pub default_total_questions: u64,
    /// Title used when a draft does not set one.
    #[serde(default = "default_title")]
    pub default_title: String,
    /// Difficulty split given to newly selected entries.
    #[serde(default)]
    pub default_difficulty: DifficultyDistribution,
    /// Output directory for draft reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_total_questions() -> u64 {
    20
}
fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./testdraft-output")
}

impl Default for TestDraftConfig {
    fn default() -> Self {
        Self {
            default_total_questions: default_total_questions(),
            default_title: default_title(),
            default_difficulty: DifficultyDistribution::default(),
            output_dir: default_output_dir(),
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `testdraft.toml` in the current directory
/// 2. `~/.config/testdraft/config.toml`
///
/// Environment variable override: `TESTDRAFT_OUTPUT_DIR`.
pub fn load_config() -> Result<TestDraftConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<TestDraftConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("testdraft.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => TestDraftConfig::default(),
    };

    if let Ok(dir) = std::env::var("TESTDRAFT_OUTPUT_DIR") {
        if !dir.is_empty() {
            config.output_dir = PathBuf::from(dir);
        }
    }

    Ok(config)
}

/// Parse a config from TOML text, normalizing the default difficulty.
pub fn parse_config_str(content: &str) -> Result<TestDraftConfig> {
    let mut config: TestDraftConfig = toml::from_str(content)?;
    config.default_difficulty =
        enforce_locked_difficulty(&config.default_difficulty, &LockedTiers::new());
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("testdraft"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = TestDraftConfig::default();
        assert_eq!(config.default_total_questions, 20);
        assert_eq!(config.default_title, "Untitled test");
        assert_eq!(config.default_difficulty, DifficultyDistribution::new(34, 33, 33));
        assert_eq!(config.output_dir, PathBuf::from("./testdraft-output"));
    }

    #[test]
    fn parse_partial_config() {
        let config = parse_config_str("default_total_questions = 40\n").unwrap();
        assert_eq!(config.default_total_questions, 40);
        assert_eq!(config.default_title, "Untitled test");
        assert_eq!(config.default_difficulty.total(), 100);
    }

    #[test]
    fn difficulty_is_normalized() {
        let toml_str = r#"
[default_difficulty]
easy = 1
medium = 1
hard = 2
"#;
        let config = parse_config_str(toml_str).unwrap();
        assert_eq!(config.default_difficulty, DifficultyDistribution::new(25, 25, 50));
    }

    #[test]
    fn explicit_path_must_exist() {
        let err = load_config_from(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("testdraft.toml");
        std::fs::write(&path, "default_title = \"Weekly quiz\"\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.default_title, "Weekly quiz");
        assert_eq!(config.default_total_questions, 20);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "default_total_questions = \"many\"").unwrap();

        let err = load_config_from(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config"));
    }
}
