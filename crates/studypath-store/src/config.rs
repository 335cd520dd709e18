//! Configuration loading and store factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use studypath_core::parser::load_catalog;
use studypath_core::traits::RecordStore;

use crate::file::JsonFileStore;

/// Top-level studypath configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudypathConfig {
    /// Learner data file.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    /// Catalog TOML file or directory of catalogs.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    /// User id for commands that do not name one.
    #[serde(default = "default_user")]
    pub default_user: String,
    /// Words per vocabulary quiz.
    #[serde(default = "default_quiz_size")]
    pub quiz_size: usize,
    /// Points a domain may move before `compare` flags it.
    #[serde(default = "default_regression_threshold")]
    pub regression_threshold: f64,
}

fn default_data_file() -> PathBuf {
    PathBuf::from("studypath-data.json")
}
fn default_user() -> String {
    "learner".to_string()
}
fn default_quiz_size() -> usize {
    studypath_core::quiz::DEFAULT_QUIZ_SIZE
}
fn default_regression_threshold() -> f64 {
    5.0
}

impl Default for StudypathConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            catalog: None,
            default_user: default_user(),
            quiz_size: default_quiz_size(),
            regression_threshold: default_regression_threshold(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let value = std::env::var(&result[start + 2..start + end]).unwrap_or_default();
        result.replace_range(start..start + end + 1, &value);
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `studypath.toml` in the current directory
/// 2. `~/.config/studypath/config.toml`
///
/// Environment variable overrides: `STUDYPATH_DATA`, `STUDYPATH_USER`.
pub fn load_config() -> Result<StudypathConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<StudypathConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("studypath.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<StudypathConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => StudypathConfig::default(),
    };

    if let Ok(data) = std::env::var("STUDYPATH_DATA") {
        config.data_file = PathBuf::from(data);
    }
    if let Ok(user) = std::env::var("STUDYPATH_USER") {
        config.default_user = user;
    }

    config.data_file = resolve_path(&config.data_file);
    config.catalog = config.catalog.as_deref().map(resolve_path);

    if config.quiz_size == 0 {
        anyhow::bail!("quiz_size must be at least 1");
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("studypath"))
}

/// Open the record store described by the configuration.
pub async fn create_store(config: &StudypathConfig) -> Result<Arc<dyn RecordStore>> {
    let catalog_path = config
        .catalog
        .as_deref()
        .context("no catalog configured; set `catalog` in studypath.toml or pass --catalog")?;
    let catalog = load_catalog(catalog_path)?;
    tracing::info!(
        "loaded catalog {} ({} items)",
        catalog.id,
        catalog.item_count()
    );

    let store = JsonFileStore::open(catalog, &config.data_file)
        .await
        .with_context(|| format!("failed to open data file {}", config.data_file.display()))?;
    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_STUDYPATH_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_STUDYPATH_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("data/${_STUDYPATH_TEST_VAR}/progress.json"),
            "data/hello/progress.json"
        );
        assert_eq!(resolve_env_vars("${unterminated"), "${unterminated");
        std::env::remove_var("_STUDYPATH_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = StudypathConfig::default();
        assert_eq!(config.default_user, "learner");
        assert_eq!(config.quiz_size, 10);
        assert!(config.catalog.is_none());
    }

    #[test]
    fn parse_partial_config() {
        let config: StudypathConfig = toml::from_str(
            r#"
catalog = "catalogs/"
quiz_size = 5
"#,
        )
        .unwrap();
        assert_eq!(config.catalog, Some(PathBuf::from("catalogs/")));
        assert_eq!(config.quiz_size, 5);
        assert_eq!(config.data_file, PathBuf::from("studypath-data.json"));
        assert_eq!(config.regression_threshold, 5.0);
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/studypath.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_config_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studypath.toml");
        std::fs::write(&path, "default_user = \"ana\"\nquiz_size = 3\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.quiz_size, 3);
    }

    #[tokio::test]
    async fn create_store_requires_catalog() {
        let err = create_store(&StudypathConfig::default())
            .await
            .err()
            .unwrap();
        assert!(format!("{err:#}").contains("no catalog configured"));
    }
}
