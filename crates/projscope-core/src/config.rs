//! Project configuration.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{ProjectError, ProjectResult};

/// Name of the directory used under the platform config and data dirs.
pub const APP_DIR: &str = "projscope";

/// File name of the tracked-file inventory.
pub const STORE_FILE: &str = "tracked_files.jsonl";

/// Startup configuration, read once and handed to the root manager and store.
#[derive(Debug, Clone, Default, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ProjectConfig {
    /// Override for the default project root (else the working directory).
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub project_root: Option<PathBuf>,

    /// Location of the tracked-file inventory (else the platform data dir).
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub store_path: Option<PathBuf>,
}

impl ProjectConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(Some(root)) = &self.project_root {
            if root.as_os_str().is_empty() {
                return Err("Project root cannot be empty".to_string());
            }
        }
        if let Some(Some(store)) = &self.store_path {
            if store.as_os_str().is_empty() {
                return Err("Store path cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

impl ProjectConfig {
    /// Create a new config builder.
    pub fn builder() -> ProjectConfigBuilder {
        ProjectConfigBuilder::default()
    }

    /// Default location of the config file, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    /// Parse a config from TOML text.
    pub fn from_toml(text: &str) -> ProjectResult<Self> {
        toml::from_str(text).map_err(|e| ProjectError::InvalidConfig {
            message: e.to_string(),
        })
    }

    /// Load a config file.
    pub fn load(path: &Path) -> ProjectResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ProjectError::io(path, e))?;
        Self::from_toml(&text)
    }

    /// Load the default config file, falling back to defaults when it is absent.
    pub fn load_default() -> ProjectResult<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Overlay explicitly supplied values on top of this config.
    pub fn merge(mut self, project_root: Option<PathBuf>, store_path: Option<PathBuf>) -> Self {
        if project_root.is_some() {
            self.project_root = project_root;
        }
        if store_path.is_some() {
            self.store_path = store_path;
        }
        self
    }

    /// The default root: the configured override or the process working directory.
    pub fn default_root(&self) -> ProjectResult<PathBuf> {
        match &self.project_root {
            Some(root) => Ok(root.clone()),
            None => std::env::current_dir().map_err(|e| ProjectError::io(".", e)),
        }
    }

    /// Where the tracked-file inventory lives.
    pub fn store_location(&self) -> PathBuf {
        self.store_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
                .join(STORE_FILE)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ProjectConfig::builder()
            .project_root("/home/user/project")
            .store_path("/tmp/inventory.json")
            .build()
            .unwrap();

        assert_eq!(config.project_root, Some(PathBuf::from("/home/user/project")));
        assert_eq!(config.store_location(), PathBuf::from("/tmp/inventory.json"));
    }

    #[test]
    fn test_builder_rejects_empty_root() {
        let result = ProjectConfig::builder().project_root("").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_default_root_falls_back_to_cwd() {
        let config = ProjectConfig::default();
        let root = config.default_root().unwrap();
        assert_eq!(root, std::env::current_dir().unwrap());
    }

    #[test]
    fn test_from_toml() {
        let config = ProjectConfig::from_toml(
            r#"
            project_root = "/srv/app"
            "#,
        )
        .unwrap();
        assert_eq!(config.project_root, Some(PathBuf::from("/srv/app")));
        assert!(config.store_path.is_none());
    }

    #[test]
    fn test_from_toml_invalid() {
        let err = ProjectConfig::from_toml("project_root = 42").unwrap_err();
        assert!(matches!(err, ProjectError::InvalidConfig { .. }));
    }

    #[test]
    fn test_merge_prefers_explicit_values() {
        let config = ProjectConfig::builder()
            .project_root("/from/file")
            .build()
            .unwrap()
            .merge(Some(PathBuf::from("/from/flag")), None);
        assert_eq!(config.project_root, Some(PathBuf::from("/from/flag")));
        assert!(config.store_path.is_none());
    }
}
