//! Gallery configuration

use crate::selection::SelectionPolicy;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Preview service used when no `thumbnail_base` is configured
pub const DEFAULT_THUMBNAIL_BASE: &str = "https://api.dicebear.com/7.x/shapes/svg?seed=";

/// Main gallery configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub general: GeneralConfig,
    pub behavior: BehaviorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Label of the root breadcrumb
    pub root_label: String,
    /// Author recorded on newly created items
    pub default_author: String,
    /// Prefix for generated presentation previews; the encoded name is appended
    pub thumbnail_base: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            root_label: "All presentations".to_string(),
            default_author: "Current user".to_string(),
            thumbnail_base: DEFAULT_THUMBNAIL_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    pub delete_policy: DeletePolicy,
    pub selection_after_mutation: SelectionPolicy,
    /// Ask before deleting
    pub confirm_delete: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            delete_policy: DeletePolicy::Forbid,
            selection_after_mutation: SelectionPolicy::ClearAll,
            confirm_delete: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Fallback filter when `RUST_LOG` is unset
    pub level: String,
    /// Days to keep rolled log files
    pub retention_days: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            retention_days: 7,
        }
    }
}

/// How deleting a folder that still has children is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeletePolicy {
    /// Reject unless every child is deleted in the same batch
    #[default]
    #[serde(rename = "forbid")]
    Forbid,
    /// Children that survive the delete move to root
    #[serde(rename = "orphan_to_root")]
    OrphanToRoot,
}

impl GalleryConfig {
    /// Load configuration from the default location
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::info!("Configuration loaded from {:?}", config_path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;

        tracing::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "iSlides", "iSlides")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: GalleryConfig = toml::from_str(
            r#"
            [behavior]
            delete_policy = "orphan_to_root"
            "#,
        )
        .unwrap();

        assert_eq!(config.behavior.delete_policy, DeletePolicy::OrphanToRoot);
        assert_eq!(config.behavior.selection_after_mutation, SelectionPolicy::ClearAll);
        assert!(config.behavior.confirm_delete);
        assert_eq!(config.general.root_label, "All presentations");
        assert_eq!(config.logging.retention_days, 7);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = GalleryConfig::default();
        config.general.root_label = "Decks".to_string();
        config.behavior.selection_after_mutation = SelectionPolicy::PruneAffected;
        config.save_to(&path).unwrap();

        let loaded = GalleryConfig::load_from(&path).unwrap();
        assert_eq!(loaded.general.root_label, "Decks");
        assert_eq!(
            loaded.behavior.selection_after_mutation,
            SelectionPolicy::PruneAffected
        );
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = GalleryConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.behavior.delete_policy, DeletePolicy::Forbid);
    }
}
