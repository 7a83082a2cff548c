use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::ingest::tags::TagDictionary;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NongsaConfig {
    pub log_level: String,
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub ingest: IngestConfig,
    pub search: SearchConfig,
    pub tags: TagDictionary,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    pub cache_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IngestConfig {
    /// Sections embedded per backend call. Bounds peak memory.
    pub batch_size: usize,
    /// Buffered records per storage flush.
    pub insert_batch: usize,
    /// Hard cap on the embedding input, in characters.
    pub max_text_chars: usize,
    /// How far into a section body tag extraction looks, in characters.
    pub tag_window_chars: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub default_top_k: usize,
}

impl Default for NongsaConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            storage: StorageConfig::default(),
            embedding: EmbeddingConfig::default(),
            ingest: IngestConfig::default(),
            search: SearchConfig::default(),
            tags: TagDictionary::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_nongsa_dir()
            .join("advisories.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        let cache_dir = default_nongsa_dir()
            .join("models")
            .to_string_lossy()
            .into_owned();
        Self {
            provider: "local".into(),
            model: "paraphrase-multilingual-MiniLM-L12-v2".into(),
            cache_dir,
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: 8,
            insert_batch: 50,
            max_text_chars: 1536,
            tag_window_chars: 1000,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { default_top_k: 5 }
    }
}

/// Returns `~/.nongsa/`
pub fn default_nongsa_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".nongsa")
}

/// Returns the default config file path: `~/.nongsa/config.toml`
pub fn default_config_path() -> PathBuf {
    default_nongsa_dir().join("config.toml")
}

impl NongsaConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            NongsaConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (NONGSA_DB, NONGSA_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("NONGSA_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("NONGSA_LOG_LEVEL") {
            self.log_level = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = NongsaConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.ingest.insert_batch, 50);
        assert_eq!(config.ingest.max_text_chars, 1536);
        assert_eq!(config.search.default_top_k, 5);
        assert!(config.storage.db_path.ends_with("advisories.db"));
        assert!(!config.tags.crop.is_empty());
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
log_level = "debug"

[storage]
db_path = "/tmp/test.db"

[ingest]
batch_size = 2

[tags]
crop = ["벼", "감자"]
"#;
        let config: NongsaConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.storage.db_path, "/tmp/test.db");
        assert_eq!(config.ingest.batch_size, 2);
        assert_eq!(config.tags.crop, vec!["벼", "감자"]);
        // defaults still apply for unset fields
        assert_eq!(config.ingest.insert_batch, 50);
        assert!(!config.tags.pest.is_empty());
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = NongsaConfig::default();
        std::env::set_var("NONGSA_DB", "/tmp/override.db");
        std::env::set_var("NONGSA_LOG_LEVEL", "trace");

        config.apply_env_overrides();

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.log_level, "trace");

        // Clean up
        std::env::remove_var("NONGSA_DB");
        std::env::remove_var("NONGSA_LOG_LEVEL");
    }
}
