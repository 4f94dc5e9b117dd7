use crate::error::{ConfigError, CoreError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_GRAPH_API_BASE: &str = "https://graph.facebook.com/v18.0";
pub const DEFAULT_TOKEN_KEY: &str = "instagram_access_token";
pub const DEFAULT_TABLE: &str = "autoresponders";

const ENV_GRAPH_API_BASE: &str = "AUTOREPLY_GRAPH_API_BASE";
const ENV_DATABASE_URL: &str = "AUTOREPLY_DATABASE_URL";
const ENV_REST_API_KEY: &str = "AUTOREPLY_REST_API_KEY";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub graph: GraphConfig,
    pub token_store: TokenStoreConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub api_base: String,
    pub timeout_secs: u64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_GRAPH_API_BASE.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenStoreConfig {
    pub path: PathBuf,
    pub key: String,
}

impl Default for TokenStoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("local_storage.json"),
            key: DEFAULT_TOKEN_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    Sqlite {
        #[serde(default = "default_database_url")]
        database_url: String,
    },
    Rest {
        #[serde(default)]
        base_url: String,
        #[serde(default)]
        api_key: String,
        #[serde(default = "default_table")]
        table: String,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Sqlite {
            database_url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://autoreply.db".to_string()
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

impl AppConfig {
    /// Loads the config file at `path`, falling back to defaults when it does
    /// not exist. Environment overrides are applied before validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            info!("Loading configuration from {}", path.display());
            let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
                std::io::ErrorKind::PermissionDenied => ConfigError::PermissionDenied {
                    path: path.display().to_string(),
                },
                _ => ConfigError::InvalidFormat {
                    details: e.to_string(),
                },
            })?;
            Self::from_toml_str(&contents)?
        } else {
            debug!("No configuration at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(api_base) = lookup(ENV_GRAPH_API_BASE) {
            self.graph.api_base = api_base;
        }
        match &mut self.store {
            StoreConfig::Sqlite { database_url } => {
                if let Some(url) = lookup(ENV_DATABASE_URL) {
                    *database_url = url;
                }
            }
            StoreConfig::Rest { api_key, .. } => {
                if let Some(key) = lookup(ENV_REST_API_KEY) {
                    *api_key = key;
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_url("graph.api_base", &self.graph.api_base)?;
        if self.graph.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "graph.timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }
        if self.token_store.key.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "token_store.key".to_string(),
            });
        }

        match &self.store {
            StoreConfig::Sqlite { database_url } => {
                if !database_url.starts_with("sqlite:") {
                    return Err(ConfigError::InvalidValue {
                        field: "store.database_url".to_string(),
                        value: database_url.clone(),
                    });
                }
            }
            StoreConfig::Rest {
                base_url,
                api_key,
                table,
            } => {
                if base_url.is_empty() {
                    return Err(ConfigError::MissingField {
                        field: "store.base_url".to_string(),
                    });
                }
                require_url("store.base_url", base_url)?;
                if api_key.is_empty() {
                    return Err(ConfigError::MissingField {
                        field: "store.api_key".to_string(),
                    });
                }
                if table.trim().is_empty() {
                    return Err(ConfigError::MissingField {
                        field: "store.table".to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn require_url(field: &str, value: &str) -> Result<(), ConfigError> {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.graph.api_base, DEFAULT_GRAPH_API_BASE);
        assert_eq!(config.token_store.key, DEFAULT_TOKEN_KEY);
    }

    #[test]
    fn test_parse_rest_backend() {
        let config = AppConfig::from_toml_str(
            r#"
            [store]
            backend = "rest"
            base_url = "https://project.example.co"
            api_key = "anon"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.store,
            StoreConfig::Rest {
                base_url: "https://project.example.co".to_string(),
                api_key: "anon".to_string(),
                table: DEFAULT_TABLE.to_string(),
            }
        );
        assert_eq!(config.graph, GraphConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rest_backend_requires_key() {
        let config = AppConfig::from_toml_str(
            r#"
            [store]
            backend = "rest"
            base_url = "https://project.example.co"
            "#,
        )
        .unwrap();

        match config.validate() {
            Err(ConfigError::MissingField { field }) => assert_eq!(field, "store.api_key"),
            other => panic!("Expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_graph_url_rejected() {
        let mut config = AppConfig::default();
        config.graph.api_base = "not a url".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|name| match name {
            ENV_GRAPH_API_BASE => Some("http://localhost:9000".to_string()),
            ENV_DATABASE_URL => Some("sqlite::memory:".to_string()),
            _ => None,
        });

        assert_eq!(config.graph.api_base, "http://localhost:9000");
        assert_eq!(
            config.store,
            StoreConfig::Sqlite {
                database_url: "sqlite::memory:".to_string()
            }
        );
    }

    #[test]
    fn test_malformed_toml() {
        let result = AppConfig::from_toml_str("[graph\napi_base = 1");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.token_store, TokenStoreConfig::default());
    }
}
