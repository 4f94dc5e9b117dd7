use autoreply_core::{CoreError, TokenSource, TokenStoreConfig};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read-only view of a JSON key-value file shared with the rest of the app.
///
/// The file is a flat JSON object. A missing file or key means no token.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
    key: String,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    pub fn from_config(config: &TokenStoreConfig) -> Self {
        Self::new(config.path.clone(), config.key.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self, key: &str) -> Result<Option<String>, CoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Token storage {} does not exist", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Ok(None);
        }

        let entries: Map<String, Value> = serde_json::from_str(&contents)?;
        Ok(entries
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string))
    }
}

impl TokenSource for FileTokenStore {
    fn access_token(&self) -> Result<Option<String>, CoreError> {
        self.read(&self.key)
    }
}
