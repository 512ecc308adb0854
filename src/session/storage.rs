//! Durable storage for the session token.
//!
//! The token is the only piece of client state that survives a restart.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::RwLock;

#[derive(Debug, thiserror::Error)]
#[error("token storage at {path}: {source}")]
pub struct StorageError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// Stored token, `None` when nothing is persisted
    async fn load(&self) -> Result<Option<String>, StorageError>;

    async fn store(&self, token: &str) -> Result<(), StorageError>;

    /// Remove the stored token. Succeeds when nothing was stored.
    async fn clear(&self) -> Result<(), StorageError>;
}

/// Token kept in a single file under the data directory
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub const FILE_NAME: &'static str = "auth-token";

    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: data_dir.into().join(Self::FILE_NAME),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn err(&self, source: std::io::Error) -> StorageError {
        StorageError {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl TokenStorage for FileTokenStorage {
    async fn load(&self) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.err(e)),
        }
    }

    async fn store(&self, token: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.err(e))?;
        }
        tokio::fs::write(&self.path, token)
            .await
            .map_err(|e| self.err(e))
    }

    async fn clear(&self) -> Result<(), StorageError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.err(e)),
        }
    }
}

/// Process-local storage, for tests and embedding without a data directory
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

#[async_trait]
impl TokenStorage for MemoryTokenStorage {
    async fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.token.read().await.clone())
    }

    async fn store(&self, token: &str) -> Result<(), StorageError> {
        *self.token.write().await = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        *self.token.write().await = None;
        Ok(())
    }
}
