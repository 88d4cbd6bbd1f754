use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use super::PluginConfig;
use crate::error::ServerError;

/// Holds the active configuration snapshot.
///
/// Readers take an `Arc` and keep using it for the rest of their request.
/// A reload installs a new snapshot; requests already in flight keep the old
/// one.
#[derive(Debug)]
pub struct ConfigStore {
    path: Option<PathBuf>,
    current: RwLock<Arc<PluginConfig>>,
}

impl ConfigStore {
    /// A store that can [`reload`](Self::reload) from `path`.
    pub fn from_file(path: impl Into<PathBuf>, initial: PluginConfig) -> Self {
        Self {
            path: Some(path.into()),
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// A store with no backing file.
    pub fn fixed(config: PluginConfig) -> Self {
        Self {
            path: None,
            current: RwLock::new(Arc::new(config)),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn snapshot(&self) -> Arc<PluginConfig> {
        Arc::clone(&*self.current.read().await)
    }

    pub async fn replace(&self, config: PluginConfig) {
        *self.current.write().await = Arc::new(config);
    }

    /// Re-read the backing file and install it.
    ///
    /// On failure the previous snapshot stays active.
    pub async fn reload(&self) -> Result<Arc<PluginConfig>, ServerError> {
        let Some(path) = self.path.as_deref() else {
            return Err(ServerError::Config(
                "configuration has no backing file".into(),
            ));
        };

        let config = match PluginConfig::load(path) {
            Ok(config) => Arc::new(config),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "config reload failed, keeping previous configuration");
                return Err(e);
            }
        };

        if let Err(e) = config.validate() {
            warn!(error = %e, "reloaded configuration is not valid");
        }

        *self.current.write().await = Arc::clone(&config);
        info!(path = %path.display(), "configuration reloaded");
        Ok(config)
    }
}
