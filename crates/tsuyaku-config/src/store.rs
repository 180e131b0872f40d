use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Config;

/// Read-only view of the persisted configuration.
///
/// Every call returns the currently stored values; nothing is cached, so an
/// edit is picked up by the next request (last write wins).
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn load(&self) -> Config;
}

/// In-process store shared with whatever edits the configuration
#[derive(Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<Config>>,
}

impl SharedConfig {
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    pub async fn update(&self, edit: impl FnOnce(&mut Config)) {
        let mut config = self.inner.write().await;
        edit(&mut config);
    }
}

#[async_trait]
impl ConfigStore for SharedConfig {
    async fn load(&self) -> Config {
        self.inner.read().await.clone()
    }
}

/// JSON file re-read on every load
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ConfigStore for JsonConfigStore {
    async fn load(&self) -> Config {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Config {} unreadable ({e}), using defaults", self.path.display());
                return Config::default();
            }
        };

        serde_json::from_str(&data).unwrap_or_else(|e| {
            tracing::warn!("Config {} is not valid JSON ({e}), using defaults", self.path.display());
            Config::default()
        })
    }
}
