use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use kanal::{AsyncReceiver, AsyncSender};
use tokio::sync::RwLock;
use tsuyaku_types::{DispatcherMessage, TabId};

/// Tab-addressed, one-way, at-most-once delivery. There is no error channel
/// back to the sender: failures are logged and the message is dropped.
#[async_trait]
pub trait TabSink: Send + Sync {
    async fn send_to_tab(&self, tab: TabId, message: DispatcherMessage);
}

/// In-process bus: one kanal channel per registered tab
#[derive(Clone, Default)]
pub struct TabRouter {
    tabs: Arc<RwLock<HashMap<TabId, AsyncSender<DispatcherMessage>>>>,
}

impl TabRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a tab's inbox. Re-registering replaces (and closes) the old one.
    pub async fn register(&self, tab: TabId) -> AsyncReceiver<DispatcherMessage> {
        let (tx, rx) = kanal::bounded_async(64);
        if let Some(old) = self.tabs.write().await.insert(tab, tx) {
            let _ = old.close();
            tracing::debug!("{tab} re-registered, previous inbox closed");
        }
        rx
    }

    pub async fn unregister(&self, tab: TabId) {
        if let Some(tx) = self.tabs.write().await.remove(&tab) {
            let _ = tx.close();
        }
    }
}

#[async_trait]
impl TabSink for TabRouter {
    async fn send_to_tab(&self, tab: TabId, message: DispatcherMessage) {
        let tx = self.tabs.read().await.get(&tab).cloned();
        let Some(tx) = tx else {
            tracing::debug!("No listener for {tab}, dropping message {}", message.id());
            return;
        };

        if let Err(e) = tx.send(message).await {
            tracing::warn!("Failed to deliver to {tab}: {e}");
        }
    }
}
