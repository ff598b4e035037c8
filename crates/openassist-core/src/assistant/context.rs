use crate::assistant::AssistantConfig;
use crate::cache::AdditionalDataCache;
use crate::tool::ToolRegistry;
use openassist_protocol::Event;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};

/// Per-run view handed to hooks and the tool processor.
#[derive(Clone)]
pub struct Context {
    config: AssistantConfig,
    registry: Arc<ToolRegistry>,
    cache: Arc<RwLock<AdditionalDataCache>>,
    tx: Option<mpsc::Sender<Event>>,
}

impl Context {
    pub fn new(
        config: AssistantConfig,
        registry: Arc<ToolRegistry>,
        cache: Arc<RwLock<AdditionalDataCache>>,
        tx: Option<mpsc::Sender<Event>>,
    ) -> Self {
        Self {
            config,
            registry,
            cache,
            tx,
        }
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// The session's additional-data cache. Locked briefly per access; the
    /// session stays readable while a run is in flight.
    pub fn cache(&self) -> &Arc<RwLock<AdditionalDataCache>> {
        &self.cache
    }

    pub fn tx(&self) -> Option<&mpsc::Sender<Event>> {
        self.tx.as_ref()
    }

    /// Send an event if a subscriber is attached.
    pub async fn send_event(&self, event: Event) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event).await;
        }
    }
}
