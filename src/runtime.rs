//! Request lifecycle runtime
//!
//! Drives the pure state machine, persists the slots it touches, and runs
//! one network exchange at a time.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::{ChatWidget, ExchangeOutcome, PendingExchange, Resolution};

use crate::client::{AgentClient, HttpAgentClient, LoggingClient};
use crate::config::WidgetConfig;
use crate::store::{KeyValueStore, MemoryStore, SqliteStore};
use std::sync::Arc;

/// Storage chosen from configuration
pub type DynStore = Arc<dyn KeyValueStore>;

/// Type alias for production widget with concrete implementations
pub type ProductionWidget = ChatWidget<dyn AgentClient, DynStore>;

/// Opens the configured store. Falls back to memory when the file cannot be opened.
pub fn open_store(config: &WidgetConfig) -> DynStore {
    match &config.store_path {
        Some(path) => match SqliteStore::open(path) {
            Ok(store) => {
                tracing::info!(path = %path.display(), "Using SQLite store");
                Arc::new(store)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Falling back to memory store");
                Arc::new(MemoryStore::new())
            }
        },
        None => Arc::new(MemoryStore::new()),
    }
}

/// Builds the widget with the HTTP client and configured store
pub fn build_widget(config: &WidgetConfig) -> Result<ProductionWidget, crate::client::ClientError> {
    let http = HttpAgentClient::new(config.timeout)?;
    let client: Arc<dyn AgentClient> = Arc::new(LoggingClient::new(http));
    Ok(ChatWidget::new(config, client, open_store(config)))
}
