pub mod check_url;
pub mod config;
pub mod events;
pub mod subscribe;
pub mod sync;
pub mod transfer;

use std::sync::Arc;

use anyhow::Result;
use dayflow_core::config::DayflowConfig;
use dayflow_core::fetch::HttpFetcher;
use dayflow_core::store::MemoryStore;
use dayflow_core::sync::Synchronizer;
use tracing::debug;

/// Everything a command needs, opened once per invocation.
pub struct App {
    pub config: DayflowConfig,
    pub store: Arc<MemoryStore>,
    pub sync: Synchronizer<MemoryStore, HttpFetcher>,
}

impl App {
    pub fn open(config: DayflowConfig) -> Result<Self> {
        let store_path = config.store_path();
        let store = Arc::new(MemoryStore::open(&store_path)?);
        debug!(path = %store_path.display(), "Opened store");
        let fetcher = HttpFetcher::from_config(&config)?;
        let sync = Synchronizer::new(store.clone(), fetcher);

        Ok(App {
            config,
            store,
            sync,
        })
    }
}
