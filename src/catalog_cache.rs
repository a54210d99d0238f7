//! Fetch-once catalog cache with single-flight load deduplication.

use std::sync::{Arc, Mutex};

use log::{debug, warn};
use tokio::sync::broadcast;

use crate::backends::CatalogBackend;
use crate::protocol::CatalogItem;

/// Memoized outcome of the one catalog load performed per session.
#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    /// Items in remote order. Empty when the load failed or the payload
    /// held no items.
    pub items: Vec<CatalogItem>,
    /// Set when the fetch itself failed and the empty item list stands in
    /// for an unreachable catalog.
    pub failure: Option<String>,
}

struct CacheState {
    snapshot: Option<Arc<LoadedCatalog>>,
    inflight: Option<broadcast::Sender<Arc<LoadedCatalog>>>,
}

/// Owns the catalog lifecycle: one fetch per session, shared by every caller.
pub struct CatalogCache {
    backend: Box<dyn CatalogBackend>,
    state: Mutex<CacheState>,
}

impl CatalogCache {
    /// Creates an unloaded cache over a catalog transport.
    pub fn new(backend: Box<dyn CatalogBackend>) -> Self {
        Self {
            backend,
            state: Mutex::new(CacheState {
                snapshot: None,
                inflight: None,
            }),
        }
    }

    /// Returns the session snapshot, fetching it on first use.
    ///
    /// Concurrent callers before the first load settles share one backend
    /// request: the first caller fetches, the rest block until that fetch
    /// publishes. The outcome, including a failed fetch folded to an empty
    /// snapshot, is memoized for the rest of the session and never retried.
    pub fn load(&self) -> Arc<LoadedCatalog> {
        let mut subscription = {
            let mut state = self.state.lock().expect("catalog cache lock poisoned");
            if let Some(snapshot) = state.snapshot.as_ref() {
                return snapshot.clone();
            }
            match state.inflight.as_ref() {
                Some(pending) => pending.subscribe(),
                None => {
                    let (publisher, _) = broadcast::channel(1);
                    state.inflight = Some(publisher);
                    drop(state);
                    return self.fetch_and_publish();
                }
            }
        };
        match subscription.blocking_recv() {
            Ok(snapshot) => snapshot,
            // The publisher is dropped only after the snapshot is stored.
            Err(_) => self.memoized_snapshot(),
        }
    }

    fn fetch_and_publish(&self) -> Arc<LoadedCatalog> {
        debug!("Fetching catalog");
        let loaded = Arc::new(match self.backend.fetch_catalog() {
            Ok(items) => {
                debug!("Catalog loaded with {} item(s)", items.len());
                LoadedCatalog {
                    items,
                    failure: None,
                }
            }
            Err(err) => {
                warn!("Catalog load failed, continuing with empty catalog: {err}");
                LoadedCatalog {
                    items: Vec::new(),
                    failure: Some(err),
                }
            }
        });
        let pending = {
            let mut state = self.state.lock().expect("catalog cache lock poisoned");
            state.snapshot = Some(loaded.clone());
            state.inflight.take()
        };
        if let Some(publisher) = pending {
            let _ = publisher.send(loaded.clone());
        }
        loaded
    }

    fn memoized_snapshot(&self) -> Arc<LoadedCatalog> {
        let state = self.state.lock().expect("catalog cache lock poisoned");
        state.snapshot.clone().unwrap_or_else(|| {
            Arc::new(LoadedCatalog {
                items: Vec::new(),
                failure: Some("Catalog load did not complete".to_string()),
            })
        })
    }
}
