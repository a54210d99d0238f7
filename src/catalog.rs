//! Collaborator-facing catalog surface.

use std::sync::Arc;

use crate::catalog_cache::CatalogCache;
use crate::protocol::CatalogItem;
use crate::search::search_catalog;

// Launch target for ids that cannot be resolved to a linked item.
const FALLBACK_LAUNCH_PATH: &str = "/games-1/404.html";

/// Read-only catalog API composing the cache and the search ranker.
pub struct Catalog {
    cache: Arc<CatalogCache>,
    provider_base: String,
}

impl Catalog {
    /// Creates a facade over a shared cache. `provider_base` is the URL
    /// prefix that item launch links resolve against.
    pub fn new(cache: Arc<CatalogCache>, provider_base: &str) -> Self {
        Self {
            cache,
            provider_base: provider_base.trim().trim_end_matches('/').to_string(),
        }
    }

    /// Returns a copy of every catalog item, loading the catalog on first use.
    pub fn all(&self) -> Vec<CatalogItem> {
        self.cache.load().items.clone()
    }

    /// Returns items matching `query`, ranked by name-match position.
    pub fn search(&self, query: &str) -> Vec<CatalogItem> {
        search_catalog(&self.cache.load().items, query)
    }

    /// Resolves the launch URL for an item id. Unknown ids and items
    /// without a link resolve to the provider's not-found page.
    pub fn launch_url(&self, id: i64) -> String {
        let snapshot = self.cache.load();
        let link = snapshot
            .items
            .iter()
            .find(|item| item.number == id)
            .and_then(|item| item.link.as_deref());
        format!("{}{}", self.provider_base, link.unwrap_or(FALLBACK_LAUNCH_PATH))
    }
}
