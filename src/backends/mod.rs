//! Catalog transport abstractions and concrete implementations.

pub mod http;

use crate::protocol::CatalogItem;

/// Interface implemented by concrete catalog transports.
///
/// `Err` means the transport itself failed (unreachable endpoint,
/// non-success status, undecodable body). A reachable endpoint serving a
/// payload that is not a JSON array is an empty catalog, not an error.
pub trait CatalogBackend: Send + Sync {
    fn fetch_catalog(&self) -> Result<Vec<CatalogItem>, String>;
}
