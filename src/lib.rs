//! Data layer for a game-portal front end.
//!
//! Owns a fetch-once remote catalog with single-flight loading, a substring
//! search ranker, and a persisted play-statistics ledger. Rendering layers
//! consume this surface and draw whatever it returns.

pub mod backends;
pub mod catalog;
pub mod catalog_cache;
pub mod config;
pub mod protocol;
pub mod search;
pub mod stats_ledger;
pub mod stats_store;

pub use catalog::Catalog;
pub use catalog_cache::{CatalogCache, LoadedCatalog};
pub use config::Config;
pub use protocol::{CatalogItem, StatsRecord};
pub use stats_ledger::StatsLedger;
pub use stats_store::StatsStore;
