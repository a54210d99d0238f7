//! HTTP catalog transport backed by `ureq`.

use std::time::Duration;

use serde_json::Value;

use crate::backends::CatalogBackend;
use crate::config::CatalogConfig;
use crate::protocol::CatalogItem;

/// Catalog transport issuing one GET against the configured URL.
pub struct HttpCatalogBackend {
    http_client: ureq::Agent,
    url: String,
}

impl HttpCatalogBackend {
    /// Creates a backend with timeouts taken from the catalog config.
    pub fn new(config: &CatalogConfig) -> Self {
        let http_client = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(config.connect_timeout_secs))
            .timeout_read(Duration::from_secs(config.read_timeout_secs))
            .build();
        Self {
            http_client,
            url: config.url.clone(),
        }
    }

    fn request_json(&self) -> Result<Value, String> {
        let response = self
            .http_client
            .get(&self.url)
            .call()
            .map_err(|err| format!("Catalog request failed: {err}"))?;
        let parsed: Value = response
            .into_json()
            .map_err(|err| format!("Catalog response decode failed: {err}"))?;
        Ok(parsed)
    }
}

impl CatalogBackend for HttpCatalogBackend {
    fn fetch_catalog(&self) -> Result<Vec<CatalogItem>, String> {
        let payload = self.request_json()?;
        Ok(parse_catalog_payload(&payload))
    }
}

/// Builds one catalog item from a payload entry, defaulting optional
/// fields. Entries without a numeric `number` are dropped.
fn parse_item(entry: &Value) -> Option<CatalogItem> {
    let number = entry.get("number")?.as_i64()?;
    let name = entry
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let category = entry
        .get("category")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned);
    let device = entry.get("device").and_then(Value::as_array).map(|labels| {
        labels
            .iter()
            .filter_map(Value::as_str)
            .map(ToOwned::to_owned)
            .collect()
    });
    let link = entry
        .get("link")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned);
    Some(CatalogItem {
        number,
        name,
        category,
        device,
        link,
    })
}

/// Extracts catalog items from a decoded payload, keeping remote order.
/// Non-array payloads hold no items.
pub(crate) fn parse_catalog_payload(payload: &Value) -> Vec<CatalogItem> {
    match payload {
        Value::Array(entries) => entries.iter().filter_map(parse_item).collect(),
        _ => Vec::new(),
    }
}
