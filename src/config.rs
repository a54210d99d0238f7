//! Persistent application configuration model and defaults.

use log::{info, warn};

/// Root configuration persisted to `gamedex.toml`.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Config {
    #[serde(default)]
    /// Remote catalog endpoint preferences.
    pub catalog: CatalogConfig,
}

/// Remote catalog endpoint preferences.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CatalogConfig {
    /// URL serving the catalog as a JSON array.
    #[serde(default = "default_catalog_url")]
    pub url: String,
    /// Base URL that item launch links are resolved against.
    #[serde(default = "default_provider_base")]
    pub provider_base: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: default_catalog_url(),
            provider_base: default_provider_base(),
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
        }
    }
}

fn default_catalog_url() -> String {
    "https://cdn.jsdelivr.net/gh/HyperRushNet/hyperrushnet.github.io/assets/json/games.json"
        .to_string()
}

fn default_provider_base() -> String {
    "https://hyperrushnet.github.io".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_read_timeout_secs() -> u64 {
    15
}

/// Parses config file contents, falling back to defaults when unparseable.
pub fn parse_config(contents: &str) -> Config {
    toml::from_str::<Config>(contents).unwrap_or_default()
}

/// Loads the persisted config, writing a default file on first run.
pub fn load_or_create() -> Config {
    let config_dir = dirs::config_dir().expect("Could not find config directory");
    let config_file = config_dir.join("gamedex.toml");

    if !config_file.exists() {
        let default_config = Config::default();
        info!(
            "Config file not found. Creating default config. path={}",
            config_file.display()
        );
        let serialized =
            toml::to_string(&default_config).expect("Could not serialize default config");
        if let Err(err) = std::fs::write(&config_file, serialized) {
            warn!("Could not write default config: {err}");
        }
        return default_config;
    }

    match std::fs::read_to_string(&config_file) {
        Ok(contents) => parse_config(&contents),
        Err(err) => {
            warn!("Could not read config, using defaults: {err}");
            Config::default()
        }
    }
}
