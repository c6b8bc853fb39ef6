//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory,
//! then applies `INSPECTOR_LOG_LEVEL` and `INSPECTOR_ENDPOINT_MODE` overrides.
//!
//! # Module layout
//!
//! - **types**: public configuration structs (`Config`, `EndpointConfig`, …).
//! - **raw**: raw TOML deserialization types with serde defaults; private.
//! - **load**: `merge_toml`, `load_raw_merged`, `load`, `load_from`, `expand_home`.

mod load;
mod raw;
mod types;

pub use load::{expand_home, load, load_from};
pub use types::*;

#[cfg(test)]
impl Config {
    /// Offline `Config` for unit tests, with unroutable endpoints, short deadlines.
    pub fn test_default() -> Self {
        Self {
            log_level: "info".into(),
            catalog_path: std::path::PathBuf::from("data/companies.json"),
            endpoint: EndpointConfig {
                mode: EndpointMode::Direct,
                relay_url: "http://127.0.0.1:0".into(),
                sparql_url: "http://127.0.0.1:0/sparql".into(),
                search_url: "http://127.0.0.1:0/w/api.php".into(),
                user_agent: "test-agent".into(),
                timeout_seconds: 1,
            },
            inspector: InspectorConfig {
                facet_timeout: std::time::Duration::from_secs(1),
                facets: FacetToggles::default(),
            },
            search: SearchConfig {
                debounce: std::time::Duration::from_millis(300),
                language: "en".into(),
            },
        }
    }
}
