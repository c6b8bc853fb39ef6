//! Raw TOML deserialization types.
//!
//! These structs mirror the TOML file shape and use `serde` defaults.
//! The `load` module converts them into the public `types` structs.

use serde::Deserialize;

// ── Top-level ────────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub general: RawGeneral,
    #[serde(default)]
    pub endpoint: RawEndpoint,
    #[serde(default)]
    pub inspector: RawInspector,
    #[serde(default)]
    pub search: RawSearch,
}

#[derive(Deserialize)]
pub(super) struct RawGeneral {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_catalog")]
    pub catalog: String,
}

impl Default for RawGeneral {
    fn default() -> Self {
        Self { log_level: default_log_level(), catalog: default_catalog() }
    }
}

// ── Endpoint ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawEndpoint {
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_relay_url")]
    pub relay_url: String,
    #[serde(default = "default_sparql_url")]
    pub sparql_url: String,
    #[serde(default = "default_search_url")]
    pub search_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for RawEndpoint {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            relay_url: default_relay_url(),
            sparql_url: default_sparql_url(),
            search_url: default_search_url(),
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

// ── Inspector ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawInspector {
    #[serde(default = "default_facet_timeout_seconds")]
    pub facet_timeout_seconds: u64,
    #[serde(default)]
    pub facets: RawFacets,
}

impl Default for RawInspector {
    fn default() -> Self {
        Self {
            facet_timeout_seconds: default_facet_timeout_seconds(),
            facets: RawFacets::default(),
        }
    }
}

/// Only the optional facets can be switched off.
#[derive(Deserialize)]
pub(super) struct RawFacets {
    #[serde(default = "default_true")]
    pub market: bool,
    #[serde(default = "default_true")]
    pub brands: bool,
}

impl Default for RawFacets {
    fn default() -> Self {
        Self { market: true, brands: true }
    }
}

// ── Search ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawSearch {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for RawSearch {
    fn default() -> Self {
        Self { debounce_ms: default_debounce_ms(), language: default_language() }
    }
}

// ── Defaults ─────────────────────────────────────────────────────────────────

pub(super) fn default_log_level() -> String { "info".to_string() }
pub(super) fn default_catalog() -> String { "data/companies.json".to_string() }
pub(super) fn default_mode() -> String { "direct".to_string() }
pub(super) fn default_relay_url() -> String { "http://localhost:3000".to_string() }
pub(super) fn default_sparql_url() -> String { "https://query.wikidata.org/sparql".to_string() }
pub(super) fn default_search_url() -> String { "https://www.wikidata.org/w/api.php".to_string() }
pub(super) fn default_user_agent() -> String { "WikidataInspector/1.0".to_string() }
pub(super) fn default_timeout_seconds() -> u64 { 30 }
pub(super) fn default_facet_timeout_seconds() -> u64 { 30 }
pub(super) fn default_debounce_ms() -> u64 { 300 }
pub(super) fn default_language() -> String { "en".to_string() }

fn default_true() -> bool {
    true
}
