//! Public configuration structs consumed by the rest of the crate.

use std::path::PathBuf;
use std::time::Duration;

/// How query and search requests reach the knowledge graph.
///
/// Chosen once at startup; an endpoint never switches strategy mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointMode {
    /// Same-origin relay that forwards to the real endpoints.
    Relay,
    /// Talk to the public SPARQL and search endpoints directly.
    Direct,
}

impl EndpointMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relay" | "proxy" => Some(Self::Relay),
            "direct" => Some(Self::Direct),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Relay => "relay",
            Self::Direct => "direct",
        }
    }
}

/// Endpoint configuration (`[endpoint]`).
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub mode: EndpointMode,
    /// Relay base URL; `/wikidata-sparql` and `/autocomplete` hang off it.
    pub relay_url: String,
    /// Direct SPARQL endpoint URL.
    pub sparql_url: String,
    /// Direct entity-search API URL.
    pub search_url: String,
    /// Sent as `User-Agent` on direct requests.
    pub user_agent: String,
    /// HTTP client timeout in seconds.
    pub timeout_seconds: u64,
}

/// Which optional facets are queried (`[facets]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacetToggles {
    pub market: bool,
    pub brands: bool,
}

impl Default for FacetToggles {
    fn default() -> Self {
        Self { market: true, brands: true }
    }
}

/// Fan-out configuration (`[inspector]`).
#[derive(Debug, Clone)]
pub struct InspectorConfig {
    /// Deadline applied to each facet call.
    pub facet_timeout: Duration,
    pub facets: FacetToggles,
}

/// Subject search configuration (`[search]`).
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub debounce: Duration,
    pub language: String,
}

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    /// Catalog file of known organizations (already expanded, no `~`).
    pub catalog_path: PathBuf,
    pub endpoint: EndpointConfig,
    pub inspector: InspectorConfig,
    pub search: SearchConfig,
}
