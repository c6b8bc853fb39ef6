//! Query executors.
//!
//! `QueryEndpoint` is an enum over concrete executors. Enum dispatch keeps
//! callers free of trait objects; adding an executor = new module + new
//! variant + new match arms.
//!
//! Endpoints are shared immutable capabilities; clone them freely (the HTTP
//! client and fixture tables are reference-counted).

pub mod fixture;
pub mod http;

use tracing::trace;

use crate::core::config::EndpointConfig;
use crate::subjects::Candidate;

use super::{QueryError, ResultSet};

#[derive(Debug, Clone)]
pub enum QueryEndpoint {
    Http(http::HttpEndpoint),
    Fixture(fixture::FixtureEndpoint),
}

impl QueryEndpoint {
    /// Run one query and return its normalized result set.
    ///
    /// An absent or blank query short-circuits to the empty result set without
    /// touching the network, so a facet without a template can be awaited
    /// like any other.
    pub async fn execute(&self, query: Option<&str>) -> Result<ResultSet, QueryError> {
        let Some(query) = query.filter(|q| !q.trim().is_empty()) else {
            trace!("empty query, skipping request");
            return Ok(ResultSet::empty());
        };
        match self {
            QueryEndpoint::Http(e) => e.execute(query).await,
            QueryEndpoint::Fixture(e) => e.execute(query).await,
        }
    }

    /// Free-text subject search (type-ahead candidates).
    pub async fn search(&self, term: &str) -> Result<Vec<Candidate>, QueryError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        match self {
            QueryEndpoint::Http(e) => e.search(term).await,
            QueryEndpoint::Fixture(e) => e.search(term).await,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            QueryEndpoint::Http(e) => e.describe(),
            QueryEndpoint::Fixture(_) => "fixture".to_string(),
        }
    }
}

/// Construct the HTTP endpoint selected by config. Called once at startup.
pub fn build(config: &EndpointConfig, language: &str) -> Result<QueryEndpoint, QueryError> {
    http::HttpEndpoint::new(config, language).map(QueryEndpoint::Http)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{Config, EndpointMode};

    #[tokio::test]
    async fn empty_query_never_reaches_the_executor() {
        // Unroutable endpoint: any real request would fail.
        let config = Config::test_default();
        let endpoint = build(&config.endpoint, "en").unwrap();

        let rs = endpoint.execute(None).await.unwrap();
        assert!(rs.fields.is_empty());
        assert!(rs.rows.is_empty());

        let rs = endpoint.execute(Some("   ")).await.unwrap();
        assert_eq!(rs, ResultSet::empty());
    }

    #[tokio::test]
    async fn blank_search_returns_no_candidates() {
        let config = Config::test_default();
        let endpoint = build(&config.endpoint, "en").unwrap();
        assert!(endpoint.search("  ").await.unwrap().is_empty());
    }

    #[test]
    fn describe_names_the_route() {
        let mut config = Config::test_default();
        config.endpoint.mode = EndpointMode::Relay;
        let endpoint = build(&config.endpoint, "en").unwrap();
        assert!(endpoint.describe().starts_with("relay"));
    }
}
