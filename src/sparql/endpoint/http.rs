//! HTTP executor for the public SPARQL endpoint, directly or through a relay.
//!
//! The route is fixed at construction. Relay requests go to
//! `{relay_url}/wikidata-sparql` and `{relay_url}/autocomplete`; the relay adds
//! its own client identification. Direct requests carry the configured
//! `User-Agent` themselves.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, error, trace};

use crate::core::config::{EndpointConfig, EndpointMode};
use crate::sparql::{FailureStatus, QueryError, ResultSet};
use crate::subjects::Candidate;

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

#[derive(Debug, Clone)]
enum Route {
    Relay { base_url: String },
    Direct { sparql_url: String, search_url: String, user_agent: String },
}

/// Cheap to clone: `reqwest::Client` is an `Arc` internally.
#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    client: Client,
    route: Route,
    language: String,
}

impl HttpEndpoint {
    pub fn new(config: &EndpointConfig, language: &str) -> Result<Self, QueryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| QueryError::Failed {
                status: FailureStatus::Transport,
                body: format!("failed to build HTTP client: {e}"),
            })?;

        let route = match config.mode {
            EndpointMode::Relay => Route::Relay { base_url: config.relay_url.clone() },
            EndpointMode::Direct => Route::Direct {
                sparql_url: config.sparql_url.clone(),
                search_url: config.search_url.clone(),
                user_agent: config.user_agent.clone(),
            },
        };

        Ok(Self { client, route, language: language.to_string() })
    }

    pub fn describe(&self) -> String {
        match &self.route {
            Route::Relay { base_url } => format!("relay {base_url}"),
            Route::Direct { sparql_url, .. } => format!("direct {sparql_url}"),
        }
    }

    pub async fn execute(&self, query: &str) -> Result<ResultSet, QueryError> {
        let req = match &self.route {
            Route::Relay { base_url } => self.client.get(format!("{base_url}/wikidata-sparql")),
            Route::Direct { sparql_url, user_agent, .. } => self
                .client
                .get(sparql_url)
                .header(reqwest::header::USER_AGENT, user_agent),
        }
        .header(reqwest::header::ACCEPT, SPARQL_RESULTS_JSON)
        .query(&[("query", query)]);

        debug!(route = %self.describe(), query_len = query.len(), "sending query");
        trace!(%query, "full query text");

        let body = read_body(send(req).await?).await?;
        let rs = ResultSet::from_json(&body).inspect_err(|e| {
            error!(error = %e, "query response did not parse");
        })?;

        debug!(fields = rs.fields.len(), rows = rs.rows.len(), "query answered");
        Ok(rs)
    }

    pub async fn search(&self, term: &str) -> Result<Vec<Candidate>, QueryError> {
        let wire: Vec<WireCandidate> = match &self.route {
            Route::Relay { base_url } => {
                let req = self
                    .client
                    .get(format!("{base_url}/autocomplete"))
                    .header(reqwest::header::ACCEPT, "application/json")
                    .query(&[("search", term)]);
                let body = read_body(send(req).await?).await?;
                serde_json::from_str(&body).map_err(|e| QueryError::Malformed(e.to_string()))?
            }
            Route::Direct { search_url, user_agent, .. } => {
                let req = self
                    .client
                    .get(search_url)
                    .header(reqwest::header::ACCEPT, "application/json")
                    .header(reqwest::header::USER_AGENT, user_agent)
                    .query(&[
                        ("action", "wbsearchentities"),
                        ("format", "json"),
                        ("language", self.language.as_str()),
                        ("type", "item"),
                        ("continue", "0"),
                        ("search", term),
                    ]);
                let body = read_body(send(req).await?).await?;
                let page: WireSearchPage =
                    serde_json::from_str(&body).map_err(|e| QueryError::Malformed(e.to_string()))?;
                page.search
            }
        };

        debug!(%term, candidates = wire.len(), "search answered");
        Ok(wire.into_iter().map(Candidate::from).collect())
    }
}

// ── Transport helpers ─────────────────────────────────────────────────────────

async fn send(req: RequestBuilder) -> Result<Response, QueryError> {
    let response = req.send().await.map_err(|e| {
        error!(error = %e, "HTTP request failed (transport)");
        transport_error(e)
    })?;
    check_status(response).await
}

async fn read_body(response: Response) -> Result<String, QueryError> {
    response.text().await.map_err(transport_error)
}

fn transport_error(e: reqwest::Error) -> QueryError {
    let status = if e.is_timeout() { FailureStatus::Timeout } else { FailureStatus::Transport };
    QueryError::Failed { status, body: e.to_string() }
}

/// Pass a successful response through, or turn it into `QueryError::Failed`.
async fn check_status(response: Response) -> Result<Response, QueryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let raw = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let body = match serde_json::from_str::<RelayErrorEnvelope>(&raw) {
        Ok(env) => match env.details {
            Some(details) => format!("{}: {details}", env.error),
            None => env.error,
        },
        Err(_) => raw,
    };

    error!(%status, %body, "endpoint returned HTTP error");
    Err(QueryError::Failed { status: FailureStatus::Http(status.as_u16()), body })
}

// ── Private wire types ────────────────────────────────────────────────────────

// Error envelope the relay sends on upstream failure.
#[derive(Debug, Deserialize)]
struct RelayErrorEnvelope {
    error: String,
    #[serde(default)]
    details: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireSearchPage {
    #[serde(default)]
    search: Vec<WireCandidate>,
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    id: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl From<WireCandidate> for Candidate {
    fn from(w: WireCandidate) -> Self {
        let label = w.label.unwrap_or_else(|| w.id.clone());
        Candidate { id: w.id, label, description: w.description }
    }
}
