//! Knowledge-graph query layer.
//!
//! - **subject**: validated subject identifiers.
//! - **templates**: one query template per [`Facet`] plus its declared fields.
//! - **result_set**: the normalized result document every query returns.
//! - **endpoint**: executors that send a query and parse the answer.

pub mod endpoint;
pub mod result_set;
pub mod subject;
pub mod templates;

use std::fmt;

use thiserror::Error;

pub use endpoint::QueryEndpoint;
pub use result_set::{ResultSet, Row, TypedValue, ValueKind};
pub use subject::Subject;
pub use templates::{Facet, TemplateSet};

// ── Error ─────────────────────────────────────────────────────────────────────

/// Why a request did not produce a successful response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureStatus {
    /// The endpoint answered with a non-success HTTP status.
    Http(u16),
    /// The per-call deadline expired.
    Timeout,
    /// No response at all (connection refused, DNS, TLS, …).
    Transport,
}

impl fmt::Display for FailureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStatus::Http(code) => write!(f, "HTTP {code}"),
            FailureStatus::Timeout => f.write_str("timeout"),
            FailureStatus::Transport => f.write_str("transport"),
        }
    }
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("query failed ({status}): {body}")]
    Failed { status: FailureStatus, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("invalid subject identifier: '{0}'")]
    InvalidSubject(String),
}

impl QueryError {
    pub fn timeout(context: impl Into<String>) -> Self {
        QueryError::Failed { status: FailureStatus::Timeout, body: context.into() }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, QueryError::Failed { status: FailureStatus::Timeout, .. })
    }
}
