//! In-memory executor that answers from canned responses.
//!
//! Responses are keyed by exact query text, so callers register them with the
//! same template functions the inspector uses. Unregistered queries answer
//! with an empty result set (a subject the graph knows nothing about).
//! Used for offline runs and for exercising the fan-out without a network.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::sparql::{FailureStatus, QueryError, ResultSet};
use crate::subjects::Candidate;

#[derive(Debug, Clone)]
enum Canned {
    Answer(ResultSet),
    /// Raw body, parsed at execution time like a network response.
    Body(String),
    Fail { status: u16, body: String },
}

#[derive(Debug, Clone)]
struct Entry {
    canned: Canned,
    delay: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
struct Table {
    queries: HashMap<String, Entry>,
    searches: HashMap<String, Vec<Candidate>>,
}

#[derive(Debug, Clone, Default)]
pub struct FixtureEndpoint {
    table: Arc<Table>,
    calls: Arc<AtomicUsize>,
}

impl FixtureEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(self, query: impl Into<String>, rs: ResultSet) -> Self {
        self.insert(query.into(), Canned::Answer(rs), None)
    }

    pub fn answer_after(self, query: impl Into<String>, rs: ResultSet, delay: Duration) -> Self {
        self.insert(query.into(), Canned::Answer(rs), Some(delay))
    }

    pub fn body(self, query: impl Into<String>, body: impl Into<String>) -> Self {
        self.insert(query.into(), Canned::Body(body.into()), None)
    }

    pub fn fail(self, query: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.insert(query.into(), Canned::Fail { status, body: body.into() }, None)
    }

    pub fn fail_after(
        self,
        query: impl Into<String>,
        status: u16,
        body: impl Into<String>,
        delay: Duration,
    ) -> Self {
        self.insert(query.into(), Canned::Fail { status, body: body.into() }, Some(delay))
    }

    pub fn candidates(mut self, term: impl Into<String>, found: Vec<Candidate>) -> Self {
        Arc::make_mut(&mut self.table).searches.insert(term.into(), found);
        self
    }

    /// Number of queries executed so far, across all clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn insert(mut self, query: String, canned: Canned, delay: Option<Duration>) -> Self {
        Arc::make_mut(&mut self.table).queries.insert(query, Entry { canned, delay });
        self
    }

    pub async fn execute(&self, query: &str) -> Result<ResultSet, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let Some(entry) = self.table.queries.get(query) else {
            return Ok(ResultSet::empty());
        };
        if let Some(delay) = entry.delay {
            tokio::time::sleep(delay).await;
        }
        match &entry.canned {
            Canned::Answer(rs) => Ok(rs.clone()),
            Canned::Body(body) => ResultSet::from_json(body),
            Canned::Fail { status, body } => Err(QueryError::Failed {
                status: FailureStatus::Http(*status),
                body: body.clone(),
            }),
        }
    }

    pub async fn search(&self, term: &str) -> Result<Vec<Candidate>, QueryError> {
        Ok(self.table.searches.get(term).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparql::TypedValue;

    #[tokio::test]
    async fn answers_by_exact_query_text() {
        let rs = ResultSet::new(["A"]).with_row([("A", TypedValue::literal("x"))]);
        let f = FixtureEndpoint::new().answer("SELECT 1", rs.clone());

        assert_eq!(f.execute("SELECT 1").await.unwrap(), rs);
        assert!(f.execute("SELECT 2").await.unwrap().is_empty());
        assert_eq!(f.calls(), 2);
    }

    #[tokio::test]
    async fn canned_failure_and_bad_body() {
        let f = FixtureEndpoint::new().fail("Q", 500, "boom").body("B", "{not json");

        let err = f.execute("Q").await.unwrap_err();
        assert!(matches!(err, QueryError::Failed { status: FailureStatus::Http(500), .. }));
        assert!(matches!(f.execute("B").await.unwrap_err(), QueryError::Malformed(_)));
    }

    #[tokio::test]
    async fn clones_share_the_call_counter() {
        let f = FixtureEndpoint::new();
        let g = f.clone();
        g.execute("anything").await.unwrap();
        assert_eq!(f.calls(), 1);
    }

    #[tokio::test]
    async fn search_returns_registered_candidates() {
        let f = FixtureEndpoint::new().candidates(
            "apple",
            vec![Candidate { id: "Q312".into(), label: "Apple Inc.".into(), description: None }],
        );
        assert_eq!(f.search("apple").await.unwrap().len(), 1);
        assert!(f.search("pear").await.unwrap().is_empty());
    }
}
