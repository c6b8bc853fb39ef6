//! Fan-out orchestrator.
//!
//! # Query cycle
//!
//! [`Inspector::run_full_query`] dispatches one executor call per [`Facet`]
//! onto a `JoinSet`, every call spawned before any is awaited. The join drains
//! every task and keeps the first error seen; a single failure fails the whole
//! cycle and no record is produced.
//!
//! # Signals
//!
//! Observers subscribe to a `watch` channel carrying [`Signals`]. `busy` is
//! raised before dispatch and cleared after the join; `status` moves
//! `Idle -> Active -> Complete | Error`.
//!
//! # Supersession
//!
//! Each cycle takes the next generation number and a fresh
//! [`CancellationToken`], cancelling the previous cycle's token. A cancelled
//! cycle aborts its remaining facet tasks and returns
//! [`InspectError::Superseded`] without publishing anything, so a slow stale
//! answer can never overwrite a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::core::config::InspectorConfig;
use crate::sparql::{Facet, FailureStatus, QueryEndpoint, QueryError, ResultSet, Subject, TemplateSet};

use super::InspectError;
use super::merge::{FacetResults, MergedRecord, merge};

type FacetOutcome = (Facet, Result<ResultSet, QueryError>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Idle,
    Active,
    Complete,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Signals {
    pub busy: bool,
    pub status: Status,
}

impl Default for Signals {
    fn default() -> Self {
        Self { busy: false, status: Status::Idle }
    }
}

pub struct Inspector {
    endpoint: QueryEndpoint,
    templates: TemplateSet,
    facet_timeout: Duration,
    generation: AtomicU64,
    current: Mutex<CancellationToken>,
    signals: watch::Sender<Signals>,
}

impl Inspector {
    pub fn new(endpoint: QueryEndpoint, config: &InspectorConfig) -> Self {
        let (signals, _) = watch::channel(Signals::default());
        Self {
            endpoint,
            templates: TemplateSet::new(config.facets),
            facet_timeout: config.facet_timeout,
            generation: AtomicU64::new(0),
            current: Mutex::new(CancellationToken::new()),
            signals,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Signals> {
        self.signals.subscribe()
    }

    pub fn signals(&self) -> Signals {
        *self.signals.borrow()
    }

    /// Generation of the most recently started cycle (0 before the first).
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn endpoint(&self) -> &QueryEndpoint {
        &self.endpoint
    }

    /// Fetch every facet for `subject` and merge them into one record.
    pub async fn run_full_query(&self, subject: &Subject) -> Result<MergedRecord, InspectError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        {
            let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *current, token.clone()).cancel();
        }

        let span = info_span!("cycle", cycle = %Uuid::new_v4(), generation, %subject);
        self.run_cycle(subject, generation, token).instrument(span).await
    }

    async fn run_cycle(
        &self,
        subject: &Subject,
        generation: u64,
        token: CancellationToken,
    ) -> Result<MergedRecord, InspectError> {
        self.publish(generation, Signals { busy: true, status: Status::Active });

        let mut set: JoinSet<FacetOutcome> = JoinSet::new();
        for facet in Facet::ALL {
            let query = self.templates.query_for(facet, subject);
            if query.is_none() {
                debug!(facet = facet.name(), "facet disabled, answering empty");
            }
            let endpoint = self.endpoint.clone();
            let deadline = self.facet_timeout;
            set.spawn(async move {
                let outcome = match tokio::time::timeout(deadline, endpoint.execute(query.as_deref())).await {
                    Ok(res) => res,
                    Err(_) => Err(QueryError::timeout(format!(
                        "{} facet exceeded {}s",
                        facet.name(),
                        deadline.as_secs_f64()
                    ))),
                };
                (facet, outcome)
            });
        }
        debug!(facets = set.len(), "fan-out dispatched");

        let joined = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            joined = join_all(&mut set) => Some(joined),
        };

        let joined = match joined {
            Some(j) if !token.is_cancelled() => j,
            _ => {
                set.abort_all();
                info!("superseded by a newer query, discarding");
                return Err(InspectError::Superseded { generation });
            }
        };

        let results = match joined {
            Ok(results) => results,
            Err(e) => {
                self.publish(generation, Signals { busy: false, status: Status::Error });
                return Err(e.into());
            }
        };

        let record = merge(&results);
        self.publish(generation, Signals { busy: false, status: Status::Complete });

        if record.is_empty() {
            warn!("every facet came back blank");
            return Err(InspectError::NoDataFound { subject: subject.to_string() });
        }
        info!(fields = record.fields.len(), "profile assembled");
        Ok(record)
    }

    /// Only the latest generation may touch the signals.
    fn publish(&self, generation: u64, signals: Signals) {
        if self.generation.load(Ordering::SeqCst) == generation {
            self.signals.send_replace(signals);
        }
    }
}

/// Drain every facet task; keep the first error observed.
async fn join_all(set: &mut JoinSet<FacetOutcome>) -> Result<FacetResults, QueryError> {
    let mut results = FacetResults::new();
    let mut first_err: Option<QueryError> = None;

    while let Some(res) = set.join_next().await {
        match res {
            // Facet task panicked.
            Err(e) => {
                error!("facet task panicked: {e}");
                first_err.get_or_insert_with(|| QueryError::Failed {
                    status: FailureStatus::Transport,
                    body: format!("facet task panicked: {e}"),
                });
            }
            Ok((facet, Err(e))) => {
                error!(facet = facet.name(), error = %e, "facet query failed");
                first_err.get_or_insert(e);
            }
            Ok((facet, Ok(rs))) => {
                debug!(facet = facet.name(), rows = rs.rows.len(), "facet answered");
                results.insert(facet, rs);
            }
        }
    }

    match first_err {
        Some(e) => Err(e),
        None => Ok(results),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::config::FacetToggles;
    use crate::sparql::TypedValue;
    use crate::sparql::endpoint::fixture::FixtureEndpoint;

    fn subject(id: &str) -> Subject {
        Subject::parse(id).unwrap()
    }

    fn config(timeout_secs: u64) -> InspectorConfig {
        InspectorConfig { facet_timeout: Duration::from_secs(timeout_secs), facets: FacetToggles::default() }
    }

    fn identity(label: &str) -> ResultSet {
        ResultSet::new(Facet::Identity.fields().iter().copied())
            .with_row([("COMPANY_label", TypedValue::literal(label))])
    }

    fn inspector(fixture: FixtureEndpoint, timeout_secs: u64) -> Inspector {
        Inspector::new(QueryEndpoint::Fixture(fixture), &config(timeout_secs))
    }

    #[tokio::test]
    async fn successful_cycle_merges_and_completes() {
        let s = subject("Q312");
        let fixture = FixtureEndpoint::new()
            .answer(Facet::Identity.template(&s), identity("Apple Inc."))
            .answer(
                Facet::People.template(&s),
                ResultSet::new(["CEOS_HISTORY"]).with_row([("CEOS_HISTORY", TypedValue::literal("Tim Cook"))]),
            );
        let insp = inspector(fixture, 5);

        let record = insp.run_full_query(&s).await.unwrap();
        assert_eq!(record.scalar("COMPANY_label").unwrap().content, "Apple Inc.");
        assert_eq!(record.scalar("CEOS_HISTORY").unwrap().content, "Tim Cook");
        assert_eq!(insp.signals(), Signals { busy: false, status: Status::Complete });
        assert_eq!(insp.generation(), 1);
    }

    #[tokio::test]
    async fn one_failing_facet_fails_the_cycle() {
        let s = subject("Q312");
        let fixture = FixtureEndpoint::new()
            .answer(Facet::Identity.template(&s), identity("Apple Inc."))
            .fail(Facet::Social.template(&s), 500, "upstream exploded");
        let insp = inspector(fixture, 5);

        let err = insp.run_full_query(&s).await.unwrap_err();
        assert!(matches!(
            err,
            InspectError::Query(QueryError::Failed { status: FailureStatus::Http(500), .. })
        ));
        assert_eq!(insp.signals(), Signals { busy: false, status: Status::Error });
    }

    #[tokio::test(start_paused = true)]
    async fn status_moves_through_active() {
        let s = subject("Q312");
        let fixture = FixtureEndpoint::new().answer_after(
            Facet::Identity.template(&s),
            identity("Apple Inc."),
            Duration::from_millis(50),
        );
        let insp = Arc::new(inspector(fixture, 5));
        let mut rx = insp.subscribe();
        assert_eq!(*rx.borrow(), Signals::default());

        let watcher = tokio::spawn(async move {
            let mut seen = Vec::new();
            while rx.changed().await.is_ok() {
                let s = *rx.borrow_and_update();
                seen.push(s);
                if matches!(s.status, Status::Complete | Status::Error) {
                    break;
                }
            }
            seen
        });

        insp.run_full_query(&s).await.unwrap();
        let seen = watcher.await.unwrap();
        assert_eq!(
            seen,
            vec![
                Signals { busy: true, status: Status::Active },
                Signals { busy: false, status: Status::Complete },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_facet_hits_the_deadline() {
        let s = subject("Q312");
        let fixture = FixtureEndpoint::new()
            .answer(Facet::Identity.template(&s), identity("Apple Inc."))
            .answer_after(Facet::Brands.template(&s), ResultSet::empty(), Duration::from_secs(60));
        let insp = inspector(fixture, 2);

        let err = insp.run_full_query(&s).await.unwrap_err();
        match err {
            InspectError::Query(e) => assert!(e.is_timeout(), "expected timeout, got {e}"),
            other => panic!("expected query error, got {other:?}"),
        }
        assert_eq!(insp.signals().status, Status::Error);
        assert!(!insp.signals().busy);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_cycle_supersedes_older() {
        let old = subject("Q1");
        let new = subject("Q2");
        let fixture = FixtureEndpoint::new()
            .answer_after(Facet::Identity.template(&old), identity("Old"), Duration::from_secs(10))
            .answer(Facet::Identity.template(&new), identity("New"));
        let insp = Arc::new(inspector(fixture, 30));

        let stale = tokio::spawn({
            let insp = Arc::clone(&insp);
            async move { insp.run_full_query(&old).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        let fresh = insp.run_full_query(&new).await.unwrap();
        assert_eq!(fresh.scalar("COMPANY_label").unwrap().content, "New");

        let err = stale.await.unwrap().unwrap_err();
        assert!(matches!(err, InspectError::Superseded { generation: 1 }));
        assert_eq!(insp.signals(), Signals { busy: false, status: Status::Complete });
        assert_eq!(insp.generation(), 2);
    }

    #[tokio::test]
    async fn repeated_calls_refetch_everything() {
        let s = subject("Q312");
        let fixture = FixtureEndpoint::new().answer(Facet::Identity.template(&s), identity("Apple Inc."));
        let insp = inspector(fixture.clone(), 5);

        let a = insp.run_full_query(&s).await.unwrap();
        let b = insp.run_full_query(&s).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(fixture.calls(), 2 * Facet::ALL.len());
    }

    #[tokio::test]
    async fn disabled_facets_are_not_queried() {
        let s = subject("Q312");
        let fixture = FixtureEndpoint::new()
            .answer(Facet::Identity.template(&s), identity("Apple Inc."))
            .fail(Facet::Market.template(&s), 500, "should not be asked");
        let cfg = InspectorConfig {
            facet_timeout: Duration::from_secs(5),
            facets: FacetToggles { market: false, brands: false },
        };
        let insp = Inspector::new(QueryEndpoint::Fixture(fixture.clone()), &cfg);

        insp.run_full_query(&s).await.unwrap();
        assert_eq!(fixture.calls(), Facet::ALL.len() - 2);
    }

    #[tokio::test]
    async fn all_empty_is_no_data_found() {
        let insp = inspector(FixtureEndpoint::new(), 5);
        let err = insp.run_full_query(&subject("Q999999999")).await.unwrap_err();

        assert!(matches!(&err, InspectError::NoDataFound { subject } if subject == "Q999999999"));
        assert_eq!(insp.signals().status, Status::Complete);
    }

    #[tokio::test]
    async fn blank_aggregate_rows_are_no_data_found() {
        let s = subject("Q999999999");
        let blank = |facet: Facet| {
            ResultSet::new(facet.fields().iter().copied())
                .with_row(facet.fields().iter().map(|f| (*f, TypedValue::literal(""))))
        };
        let mut fixture = FixtureEndpoint::new();
        for facet in [Facet::People, Facet::Corporate, Facet::Social, Facet::Market, Facet::Brands] {
            fixture = fixture.answer(facet.template(&s), blank(facet));
        }
        let insp = inspector(fixture, 5);

        let err = insp.run_full_query(&s).await.unwrap_err();
        assert!(matches!(&err, InspectError::NoDataFound { subject } if subject == "Q999999999"));
        assert_eq!(insp.signals(), Signals { busy: false, status: Status::Complete });
    }

    #[tokio::test(start_paused = true)]
    async fn late_failure_still_rejects_the_cycle() {
        let s = subject("Q312");
        let fixture = FixtureEndpoint::new()
            .answer(Facet::Identity.template(&s), identity("Apple Inc."))
            .fail_after(Facet::Brands.template(&s), 503, "late", Duration::from_secs(3));
        let insp = inspector(fixture, 30);

        let err = insp.run_full_query(&s).await.unwrap_err();
        assert!(matches!(
            err,
            InspectError::Query(QueryError::Failed { status: FailureStatus::Http(503), .. })
        ));
        assert_eq!(insp.signals(), Signals { busy: false, status: Status::Error });
    }

    #[tokio::test(start_paused = true)]
    async fn early_failure_waits_for_pending_facets() {
        let s = subject("Q312");
        let fixture = FixtureEndpoint::new()
            .fail(Facet::People.template(&s), 500, "early")
            .answer_after(Facet::Identity.template(&s), identity("Apple Inc."), Duration::from_secs(5));
        let insp = Arc::new(inspector(fixture, 30));

        let cycle = tokio::spawn({
            let insp = Arc::clone(&insp);
            async move { insp.run_full_query(&s).await }
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(insp.signals(), Signals { busy: true, status: Status::Active });
        assert!(!cycle.is_finished());

        let err = cycle.await.unwrap().unwrap_err();
        assert!(matches!(err, InspectError::Query(QueryError::Failed { .. })));
        assert_eq!(insp.signals(), Signals { busy: false, status: Status::Error });
    }
}
