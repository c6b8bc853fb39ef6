//! End-to-end query cycles against the in-memory fixture endpoint.

use std::time::Duration;

use wikidata_inspector::config::{FacetToggles, InspectorConfig};
use wikidata_inspector::profile::display::{self, FieldDisplay};
use wikidata_inspector::profile::{FINANCIAL_HISTORY, InspectError, Inspector, Metric, Status, Year};
use wikidata_inspector::sparql::endpoint::fixture::FixtureEndpoint;
use wikidata_inspector::sparql::{Facet, QueryEndpoint, ResultSet, Subject, TypedValue};

fn inspector(fixture: FixtureEndpoint) -> Inspector {
    let cfg = InspectorConfig { facet_timeout: Duration::from_secs(5), facets: FacetToggles::default() };
    Inspector::new(QueryEndpoint::Fixture(fixture), &cfg)
}

fn apple_fixture(s: &Subject) -> FixtureEndpoint {
    let identity = ResultSet::new(Facet::Identity.fields().iter().copied()).with_row([
        ("WIKIDATA", TypedValue::resource("http://www.wikidata.org/entity/Q312")),
        ("COMPANY_label", TypedValue::literal("Apple Inc.")),
        ("COUNTRY_label", TypedValue::literal("United States")),
    ]);
    let social = ResultSet::new(Facet::Social.fields().iter().copied()).with_row([(
        "LOGO_IMAGE",
        TypedValue::resource("http://commons.wikimedia.org/wiki/Special:FilePath/Apple_logo_black.svg"),
    )]);
    let history = ResultSet::new(["metric_label", "value", "date"]).with_row([
        ("metric_label", TypedValue::literal("Total Revenue")),
        ("value", TypedValue::literal("394328000000")),
        ("date", TypedValue::literal("2022-01-01T00:00:00Z")),
    ]);

    // Every other facet legitimately has nothing for this subject.
    FixtureEndpoint::new()
        .answer(Facet::Identity.template(s), identity)
        .answer(Facet::Social.template(s), social)
        .answer(Facet::FinancialHistory.template(s), history)
}

#[tokio::test]
async fn profile_for_known_subject() {
    let s = Subject::parse("Q312").unwrap();
    let insp = inspector(apple_fixture(&s));

    let record = insp.run_full_query(&s).await.unwrap();

    assert_eq!(record.scalar("COMPANY_label").unwrap().content, "Apple Inc.");
    assert_eq!(record.scalar("COUNTRY_label").unwrap().content, "United States");
    assert!(record.fields.iter().any(|f| f == FINANCIAL_HISTORY));

    let years = record.financials();
    assert_eq!(years.len(), 1);
    assert_eq!(years[0].year, Year::Known(2022));
    assert_eq!(years[0].value(Metric::TotalRevenue), "394.3B");
    assert_eq!(years[0].value(Metric::Employees), "N/A");

    assert!(matches!(display::classify(&record, "LOGO_IMAGE"), FieldDisplay::Image(_)));
    assert!(matches!(display::classify(&record, "WIKIDATA"), FieldDisplay::Link(_)));
    assert_eq!(display::classify(&record, "SLOGAN"), FieldDisplay::NotAvailable);

    let signals = insp.signals();
    assert!(!signals.busy);
    assert_eq!(signals.status, Status::Complete);
}

#[tokio::test]
async fn unknown_subject_reports_no_data() {
    let known = Subject::parse("Q312").unwrap();
    let insp = inspector(apple_fixture(&known));

    let err = insp.run_full_query(&Subject::parse("Q4").unwrap()).await.unwrap_err();
    assert!(matches!(err, InspectError::NoDataFound { .. }));
    assert_eq!(err.to_string(), "no data found for Q4");
}

#[tokio::test]
async fn failing_facet_yields_no_partial_record() {
    let s = Subject::parse("Q312").unwrap();
    let fixture = apple_fixture(&s).fail(Facet::People.template(&s), 429, "Too Many Requests");
    let insp = inspector(fixture);

    let err = insp.run_full_query(&s).await.unwrap_err();
    assert_eq!(err.to_string(), "query failed (HTTP 429): Too Many Requests");
    assert_eq!(insp.signals().status, Status::Error);
}

#[tokio::test]
async fn malformed_answer_fails_the_cycle() {
    let s = Subject::parse("Q312").unwrap();
    let fixture = apple_fixture(&s).body(Facet::Brands.template(&s), "[]");
    let insp = inspector(fixture);

    let err = insp.run_full_query(&s).await.unwrap_err();
    assert!(err.to_string().starts_with("malformed response"));
}

#[test]
fn invalid_identifier_never_reaches_a_template() {
    for bad in ["", "Q", "q312", "Q31 2", "Q1} UNION {", "P31"] {
        assert!(Subject::parse(bad).is_err(), "{bad:?} should be rejected");
    }
}
