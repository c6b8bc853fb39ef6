//! Year-indexed financial table derived from the financial-history rows.
//!
//! Each source row carries a metric label, a numeric value and an optional
//! point-in-time date. Rows are bucketed by the date's year; rows without a
//! usable date share the [`Year::Unknown`] bucket, which always sorts last.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Serialize, Serializer};
use tracing::trace;

use crate::sparql::Row;

pub const NOT_AVAILABLE: &str = "N/A";

const METRIC_FIELD: &str = "metric_label";
const VALUE_FIELD: &str = "value";
const DATE_FIELD: &str = "date";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Metric {
    #[serde(rename = "Market Cap")]
    MarketCap,
    #[serde(rename = "Total Revenue")]
    TotalRevenue,
    #[serde(rename = "Operating Income")]
    OperatingIncome,
    #[serde(rename = "Net Income")]
    NetIncome,
    #[serde(rename = "Total Assets")]
    TotalAssets,
    #[serde(rename = "Total Equity")]
    TotalEquity,
    #[serde(rename = "Total Liabilities")]
    TotalLiabilities,
    #[serde(rename = "Total Debt")]
    TotalDebt,
    Employees,
}

impl Metric {
    /// Column order of the rendered table.
    pub const COLUMNS: [Metric; 9] = [
        Metric::MarketCap,
        Metric::TotalRevenue,
        Metric::OperatingIncome,
        Metric::NetIncome,
        Metric::TotalAssets,
        Metric::TotalEquity,
        Metric::TotalLiabilities,
        Metric::TotalDebt,
        Metric::Employees,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::MarketCap => "Market Cap",
            Metric::TotalRevenue => "Total Revenue",
            Metric::OperatingIncome => "Operating Income",
            Metric::NetIncome => "Net Income",
            Metric::TotalAssets => "Total Assets",
            Metric::TotalEquity => "Total Equity",
            Metric::TotalLiabilities => "Total Liabilities",
            Metric::TotalDebt => "Total Debt",
            Metric::Employees => "Employees",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::COLUMNS.into_iter().find(|m| m.label() == label)
    }

    /// Headcount rather than money.
    pub fn is_count(self) -> bool {
        self == Metric::Employees
    }

    /// Render a raw numeric string for this metric, or `None` if it does not parse.
    pub fn format(self, raw: &str) -> Option<String> {
        let n: f64 = raw.trim().parse().ok().filter(|n: &f64| n.is_finite())?;
        if self.is_count() {
            Some(group_thousands(n.trunc() as i64))
        } else {
            Some(format!("{:.1}B", n / 1_000_000_000.0))
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordering puts newer years first and `Unknown` after every known year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Year {
    Known(i32),
    Unknown,
}

impl Year {
    pub fn of(date: Option<&str>) -> Self {
        date.and_then(parse_year).map_or(Year::Unknown, Year::Known)
    }
}

impl Ord for Year {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match (self, other) {
            (Year::Known(a), Year::Known(b)) => b.cmp(a),
            (Year::Known(_), Year::Unknown) => Ordering::Less,
            (Year::Unknown, Year::Known(_)) => Ordering::Greater,
            (Year::Unknown, Year::Unknown) => Ordering::Equal,
        }
    }
}

impl PartialOrd for Year {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Year::Known(y) => write!(f, "{y}"),
            Year::Unknown => f.write_str("?"),
        }
    }
}

impl Serialize for Year {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearRecord {
    pub year: Year,
    values: BTreeMap<Metric, String>,
}

impl YearRecord {
    fn new(year: Year) -> Self {
        Self { year, values: BTreeMap::new() }
    }

    /// Formatted value, `"N/A"` when the year has none.
    pub fn value(&self, metric: Metric) -> &str {
        self.values.get(&metric).map_or(NOT_AVAILABLE, String::as_str)
    }

    /// Values in [`Metric::COLUMNS`] order.
    pub fn columns(&self) -> impl Iterator<Item = (Metric, &str)> + '_ {
        Metric::COLUMNS.into_iter().map(|m| (m, self.value(m)))
    }
}

pub fn derive(rows: &[Row]) -> Vec<YearRecord> {
    let mut years: BTreeMap<Year, YearRecord> = BTreeMap::new();

    for row in rows {
        let Some(label) = row.get(METRIC_FIELD).map(|v| v.content.as_str()) else {
            continue;
        };
        let Some(metric) = Metric::from_label(label) else {
            trace!(%label, "ignoring unknown metric");
            continue;
        };

        let year = Year::of(row.get(DATE_FIELD).map(|v| v.content.as_str()));
        let record = years.entry(year).or_insert_with(|| YearRecord::new(year));

        match row.get(VALUE_FIELD).and_then(|v| metric.format(&v.content)) {
            Some(formatted) => {
                record.values.insert(metric, formatted);
            }
            None => {
                record.values.remove(&metric);
            }
        }
    }

    years.into_values().collect()
}

fn parse_year(date: &str) -> Option<i32> {
    let date = date.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Some(dt.year());
    }
    if let Ok(d) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Some(d.year());
    }
    let digits: String = date.chars().take_while(char::is_ascii_digit).collect();
    if digits.len() == 4 { digits.parse().ok() } else { None }
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
