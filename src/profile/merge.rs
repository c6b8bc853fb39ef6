//! Reconciles per-facet result sets into one record.
//!
//! Scalar facets are folded in [`Facet::ALL`] order with last-write-wins on a
//! field-name collision. The financial history is never flattened: its whole
//! row list is stored under [`FINANCIAL_HISTORY`] as a [`FieldValue::Series`].

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::sparql::{Facet, ResultSet, Row, TypedValue};

use super::financials::{self, YearRecord};

/// Reserved field holding the financial-history rows.
pub const FINANCIAL_HISTORY: &str = "FINANCIAL_HISTORY";

/// Results of one fan-out, keyed by facet. A missing facet reads as empty.
pub type FacetResults = BTreeMap<Facet, ResultSet>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Scalar(TypedValue),
    Series(Vec<Row>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergedRecord {
    /// Union of declared field names, first occurrence wins the position.
    pub fields: Vec<String>,
    pub row: BTreeMap<String, FieldValue>,
}

impl MergedRecord {
    /// Nothing worth showing: no financial history and every scalar blank.
    ///
    /// Aggregate facets answer one row of empty `GROUP_CONCAT` strings for a
    /// subject the graph knows nothing about, so blank values do not count.
    pub fn is_empty(&self) -> bool {
        self.row.values().all(|v| match v {
            FieldValue::Scalar(v) => v.content.trim().is_empty(),
            FieldValue::Series(_) => false,
        })
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.row.get(field)
    }

    pub fn scalar(&self, field: &str) -> Option<&TypedValue> {
        match self.row.get(field)? {
            FieldValue::Scalar(v) => Some(v),
            FieldValue::Series(_) => None,
        }
    }

    pub fn series(&self) -> Option<&[Row]> {
        match self.row.get(FINANCIAL_HISTORY)? {
            FieldValue::Series(rows) => Some(rows),
            FieldValue::Scalar(_) => None,
        }
    }

    /// Year-indexed financial table, newest first. Empty when there is no history.
    pub fn financials(&self) -> Vec<YearRecord> {
        self.series().map(financials::derive).unwrap_or_default()
    }
}

pub fn merge(results: &FacetResults) -> MergedRecord {
    let mut all_fields: Vec<&str> = Vec::new();
    let mut row: BTreeMap<String, FieldValue> = BTreeMap::new();

    for facet in Facet::ALL.into_iter().filter(|f| f.is_scalar()) {
        let Some(rs) = results.get(&facet) else { continue };

        if let Some(first) = rs.first_row() {
            for (name, value) in first {
                if !facet.declares(name) {
                    debug!(facet = facet.name(), field = %name, "field outside declared schema");
                }
                row.insert(name.clone(), FieldValue::Scalar(value.clone()));
            }
        }
        all_fields.extend(rs.fields.iter().map(String::as_str));
    }

    let mut seen = HashSet::new();
    let mut fields: Vec<String> = all_fields
        .into_iter()
        .filter(|f| seen.insert(*f))
        .map(str::to_string)
        .collect();

    if let Some(history) = results.get(&Facet::FinancialHistory).filter(|rs| !rs.is_empty()) {
        row.insert(FINANCIAL_HISTORY.to_string(), FieldValue::Series(history.rows.clone()));
        if !fields.iter().any(|f| f == FINANCIAL_HISTORY) {
            fields.push(FINANCIAL_HISTORY.to_string());
        }
    }

    MergedRecord { fields, row }
}
