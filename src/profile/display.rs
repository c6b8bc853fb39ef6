//! Presentation boundary: which fields are shown, in what order, and as what.

use std::fmt::Write as _;

use serde::Serialize;

use super::financials::{Metric, NOT_AVAILABLE, YearRecord};
use super::merge::{FINANCIAL_HISTORY, FieldValue, MergedRecord};

pub const DISPLAY_ORDER: [&str; 41] = [
    "COMPANY_label",
    "DESCRIPTION",
    "SECTORS",
    "LEGAL_FORM",
    "LEGAL_ENTITY_IDENTIFIER",
    "FOUNDED_BY",
    "NAMED_AFTER",
    "SLOGAN",
    "WIKIPEDIA_URL",
    "WIKIDATA",
    "COUNTRY_label",
    "HEADQUARTERS",
    "INCEPTION_DATE",
    "EMPLOYEES_COUNT",
    "REPLACES",
    "REPLACED_BY",
    "CEOS_HISTORY",
    "BOARD_MEMBERS",
    "OWNERS_HISTORY",
    "STOCK_EXCHANGES",
    "TICKER_SYMBOLS",
    "ISIN_CODES",
    "SEC_CIK_NUMBER",
    "SWIFT_BIC_CODE",
    FINANCIAL_HISTORY,
    "PARENT_ORGANIZATIONS",
    "SUBSIDIARIES",
    "PRODUCTS_SERVICES",
    "BRANDS_OWNED",
    "PARENT_BRANDS",
    "OFFICIAL_WEBSITE",
    "TWITTER_HANDLES",
    "LINKEDIN_IDS",
    "FACEBOOK_IDS",
    "INSTAGRAM_HANDLES",
    "YOUTUBE_CHANNELS",
    "GITHUB_USERNAMES",
    "CRUNCHBASE_PROFILE",
    "BLOOMBERG_ID",
    "OPENCORPORATES_ID",
    "LOGO_IMAGE",
];

const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".svg"];
const PART_SEPARATOR: &str = "; ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldDisplay {
    NotAvailable,
    Image(String),
    Link(String),
    Lines(Vec<String>),
    Table(Vec<YearRecord>),
}

/// Human label for a field name.
pub fn label(field: &str) -> String {
    field.replace('_', " ")
}

pub fn classify(record: &MergedRecord, field: &str) -> FieldDisplay {
    match record.get(field) {
        None => FieldDisplay::NotAvailable,
        Some(FieldValue::Series(_)) => {
            let table = record.financials();
            if table.is_empty() { FieldDisplay::NotAvailable } else { FieldDisplay::Table(table) }
        }
        Some(FieldValue::Scalar(v)) if v.is_dereferenceable() => {
            let lower = v.content.to_ascii_lowercase();
            if IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
                FieldDisplay::Image(v.content.clone())
            } else {
                FieldDisplay::Link(v.content.clone())
            }
        }
        Some(FieldValue::Scalar(v)) if v.content.trim().is_empty() => FieldDisplay::NotAvailable,
        Some(FieldValue::Scalar(v)) => {
            FieldDisplay::Lines(v.content.split(PART_SEPARATOR).map(str::to_string).collect())
        }
    }
}

/// Every field in display order with its classification.
pub fn layout(record: &MergedRecord) -> Vec<(&'static str, FieldDisplay)> {
    DISPLAY_ORDER.iter().map(|f| (*f, classify(record, f))).collect()
}

/// Plain-text rendering used by the command line.
pub fn render_text(record: &MergedRecord) -> String {
    let width = DISPLAY_ORDER.iter().map(|f| f.len()).max().unwrap_or(0);
    let mut out = String::new();

    for (field, shown) in layout(record) {
        let name = label(field);
        match shown {
            FieldDisplay::NotAvailable => {
                let _ = writeln!(out, "{name:<width$}  {NOT_AVAILABLE}");
            }
            FieldDisplay::Image(url) => {
                let _ = writeln!(out, "{name:<width$}  [image] {url}");
            }
            FieldDisplay::Link(url) => {
                let _ = writeln!(out, "{name:<width$}  {url}");
            }
            FieldDisplay::Lines(lines) => {
                for (i, line) in lines.iter().enumerate() {
                    let head = if i == 0 { name.as_str() } else { "" };
                    let _ = writeln!(out, "{head:<width$}  {line}");
                }
            }
            FieldDisplay::Table(years) => {
                let _ = writeln!(out, "{name}");
                render_table(&mut out, &years);
            }
        }
    }
    out
}

fn render_table(out: &mut String, years: &[YearRecord]) {
    let widths: Vec<usize> = Metric::COLUMNS
        .iter()
        .map(|m| {
            years
                .iter()
                .map(|y| y.value(*m).len())
                .chain(std::iter::once(m.label().len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let _ = write!(out, "  {:<5}", "Year");
    for (m, w) in Metric::COLUMNS.iter().zip(widths.iter().copied()) {
        let _ = write!(out, " | {:>w$}", m.label());
    }
    out.push('\n');

    for year in years {
        let _ = write!(out, "  {:<5}", year.year.to_string());
        for ((_, value), w) in year.columns().zip(widths.iter().copied()) {
            let _ = write!(out, " | {value:>w$}");
        }
        out.push('\n');
    }
}
