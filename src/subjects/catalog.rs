//! Static organization catalog loaded from a JSON file.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use super::{CatalogEntry, CatalogError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryCount {
    pub country: String,
    pub count: usize,
}

/// Entries kept sorted by label, case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(mut entries: Vec<CatalogEntry>) -> Self {
        entries.sort_by_cached_key(|e| e.label.to_lowercase());
        Self { entries }
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let shown = path.display().to_string();
        let text = std::fs::read_to_string(path)
            .map_err(|source| CatalogError::Io { path: shown.clone(), source })?;
        let catalog = Self::from_json(&text)
            .map_err(|source| CatalogError::Parse { path: shown.clone(), source })?;
        info!(path = %shown, entries = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Vec<CatalogEntry>>(text).map(Self::new)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact id match, else case-insensitive label match.
    pub fn find(&self, needle: &str) -> Option<&CatalogEntry> {
        let needle = needle.trim();
        self.entries
            .iter()
            .find(|e| e.id == needle)
            .or_else(|| self.entries.iter().find(|e| e.label.eq_ignore_ascii_case(needle)))
    }

    /// Per-country totals, largest first, ties by name.
    pub fn country_counts(&self) -> Vec<CountryCount> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for entry in &self.entries {
            *counts.entry(entry.country_or_unknown()).or_default() += 1;
        }
        let mut out: Vec<CountryCount> = counts
            .into_iter()
            .map(|(country, count)| CountryCount { country: country.to_string(), count })
            .collect();
        out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.country.cmp(&b.country)));
        out
    }

    /// Entries whose country matches exactly. `"Unknown"` selects entries without one.
    pub fn filter_by_country<'a>(&'a self, country: &'a str) -> impl Iterator<Item = &'a CatalogEntry> + 'a {
        debug!(%country, "filtering catalog");
        self.entries.iter().filter(move |e| e.country_or_unknown() == country)
    }
}
