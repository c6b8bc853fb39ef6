//! Normalized query results.
//!
//! Every executor answers with a [`ResultSet`]: the declared field names plus
//! zero or more rows of [`TypedValue`]s. The SPARQL JSON wire types are
//! private to this module; callers never see them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::QueryError;

// ── Public model ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Literal,
    ResourceReference,
}

/// One bound value. `content` is always the lexical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypedValue {
    pub kind: ValueKind,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl TypedValue {
    pub fn literal(content: impl Into<String>) -> Self {
        Self { kind: ValueKind::Literal, content: content.into(), datatype: None, language: None }
    }

    pub fn resource(content: impl Into<String>) -> Self {
        Self {
            kind: ValueKind::ResourceReference,
            content: content.into(),
            datatype: None,
            language: None,
        }
    }

    /// A resource reference that can be followed (a link or an image).
    pub fn is_dereferenceable(&self) -> bool {
        self.kind == ValueKind::ResourceReference && self.content.starts_with("http")
    }
}

/// Field name → value. Absent fields are simply missing.
pub type Row = BTreeMap<String, TypedValue>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSet {
    pub fields: Vec<String>,
    pub rows: Vec<Row>,
}

impl ResultSet {
    /// The answer for a facet with nothing to ask.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { fields: fields.into_iter().map(Into::into).collect(), rows: Vec::new() }
    }

    pub fn with_row<I, K>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, TypedValue)>,
        K: Into<String>,
    {
        self.rows.push(values.into_iter().map(|(k, v)| (k.into(), v)).collect());
        self
    }

    pub fn first_row(&self) -> Option<&Row> {
        self.rows.first()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Parse a SPARQL JSON results document.
    pub fn from_json(body: &str) -> Result<Self, QueryError> {
        let doc: WireDocument =
            serde_json::from_str(body).map_err(|e| QueryError::Malformed(e.to_string()))?;
        Ok(doc.into())
    }

    /// Render back into the SPARQL JSON results shape.
    pub fn to_document(&self) -> serde_json::Value {
        let bindings: Vec<serde_json::Value> = self
            .rows
            .iter()
            .map(|row| {
                let obj = row
                    .iter()
                    .map(|(name, v)| (name.clone(), wire_term(v)))
                    .collect::<serde_json::Map<_, _>>();
                serde_json::Value::Object(obj)
            })
            .collect();
        serde_json::json!({
            "head": { "vars": self.fields },
            "results": { "bindings": bindings },
        })
    }
}

fn wire_term(v: &TypedValue) -> serde_json::Value {
    let mut term = serde_json::Map::new();
    let kind = match v.kind {
        ValueKind::ResourceReference => "uri",
        ValueKind::Literal => "literal",
    };
    term.insert("type".into(), kind.into());
    term.insert("value".into(), v.content.clone().into());
    if let Some(dt) = &v.datatype {
        term.insert("datatype".into(), dt.clone().into());
    }
    if let Some(lang) = &v.language {
        term.insert("xml:lang".into(), lang.clone().into());
    }
    serde_json::Value::Object(term)
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct WireDocument {
    head: WireHead,
    results: WireResults,
}

#[derive(Debug, Deserialize)]
struct WireHead {
    vars: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WireResults {
    bindings: Vec<BTreeMap<String, WireTerm>>,
}

#[derive(Debug, Deserialize)]
struct WireTerm {
    #[serde(rename = "type")]
    kind: String,
    value: String,
    #[serde(default)]
    datatype: Option<String>,
    #[serde(rename = "xml:lang", default)]
    lang: Option<String>,
}

impl From<WireTerm> for TypedValue {
    fn from(t: WireTerm) -> Self {
        // literal, typed-literal and bnode all read as plain text.
        let kind = if t.kind == "uri" { ValueKind::ResourceReference } else { ValueKind::Literal };
        TypedValue { kind, content: t.value, datatype: t.datatype, language: t.lang }
    }
}

impl From<WireDocument> for ResultSet {
    fn from(doc: WireDocument) -> Self {
        let rows = doc
            .results
            .bindings
            .into_iter()
            .map(|b| b.into_iter().map(|(k, v)| (k, TypedValue::from(v))).collect())
            .collect();
        ResultSet { fields: doc.head.vars, rows }
    }
}
