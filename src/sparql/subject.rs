use std::fmt;

use serde::{Deserialize, Serialize};

use super::QueryError;

/// Stable identifier of the organization being queried (`Q` + digits).
///
/// Templates interpolate the identifier verbatim, so construction rejects
/// anything outside that alphabet instead of escaping it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Subject(String);

impl Subject {
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let id = raw.trim();
        let well_formed = id.len() > 1
            && id.starts_with('Q')
            && id[1..].bytes().all(|b| b.is_ascii_digit());
        if well_formed {
            Ok(Self(id.to_string()))
        } else {
            Err(QueryError::InvalidSubject(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Subject {
    type Error = QueryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Subject::parse(&value)
    }
}

impl From<Subject> for String {
    fn from(value: Subject) -> Self {
        value.0
    }
}
