//! Organization profile assembly: fan-out, merge, financial table, display.

pub mod display;
pub mod financials;
pub mod inspector;
pub mod merge;

use thiserror::Error;

use crate::sparql::QueryError;

pub use display::{DISPLAY_ORDER, FieldDisplay};
pub use financials::{Metric, Year, YearRecord};
pub use inspector::{Inspector, Signals, Status};
pub use merge::{FINANCIAL_HISTORY, FacetResults, FieldValue, MergedRecord, merge};

#[derive(Debug, Error)]
pub enum InspectError {
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Every facet answered, none had a row.
    #[error("no data found for {subject}")]
    NoDataFound { subject: String },

    /// A newer query started before this one finished.
    #[error("query cycle {generation} was superseded")]
    Superseded { generation: u64 },
}
