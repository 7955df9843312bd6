//! Shared model for the sales insight pipeline.
//!
//! Holds the record and table types, the error taxonomy, date parsing,
//! number formatting and the command-line settings used by every other crate.

pub mod dates;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod table;

pub use error::{ErrorKind, InsightError, Result};
pub use models::{RawRecord, RawTable, SalesRecord};
pub use table::SalesTable;
