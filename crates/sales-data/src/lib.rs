//! Data layer for the sales insight pipeline.
//!
//! Responsible for loading and cleaning a sales CSV into the canonical
//! [`SalesTable`](sales_core::SalesTable), grouping primitives, the analyzer
//! query catalog and the one-shot analysis pipeline.

pub mod aggregator;
pub mod analysis;
pub mod analyzer;
pub mod reader;

pub use sales_core as core;
