//! catex-core - Catalog spreadsheet extraction
//!
//! Converts a catalog-style XLSX workbook (text cells plus embedded cell
//! images) into an ordered list of product records and a directory of
//! extracted image files. The row interpretation engine lives in
//! [`classify`]; [`pipeline::run`] drives the whole conversion.

pub mod classify;
pub mod config;
pub mod error;
pub mod media;
pub mod pipeline;
pub mod price;
pub mod reader;
pub mod record;

pub use config::Config;
pub use error::SetupError;
pub use pipeline::{ExtractSummary, run};
pub use record::ProductRecord;
