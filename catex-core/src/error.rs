//! Fatal setup errors
//!
//! Only the setup tier aborts the run. Per-row and per-image failures are
//! logged and degrade to a deterministic fallback instead of surfacing as
//! errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the run before any row processing begins
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("source workbook not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("cannot write to image directory: {dir}")]
    ImageDirNotWritable {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid image column letter: {0:?}")]
    BadImageColumn(String),
}
