//! Sheet ingestion for M³GIM (boundary adapter).
//!
//! The catalog is maintained as spreadsheets. This crate turns exports of those
//! sheets into [`Table`]s of named-field rows and repairs the two known upstream
//! defects before anything downstream looks at the data:
//!
//! - **header shift**: some index sheets lost their header row, so the first
//!   data row was read as headers (see [`header_shift`]);
//! - **unnamed qualifier columns**: the folio column of the object sheet often
//!   has no header at all (see [`qualifier`]).
//!
//! Headers are normalized (trimmed, lowercased, empty → `unnamed: <n>`); cells
//! are trimmed and empty cells read as absent. Nothing here interprets values.

use std::path::PathBuf;

pub mod header_shift;
pub mod load;
pub mod qualifier;
pub mod table;

pub use header_shift::*;
pub use load::*;
pub use qualifier::*;
pub use table::*;

#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("table `{table}` not found at {}", path.display())]
    Missing { table: String, path: PathBuf },
    #[error("table `{table}` has no header row")]
    NoHeader { table: String },
    #[error("failed to read table `{table}`: {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },
}
