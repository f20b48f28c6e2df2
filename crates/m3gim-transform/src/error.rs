use m3gim_sheets::SheetError;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, TransformError>;

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error("object table `{table}` has no catalog rows")]
    EmptyObjectTable { table: String },

    #[error("object table `{table}` has no `archivsignatur` column")]
    MissingSignatureColumn { table: String },

    #[error("failed to parse reconciliation cache {}: {source}", path.display())]
    Cache {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize graph document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
