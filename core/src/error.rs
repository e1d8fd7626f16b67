use thiserror::Error;

use crate::loader::SourceTable;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Missing source '{source_table}': cannot read {path}")]
    MissingSource {
        source_table: SourceTable,
        path: String,
    },

    #[error("Schema error in '{source_table}', column '{column}': {detail}")]
    Schema {
        source_table: SourceTable,
        column: String,
        detail: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReportError {
    pub fn schema(source_table: SourceTable, column: &str, detail: impl Into<String>) -> Self {
        Self::Schema {
            source_table,
            column: column.to_string(),
            detail: detail.into(),
        }
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
