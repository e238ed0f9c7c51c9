use std::path::PathBuf;

use chrono::NaiveDate;

/// Problems with the shape or content of the input table.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("missing required column `{column}`")]
    MissingColumn { column: &'static str },

    /// Neither `Weight` nor `Progress` is present, so no row can carry earned effort.
    #[error("input needs a `Weight` or a `Progress` column")]
    NoProgressColumn,

    #[error("row {row}: column `{column}` has invalid value {value:?}: {reason}")]
    InvalidField {
        row: usize,
        column: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum OkrError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("invalid period: end {end} is not after start {start}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    #[error("failed to read records from {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV input: {0}")]
    Csv(#[from] csv::Error),
}

impl OkrError {
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema(_))
    }
}

pub type Result<T, E = OkrError> = std::result::Result<T, E>;
