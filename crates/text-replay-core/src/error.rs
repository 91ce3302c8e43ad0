use thiserror::Error;

/// Failure to turn uploaded bytes into a [`Dataset`](crate::Dataset).
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("input contains no header row")]
    Empty,
    #[error("duplicate column name `{0}`")]
    DuplicateColumn(String),
    #[error("column name `{0}` is reserved for the row identifier")]
    ReservedColumn(String),
    #[error("unknown separator `{0}`, expected `comma` or `tab`")]
    UnknownSeparator(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Reasons an export produces no file.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No data to download.")]
    NoData,
    #[error("No rows have been tagged to download.")]
    NoPositiveLabels,
    #[error("failed to write export: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Error parsing file: {0}")]
    Parse(#[from] ParseError),
    #[error("no dataset has been uploaded")]
    NoDataset,
    #[error("column `{0}` does not exist")]
    UnknownColumn(String),
    #[error("no chunk is currently displayed")]
    NoChunk,
    #[error("tag name must not be empty")]
    EmptyTagName,
    #[error("tag name `{0}` is already a column of the export")]
    ReservedTagName(String),
    #[error("group {group}, chunk {sub_chunk} is out of range")]
    OutOfRange { group: usize, sub_chunk: usize },
    #[error(transparent)]
    Export(#[from] ExportError),
}

pub type Result<T, E = SessionError> = std::result::Result<T, E>;
