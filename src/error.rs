use std::io;
use thiserror::Error;

/// Every failure the b-file core can report.
///
/// Decode errors carry the 1-based line number of the offending row so a
/// hand-edited file can be located quickly.
#[derive(Error, Debug)]
pub enum BFileError {
    #[error("Line {line}: row of {len} characters does not fit the 8-character cell layout; ensure the b-file has not been modified outside of RAS")]
    MalformedRow { line: usize, len: usize },
    #[error("Line {line}, cell {column}: {field} '{text}' is not a valid number")]
    FlagParse { line: usize, column: usize, field: &'static str, text: String },
    #[error("Line {line}: expected a {field} in cell {column} but the row has only {cells} cells")]
    MissingCell { line: usize, column: usize, cells: usize, field: &'static str },
    #[error("Block starting at line {line} ended after {available} body rows; {needed} required")]
    TruncatedBlock { line: usize, needed: usize, available: usize },
    #[error("Outlet series '{name}' declares {declared} rows but {found} were found")]
    SeriesCount { name: String, declared: usize, found: usize },
    #[error("Line {line}: line ending differs from the rest of the file")]
    MixedLineEndings { line: usize },
    #[error("Structure '{0}' is not in the b-file or has no SNET id")]
    UnknownStructure(String),
    #[error("No outlet time series matches '{0}'")]
    UnknownSeries(String),
    #[error("Replacement series has {actual} values; the b-file declares {expected}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BFileError>;
