//! Custom error types for the application
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetstatError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// The CSV destination could not be opened. Fatal.
    #[error("Cannot open CSV destination {}: {source}", .path.display())]
    SinkOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Socket table error: {0}")]
    ProviderError(String),

    #[error("Unsupported platform: {0}")]
    Unsupported(String),
}
