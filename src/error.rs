use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::utils::format_bytes;

/// Application-wide error type for mailsift.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("Failed to launch editor: {0}")]
    Editor(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to write configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error(
        "File {} is too large ({}); the limit is {}",
        .path.display(),
        human_size(.size),
        human_size(.limit)
    )]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error(
        "Unsupported file type: {}. Only text and spreadsheet files are allowed.",
        .0.display()
    )]
    UnsupportedFileType(PathBuf),

    #[error("File {} is not valid UTF-8 text", .0.display())]
    InvalidText(PathBuf),

    #[error("Failed to read spreadsheet: {0}")]
    SpreadsheetRead(#[from] calamine::Error),

    #[error("Failed to write spreadsheet: {0}")]
    SpreadsheetWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("Failed to encode result: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("Background scan failed: {0}")]
    Worker(String),
}

fn human_size(bytes: &u64) -> String {
    format_bytes(*bytes)
}

impl AppError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        AppError::Config(msg.into())
    }
}
