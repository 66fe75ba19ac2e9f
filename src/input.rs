use std::collections::HashSet;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};

use crate::error::AppError;

const TEXT_EXTENSIONS: &[&str] = &["txt", "csv", "log", "md"];
const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Spreadsheet,
}

impl InputKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        if TEXT_EXTENSIONS.contains(&extension.as_str()) {
            Some(InputKind::Text)
        } else if SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
            Some(InputKind::Spreadsheet)
        } else {
            None
        }
    }
}

/// Turn an input file into scannable text.
///
/// The size limit and the file type are checked before any content is read.
pub fn load_file(path: &Path, max_bytes: u64) -> Result<String, AppError> {
    let kind =
        InputKind::from_path(path).ok_or_else(|| AppError::UnsupportedFileType(path.into()))?;

    let size = fs::metadata(path)?.len();
    if size > max_bytes {
        return Err(AppError::FileTooLarge { path: path.into(), size, limit: max_bytes });
    }

    let text = match kind {
        InputKind::Text => {
            let bytes = fs::read(path)?;
            String::from_utf8(bytes).map_err(|_| AppError::InvalidText(path.into()))?
        }
        InputKind::Spreadsheet => spreadsheet_text(path)?,
    };
    tracing::debug!(path = %path.display(), bytes = text.len(), ?kind, "Input loaded");
    Ok(text)
}

/// Concatenate every non-empty string cell, sheets in file order and cells
/// in row order, separated by spaces.
pub fn spreadsheet_text(path: &Path) -> Result<String, AppError> {
    let mut workbook = open_workbook_auto(path)?;
    let mut text = String::new();

    for sheet in workbook.sheet_names() {
        let range = workbook.worksheet_range(&sheet)?;
        for cell in range.rows().flatten() {
            if let Data::String(value) = cell
                && !value.trim().is_empty()
            {
                text.push_str(value);
                text.push(' ');
            }
        }
    }

    Ok(text)
}

pub fn read_stdin() -> Result<String, AppError> {
    let mut text = String::new();
    io::stdin().read_to_string(&mut text)?;
    Ok(text)
}

/// Addresses from a previously collected list, one per line or comma
/// separated, lowercased for comparison.
pub fn load_known(path: &Path, max_bytes: u64) -> Result<HashSet<String>, AppError> {
    let text = load_file(path, max_bytes)?;
    Ok(text
        .split(['\n', '\r', ',', ' ', '\t'])
        .map(str::trim)
        .filter(|entry| entry.contains('@'))
        .map(str::to_ascii_lowercase)
        .collect())
}
