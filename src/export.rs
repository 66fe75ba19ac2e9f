use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_xlsxwriter::Workbook;

use crate::error::AppError;
use crate::model::{CategoryBuckets, Provider};

const SHEET_NAME: &str = "Emails";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Txt,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(ExportFormat::Txt),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            _ => Err(format!("Unknown export format '{s}' (expected txt or xlsx)")),
        }
    }
}

/// Newline-joined list, as copied to the clipboard or saved as `.txt`.
pub fn to_text<S: AsRef<str>>(emails: &[S]) -> String {
    emails.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("\n")
}

/// `gmail_emails.txt` for one provider, `all_emails.txt` for everything.
pub fn file_name(provider: Option<Provider>, format: ExportFormat) -> String {
    let stem = provider.map(|provider| provider.as_str()).unwrap_or("all");
    format!("{stem}_emails.{}", format.extension())
}

/// Write one provider's bucket into `dir`, returning the file written.
pub fn export_provider(
    buckets: &CategoryBuckets,
    provider: Provider,
    format: ExportFormat,
    dir: &Path,
) -> Result<PathBuf, AppError> {
    let path = dir.join(file_name(Some(provider), format));
    let emails = buckets.get(provider);
    match format {
        ExportFormat::Txt => fs::write(&path, to_text(emails))?,
        ExportFormat::Xlsx => {
            let rows: Vec<Vec<&str>> = emails.iter().map(|email| vec![email.as_str()]).collect();
            write_sheet(&path, &["Email"], &rows)?;
        }
    }
    Ok(path)
}

/// Write every bucket into a single file in `dir`.
pub fn export_all(
    buckets: &CategoryBuckets,
    format: ExportFormat,
    dir: &Path,
) -> Result<PathBuf, AppError> {
    let path = dir.join(file_name(None, format));
    match format {
        ExportFormat::Txt => fs::write(&path, to_text(&buckets.combined()))?,
        ExportFormat::Xlsx => {
            let rows: Vec<Vec<&str>> = buckets
                .iter()
                .flat_map(|(provider, emails)| {
                    emails.iter().map(move |email| vec![email.as_str(), provider.as_str()])
                })
                .collect();
            write_sheet(&path, &["Email", "Provider"], &rows)?;
        }
    }
    Ok(path)
}

fn write_sheet(path: &Path, header: &[&str], rows: &[Vec<&str>]) -> Result<(), AppError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, title) in header.iter().enumerate() {
        worksheet.write_string(0, col as u16, *title)?;
    }
    for (index, row) in rows.iter().enumerate() {
        let row_number = (index + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            worksheet.write_string(row_number, col as u16, *value)?;
        }
    }

    workbook.save(path)?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "Spreadsheet written");
    Ok(())
}
