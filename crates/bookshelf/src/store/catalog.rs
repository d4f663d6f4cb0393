//! Book catalog loader.
//!
//! The catalog is the library spreadsheet itself (`.xlsx`, `.xls`, `.xlsb`,
//! `.ods`) or a CSV export of it; the format follows the file extension. Only
//! the first worksheet is read. The file is loaded in full on every call and
//! nothing is cached between requests.
//!
//! Header names and cell values are trimmed. A cell holding only whitespace
//! is treated as blank.

use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;

use calamine::Reader;
use serde::Serialize;

use super::StoreError;

pub const TITLE_COLUMN: &str = "Name Of Book";
pub const AUTHOR_COLUMN: &str = "Writter Name";
pub const SCRIPT_COLUMN: &str = "Langauge/ Script";
pub const TOPIC_COLUMN: &str = "Topic";

/// One catalog row. Blank cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookRecord {
    pub title: Option<String>,
    pub author: Option<String>,
    pub script: Option<String>,
    pub topic: Option<String>,
    /// Columns the search does not look at, passed through as-is
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// Result of reading the catalog file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSnapshot {
    Loaded(Vec<BookRecord>),
    /// The backing file does not exist
    Absent,
}

impl CatalogSnapshot {
    pub fn rows(&self) -> &[BookRecord] {
        match self {
            CatalogSnapshot::Loaded(rows) => rows,
            CatalogSnapshot::Absent => &[],
        }
    }
}

/// On-disk catalog format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Csv,
    Workbook,
}

impl CatalogFormat {
    /// Workbook extensions select the spreadsheet reader; anything else is CSV.
    pub fn of(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("xlsx" | "xlsm" | "xls" | "xlsb" | "ods") => CatalogFormat::Workbook,
            _ => CatalogFormat::Csv,
        }
    }
}

/// Read the catalog from `path`.
///
/// A missing file is reported as `CatalogSnapshot::Absent`; unreadable or
/// malformed files are errors.
pub async fn load_catalog(path: impl AsRef<Path>) -> Result<CatalogSnapshot, StoreError> {
    let path = path.as_ref();
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "Catalog file not found");
            return Ok(CatalogSnapshot::Absent);
        }
        Err(e) => return Err(e.into()),
    };

    let format = CatalogFormat::of(path);
    let rows = match format {
        CatalogFormat::Csv => parse_catalog(&bytes)?,
        CatalogFormat::Workbook => parse_workbook(bytes)?,
    };
    tracing::debug!(path = %path.display(), ?format, rows = rows.len(), "Catalog loaded");
    Ok(CatalogSnapshot::Loaded(rows))
}

/// Parse CSV bytes with a header row into book records.
pub fn parse_catalog(bytes: &[u8]) -> Result<Vec<BookRecord>, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(header_name).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(book_from_cells(&headers, record.iter()));
    }

    Ok(rows)
}

/// Parse the first worksheet of a workbook; its first row holds the headers.
pub fn parse_workbook(bytes: Vec<u8>) -> Result<Vec<BookRecord>, StoreError> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| StoreError::Spreadsheet("workbook has no worksheets".to_string()))??;

    let mut lines = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect::<Vec<_>>());
    let Some(headers) = lines.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = headers.iter().map(|h| header_name(h)).collect();

    Ok(lines
        .map(|cells| book_from_cells(&headers, cells.iter().map(String::as_str)))
        .collect())
}

/// Spreadsheet exports may lead with a byte-order mark.
fn header_name(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

fn book_from_cells<'a>(headers: &[String], cells: impl IntoIterator<Item = &'a str>) -> BookRecord {
    let mut book = BookRecord::default();
    for (header, value) in headers.iter().zip(cells) {
        let value = value.trim();
        let cell = (!value.is_empty()).then(|| value.to_string());
        match header.as_str() {
            TITLE_COLUMN => book.title = cell,
            AUTHOR_COLUMN => book.author = cell,
            SCRIPT_COLUMN => book.script = cell,
            TOPIC_COLUMN => book.topic = cell,
            _ => {
                book.extra.insert(header.clone(), value.to_string());
            }
        }
    }
    book
}
