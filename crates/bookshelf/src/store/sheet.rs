//! Remote spreadsheet receiving join-us submissions.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;
use url::Url;

use super::{check_status, StoreError};
use crate::google::{GoogleAuth, SHEETS_SCOPES};

const SHEETS_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Column headers shared by the sheet and the local backup.
pub const JOIN_HEADERS: [&str; 4] = ["Name", "Email", "Mobile", "City"];

/// A "join us" form entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinSubmission {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Mobile")]
    pub mobile: String,
    #[serde(rename = "City")]
    pub city: String,
}

impl JoinSubmission {
    pub fn to_row(&self) -> [&str; 4] {
        [&self.name, &self.email, &self.mobile, &self.city]
    }

    /// Build from a sheet row; short rows are padded with blanks.
    pub fn from_cells(cells: &[String]) -> Self {
        let cell = |i: usize| cells.get(i).cloned().unwrap_or_default();
        Self {
            name: cell(0),
            email: cell(1),
            mobile: cell(2),
            city: cell(3),
        }
    }
}

/// Append-only remote sink for submissions.
#[async_trait]
pub trait SheetSink: Send + Sync {
    async fn append(&self, submission: &JoinSubmission) -> Result<(), StoreError>;

    /// All data rows, header excluded.
    async fn rows(&self) -> Result<Vec<JoinSubmission>, StoreError>;
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Google Sheets client for a single spreadsheet range.
#[derive(Clone)]
pub struct GoogleSheet {
    auth: GoogleAuth,
    http: reqwest::Client,
    spreadsheet_id: String,
    range: String,
}

impl GoogleSheet {
    pub fn new(auth: GoogleAuth, spreadsheet_id: impl Into<String>, range: impl Into<String>) -> Self {
        Self {
            auth,
            http: reqwest::Client::new(),
            spreadsheet_id: spreadsheet_id.into(),
            range: range.into(),
        }
    }

    fn values_url(&self, suffix: &str) -> Result<Url, StoreError> {
        let mut url = Url::parse(SHEETS_BASE)
            .map_err(|e| StoreError::Decode(format!("sheets url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Decode("sheets url cannot be a base".to_string()))?
            .push(&self.spreadsheet_id)
            .push("values")
            .push(&format!("{}{}", self.range, suffix));
        Ok(url)
    }
}

#[async_trait]
impl SheetSink for GoogleSheet {
    async fn append(&self, submission: &JoinSubmission) -> Result<(), StoreError> {
        let token = self.auth.token(SHEETS_SCOPES).await?;
        let res = self
            .http
            .post(self.values_url(":append")?)
            .bearer_auth(token)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "values": [submission.to_row()] }))
            .send()
            .await?;
        check_status(res).await?;

        tracing::debug!(spreadsheet = %self.spreadsheet_id, "Row appended to sheet");
        Ok(())
    }

    async fn rows(&self) -> Result<Vec<JoinSubmission>, StoreError> {
        let token = self.auth.token(SHEETS_SCOPES).await?;
        let res = self
            .http
            .get(self.values_url("")?)
            .bearer_auth(token)
            .send()
            .await?;
        let range: ValueRange = check_status(res).await?.json().await?;
        Ok(data_rows(range.values))
    }
}

/// Drop a leading header row and map the rest to submissions.
fn data_rows(values: Vec<Vec<String>>) -> Vec<JoinSubmission> {
    let mut rows = values.into_iter().peekable();
    if let Some(first) = rows.peek() {
        let is_header = first
            .iter()
            .zip(JOIN_HEADERS)
            .all(|(cell, header)| cell.trim().eq_ignore_ascii_case(header));
        if is_header && !first.is_empty() {
            rows.next();
        }
    }
    rows.map(|cells| JoinSubmission::from_cells(&cells)).collect()
}

/// In-process sheet.
#[derive(Clone, Default)]
pub struct MemorySheet {
    rows: Arc<RwLock<Vec<JoinSubmission>>>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SheetSink for MemorySheet {
    async fn append(&self, submission: &JoinSubmission) -> Result<(), StoreError> {
        self.rows.write().await.push(submission.clone());
        Ok(())
    }

    async fn rows(&self) -> Result<Vec<JoinSubmission>, StoreError> {
        Ok(self.rows.read().await.clone())
    }
}
