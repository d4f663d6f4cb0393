//! Data access for the catalog file, the join-us backup file and the
//! remote profile/spreadsheet collaborators.

pub mod catalog;
pub mod firestore;
pub mod join_backup;
pub mod profile;
pub mod sheet;

use thiserror::Error;

pub use catalog::{load_catalog, BookRecord, CatalogSnapshot};
pub use firestore::FirestoreProfileStore;
pub use join_backup::JoinBackup;
pub use profile::{MemoryProfileStore, ProfileRecord, ProfileStore};
pub use sheet::{GoogleSheet, JoinSubmission, MemorySheet, SheetSink};

/// Errors raised by the data stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Collaborator not configured or unreachable
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Remote call failed
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Remote answered with a non-success status
    #[error("Remote returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Payload could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Local file error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tabular file error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook could not be opened or has no sheet
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),
}

impl From<calamine::Error> for StoreError {
    fn from(e: calamine::Error) -> Self {
        StoreError::Spreadsheet(e.to_string())
    }
}

/// Turn a non-success response into `StoreError::Status`.
pub(crate) async fn check_status(res: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}
