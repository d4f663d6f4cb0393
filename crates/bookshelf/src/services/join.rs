//! Join-us submissions.
//!
//! A submission goes to the local backup file and, independently, to the
//! remote sheet. Neither write is rolled back when the other fails.

use std::sync::Arc;

use crate::session::Notice;
use crate::store::{JoinBackup, JoinSubmission, SheetSink, StoreError};

pub const JOIN_SAVED: &str = "Thank you for joining! Your information has been saved.";
pub const JOIN_FAILED: &str = "Your submission could not be saved. Please try again.";
pub const SHEET_WRITE_FAILED: &str = "Your submission was saved locally but could not be sent to the sheet.";
pub const SHEET_UNAVAILABLE: &str = "Submitted entries are unavailable.";

/// State of the remote write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteWrite {
    Appended,
    /// No sheet is configured
    Disabled,
    Failed(String),
}

/// What happened to one submission.
#[derive(Debug)]
pub struct JoinOutcome {
    /// Backup row count after the append
    pub local: Result<usize, StoreError>,
    pub remote: RemoteWrite,
}

impl JoinOutcome {
    pub fn saved(&self) -> bool {
        self.local.is_ok()
    }

    /// Notices to show the visitor, most important first.
    pub fn notices(&self) -> Vec<Notice> {
        if self.local.is_err() {
            return vec![Notice::danger(JOIN_FAILED)];
        }

        let mut notices = vec![Notice::success(JOIN_SAVED)];
        if self.remote != RemoteWrite::Appended {
            notices.push(Notice::warning(SHEET_WRITE_FAILED));
        }
        notices
    }
}

#[derive(Clone)]
pub struct JoinService {
    backup: JoinBackup,
    sheet: Option<Arc<dyn SheetSink>>,
}

impl JoinService {
    pub fn new(backup: JoinBackup, sheet: Option<Arc<dyn SheetSink>>) -> Self {
        Self { backup, sheet }
    }

    pub async fn submit(&self, submission: &JoinSubmission) -> JoinOutcome {
        let local = self.backup.append(submission).await;
        match &local {
            Ok(rows) => tracing::info!(rows, path = %self.backup.path().display(), "Join submission stored"),
            Err(e) => tracing::error!(error = %e, path = %self.backup.path().display(), "Join backup write failed"),
        }

        let remote = match &self.sheet {
            Some(sheet) => match sheet.append(submission).await {
                Ok(()) => RemoteWrite::Appended,
                Err(e) => {
                    tracing::warn!(error = %e, "Sheet append failed");
                    RemoteWrite::Failed(e.to_string())
                }
            },
            None => {
                tracing::warn!("Sheet not configured; submission kept locally only");
                RemoteWrite::Disabled
            }
        };

        JoinOutcome { local, remote }
    }

    /// Rows currently in the remote sheet.
    pub async fn sheet_rows(&self) -> Result<Vec<JoinSubmission>, StoreError> {
        match &self.sheet {
            Some(sheet) => sheet.rows().await,
            None => Err(StoreError::Unavailable("sheet not configured".to_string())),
        }
    }
}
