//! Local CSV backup of join-us submissions.
//!
//! Each append reads the whole file, adds one row and rewrites it. Appends
//! from this process are serialized by a mutex; separate processes writing
//! the same file are not coordinated.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use super::sheet::{JoinSubmission, JOIN_HEADERS};
use super::StoreError;

#[derive(Clone)]
pub struct JoinBackup {
    path: PathBuf,
    writer: Arc<Mutex<()>>,
}

impl JoinBackup {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Existing rows; a missing file has none.
    pub async fn rows(&self) -> Result<Vec<JoinSubmission>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let rows = reader
            .deserialize::<JoinSubmission>()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Append one submission and return the new row count.
    pub async fn append(&self, submission: &JoinSubmission) -> Result<usize, StoreError> {
        let _guard = self.writer.lock().await;

        let mut rows = self.rows().await?;
        rows.push(submission.clone());

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(JOIN_HEADERS)?;
        for row in &rows {
            writer.write_record(row.to_row())?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| StoreError::Io(e.into_error()))?;

        let staging = self.path.with_extension("csv.tmp");
        tokio::fs::write(&staging, bytes).await?;
        tokio::fs::rename(&staging, &self.path).await?;

        tracing::debug!(path = %self.path.display(), rows = rows.len(), "Join backup rewritten");
        Ok(rows.len())
    }
}
