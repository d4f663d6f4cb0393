//! Google service-account authentication shared by the identity, profile
//! and spreadsheet clients.

use std::sync::Arc;

use gcp_auth::{CustomServiceAccount, TokenProvider};
use serde::Deserialize;

use crate::store::StoreError;

/// Scopes for Firestore and Identity Toolkit calls.
pub const FIREBASE_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/cloud-platform",
    "https://www.googleapis.com/auth/datastore",
    "https://www.googleapis.com/auth/identitytoolkit",
];

/// Scopes for appending to and reading spreadsheets.
pub const SHEETS_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];

#[derive(Debug, Deserialize)]
struct ServiceAccountProject {
    project_id: Option<String>,
}

/// Access-token source backed by a service-account key.
#[derive(Clone)]
pub struct GoogleAuth {
    provider: Arc<CustomServiceAccount>,
    project_id: Option<String>,
}

impl GoogleAuth {
    /// Build from the JSON key bundle downloaded from the cloud console.
    pub fn from_json(key_json: &str) -> Result<Self, StoreError> {
        let provider = CustomServiceAccount::from_json(key_json)
            .map_err(|e| StoreError::Unavailable(format!("invalid service account: {}", e)))?;
        let project: ServiceAccountProject = serde_json::from_str(key_json)
            .map_err(|e| StoreError::Decode(format!("service account json: {}", e)))?;

        Ok(Self {
            provider: Arc::new(provider),
            project_id: project.project_id,
        })
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    /// Get a bearer token for the given scopes.
    pub async fn token(&self, scopes: &[&str]) -> Result<String, StoreError> {
        let token = self
            .provider
            .token(scopes)
            .await
            .map_err(|e| StoreError::Unavailable(format!("failed to get access token: {}", e)))?;
        Ok(token.as_str().to_string())
    }
}
