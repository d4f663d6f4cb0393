//! Identity token verification.
//!
//! Tokens are issued to the browser by the identity provider's client SDK
//! and posted to `/sessionLogin`. Verification is delegated to the
//! provider; this module only maps its answer to [`DecodedIdentity`].

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::google::{GoogleAuth, FIREBASE_SCOPES};

const IDENTITY_TOOLKIT_BASE: &str = "https://identitytoolkit.googleapis.com/v1";

/// Claims of a verified identity token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedIdentity {
    pub uid: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Error, Debug)]
pub enum IdentityError {
    /// Token malformed, expired or revoked
    #[error("Token rejected: {0}")]
    Rejected(String),

    /// Provider could not be asked
    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<DecodedIdentity, IdentityError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: Option<String>,
    email: Option<String>,
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

/// Verifier backed by the Identity Toolkit `accounts:lookup` endpoint,
/// authenticated with the project's service account.
#[derive(Clone)]
pub struct IdentityToolkitVerifier {
    auth: GoogleAuth,
    http: reqwest::Client,
    lookup_url: String,
}

impl IdentityToolkitVerifier {
    pub fn new(auth: GoogleAuth) -> Result<Self, IdentityError> {
        let project = auth
            .project_id()
            .ok_or_else(|| IdentityError::Unavailable("service account has no project_id".to_string()))?;
        let lookup_url = format!("{}/projects/{}/accounts:lookup", IDENTITY_TOOLKIT_BASE, project);

        Ok(Self {
            auth,
            http: reqwest::Client::new(),
            lookup_url,
        })
    }
}

#[async_trait]
impl IdentityVerifier for IdentityToolkitVerifier {
    async fn verify(&self, id_token: &str) -> Result<DecodedIdentity, IdentityError> {
        let token = self
            .auth
            .token(FIREBASE_SCOPES)
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        let res = self
            .http
            .post(&self.lookup_url)
            .bearer_auth(token)
            .json(&json!({ "idToken": id_token }))
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        let status = res.status();
        if status.is_client_error() {
            let body = res.text().await.unwrap_or_default();
            return Err(IdentityError::Rejected(format!("{} - {}", status, body)));
        }
        if !status.is_success() {
            return Err(IdentityError::Unavailable(format!("lookup returned {}", status)));
        }

        let lookup: LookupResponse = res
            .json()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("parse lookup response: {}", e)))?;

        lookup
            .users
            .into_iter()
            .next()
            .map(|user| DecodedIdentity {
                uid: user.local_id,
                email: user.email,
                name: user.display_name,
            })
            .ok_or_else(|| IdentityError::Rejected("no account for token".to_string()))
    }
}

/// Verifier used when no identity credentials are configured.
#[derive(Debug, Clone, Default)]
pub struct RejectingVerifier;

#[async_trait]
impl IdentityVerifier for RejectingVerifier {
    async fn verify(&self, _id_token: &str) -> Result<DecodedIdentity, IdentityError> {
        Err(IdentityError::Unavailable(
            "identity provider is not configured".to_string(),
        ))
    }
}
