//! Application state for the bookshelf server.
//!
//! Every external collaborator is built once at startup. A collaborator that
//! cannot be built is logged and replaced by its fallback so the server still
//! starts: a verifier that rejects every token, an in-process profile store,
//! or no sheet at all.

use std::sync::Arc;

use serde::Serialize;

use crate::auth::{AdminAllowList, IdentityToolkitVerifier, IdentityVerifier, RejectingVerifier};
use crate::config::{load_secret, AppConfig};
use crate::google::GoogleAuth;
use crate::services::{JoinService, ProfileService, SearchService};
use crate::session::{SessionConfig, SessionManager, SessionStore};
use crate::store::{FirestoreProfileStore, GoogleSheet, JoinBackup, MemoryProfileStore, ProfileStore, SheetSink};

/// Which implementation backs each collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Backends {
    pub identity: &'static str,
    pub profiles: &'static str,
    pub sheet: &'static str,
}

/// External collaborators, built from configuration or supplied directly.
#[derive(Clone)]
pub struct Collaborators {
    pub identity: Arc<dyn IdentityVerifier>,
    pub profiles: Arc<dyn ProfileStore>,
    pub sheet: Option<Arc<dyn SheetSink>>,
    pub backends: Backends,
}

impl Collaborators {
    /// Fallbacks only: reject-all verifier, in-memory profiles, no sheet.
    pub fn offline() -> Self {
        Self {
            identity: Arc::new(RejectingVerifier),
            profiles: Arc::new(MemoryProfileStore::new()),
            sheet: None,
            backends: Backends {
                identity: "disabled",
                profiles: "memory",
                sheet: "disabled",
            },
        }
    }

    /// Build the Google-backed collaborators, falling back where needed.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut collaborators = Self::offline();

        match firebase_auth(config) {
            Some(auth) => {
                match IdentityToolkitVerifier::new(auth.clone()) {
                    Ok(verifier) => {
                        collaborators.identity = Arc::new(verifier);
                        collaborators.backends.identity = "identitytoolkit";
                    }
                    Err(e) => tracing::warn!(error = %e, "Identity verifier unavailable, logins will be rejected"),
                }
                match FirestoreProfileStore::new(auth, &config.profile_collection) {
                    Ok(store) => {
                        collaborators.profiles = Arc::new(store);
                        collaborators.backends.profiles = "firestore";
                    }
                    Err(e) => tracing::warn!(error = %e, "Firestore unavailable, profiles kept in memory"),
                }
            }
            None => tracing::warn!("Firebase credentials not available, logins will be rejected and profiles kept in memory"),
        }

        match sheet(config) {
            Some(sheet) => {
                collaborators.sheet = Some(Arc::new(sheet));
                collaborators.backends.sheet = "google-sheets";
            }
            None => tracing::warn!("Spreadsheet not configured, join submissions are stored locally only"),
        }

        collaborators
    }
}

fn service_account(inline: Option<&str>, file: &str, purpose: &str) -> Option<GoogleAuth> {
    let key = match load_secret(inline, file) {
        Ok(Some((key, source))) => {
            tracing::debug!(purpose, ?source, "Service account key found");
            key
        }
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(error = %e, file, purpose, "Failed to read service account key");
            return None;
        }
    };

    GoogleAuth::from_json(&key)
        .map_err(|e| tracing::warn!(error = %e, purpose, "Invalid service account key"))
        .ok()
}

fn firebase_auth(config: &AppConfig) -> Option<GoogleAuth> {
    service_account(
        config.firebase_credentials.as_deref(),
        &config.firebase_credentials_file,
        "firebase",
    )
}

fn sheet(config: &AppConfig) -> Option<GoogleSheet> {
    let spreadsheet_id = config.spreadsheet_id.as_deref().filter(|id| !id.is_empty())?;
    let auth = service_account(
        config.sheets_credentials.as_deref(),
        &config.sheets_credentials_file,
        "sheets",
    )?;
    Some(GoogleSheet::new(auth, spreadsheet_id, config.sheet_range.as_str()))
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub identity: Arc<dyn IdentityVerifier>,
    pub search: SearchService,
    pub profiles: ProfileService,
    pub join: JoinService,
    pub sessions: SessionManager,
    pub admins: Arc<AdminAllowList>,
    pub backends: Backends,

    /// Server start time for uptime calculation
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: AppConfig, session_config: SessionConfig, collaborators: Collaborators) -> Self {
        let admins = Arc::new(config.admin_allow_list());
        if admins.is_empty() {
            tracing::warn!("Admin allow-list is empty, the admin panel is unreachable");
        }

        Self {
            identity: collaborators.identity,
            search: SearchService::new(&config.catalog_path),
            profiles: ProfileService::new(collaborators.profiles),
            join: JoinService::new(JoinBackup::new(&config.join_backup_path), collaborators.sheet),
            sessions: SessionManager {
                store: SessionStore::new(),
                config: Arc::new(session_config),
            },
            admins,
            backends: collaborators.backends,
            config: Arc::new(config),
            start_time: std::time::Instant::now(),
        }
    }

    /// Build everything from configuration.
    pub fn from_config(config: AppConfig) -> std::io::Result<Self> {
        let session_config = SessionConfig::from_app_config(&config)?;
        let collaborators = Collaborators::from_config(&config);
        Ok(Self::new(config, session_config, collaborators))
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
