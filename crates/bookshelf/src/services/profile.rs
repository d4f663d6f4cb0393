//! Profile lookup and update.

use std::sync::Arc;

use crate::session::{Notice, Session};
use crate::store::{ProfileRecord, ProfileStore, StoreError};

pub const PROFILE_UPDATED: &str = "Profile updated successfully!";
pub const PROFILE_UNAVAILABLE: &str = "Profile could not be loaded.";
pub const PROFILE_SAVE_FAILED: &str = "Profile could not be saved. Please try again.";

/// Submitted profile fields. The email always comes from the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: String,
    pub mobile: String,
    pub dob: String,
    pub qualification: String,
}

/// A profile to render, with a notice when the store could not be read.
#[derive(Debug, Clone)]
pub struct ProfileView {
    pub profile: ProfileRecord,
    pub notice: Option<Notice>,
}

#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Record shown when nothing is stored for the session yet.
    pub fn blank_profile(session: &Session) -> ProfileRecord {
        ProfileRecord {
            name: session.name.clone(),
            email: session.user.clone(),
            ..ProfileRecord::default()
        }
    }

    /// Load the profile keyed by the session's name. Never writes.
    pub async fn view(&self, session: &Session) -> ProfileView {
        match self.store.get(session.profile_key()).await {
            Ok(Some(profile)) => ProfileView {
                profile,
                notice: None,
            },
            Ok(None) => ProfileView {
                profile: Self::blank_profile(session),
                notice: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, user = %session.user, "Profile lookup failed");
                ProfileView {
                    profile: Self::blank_profile(session),
                    notice: Some(Notice::warning(PROFILE_UNAVAILABLE)),
                }
            }
        }
    }

    /// Overwrite the record stored under the submitted name.
    ///
    /// The session keeps its old name, so a renamed profile is written under
    /// a new key and the next `view` still reads the previous one.
    pub async fn update(&self, session: &Session, update: ProfileUpdate) -> Result<ProfileRecord, StoreError> {
        let record = ProfileRecord {
            name: update.name,
            email: session.user.clone(),
            mobile: update.mobile,
            dob: update.dob,
            qualification: update.qualification,
        };
        self.store.put(&record).await?;

        tracing::info!(user = %session.user, profile = %record.name, "Profile saved");
        Ok(record)
    }

    pub async fn list(&self) -> Result<Vec<ProfileRecord>, StoreError> {
        self.store.list().await
    }
}
