//! Per-visitor session state.
//!
//! Every visitor gets an opaque id carried in a signed cookie. The id keys
//! a [`VisitorState`] in the process-local [`SessionStore`], which holds the
//! signed-in [`Session`] (if any) and the notices waiting to be shown.

mod config;
mod cookie;
mod middleware;
mod store;

use serde::{Deserialize, Serialize};

pub use config::SessionConfig;
pub use cookie::{sign_session_id, verify_signed_cookie};
pub use middleware::{session_layer, SessionManager};
pub use store::{SessionStore, Visitor, VisitorState};

/// Identity of a signed-in visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Email, or the uid when the identity has no email
    pub user: String,
    /// Display name, or `user` when the identity has none
    pub name: String,
    pub uid: String,
}

impl Session {
    /// Build a session from verified identity claims.
    ///
    /// Returns `None` when neither an email nor a uid is available, so a
    /// session never exists with an empty `user`.
    pub fn from_claims(email: Option<&str>, name: Option<&str>, uid: Option<&str>) -> Option<Self> {
        let non_empty = |v: Option<&str>| v.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);

        let uid = non_empty(uid);
        let user = non_empty(email).or_else(|| uid.clone())?;
        let name = non_empty(name).unwrap_or_else(|| user.clone());

        Some(Self {
            user,
            name,
            uid: uid.unwrap_or_default(),
        })
    }

    /// Key used to look up this visitor's profile.
    pub fn profile_key(&self) -> &str {
        if self.name.is_empty() {
            &self.user
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Danger,
}

/// One-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Danger, message)
    }
}
