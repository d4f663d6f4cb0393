//! Authentication and authorization.

pub mod guard;
pub mod identity;

use std::collections::BTreeSet;

pub use guard::{authorize, enforce, Access, Gate, Policy};
pub use identity::{DecodedIdentity, IdentityError, IdentityToolkitVerifier, IdentityVerifier, RejectingVerifier};

/// Emails allowed into the admin panel. Matching is exact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminAllowList {
    emails: BTreeSet<String>,
}

impl AdminAllowList {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            emails: emails.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a comma-separated list, ignoring blanks.
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split(',').map(str::trim).filter(|e| !e.is_empty()))
    }

    pub fn contains(&self, user: &str) -> bool {
        self.emails.contains(user)
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}
