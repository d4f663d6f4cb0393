//! Admin panel.

use axum::{extract::State, Json};
use serde::Serialize;

use super::view::PageView;
use crate::services::join::SHEET_UNAVAILABLE;
use crate::session::{Notice, Visitor};
use crate::state::AppState;
use crate::store::{JoinSubmission, ProfileRecord};

pub const PROFILES_UNAVAILABLE: &str = "Profiles are unavailable.";

#[derive(Debug, Serialize)]
pub struct AdminPage {
    pub profiles: Vec<ProfileRecord>,
    pub submissions: Vec<JoinSubmission>,
}

/// Every stored profile and every sheet row, read-only.
///
/// `GET /admin`
pub async fn panel(State(state): State<AppState>, visitor: Visitor) -> Json<PageView<AdminPage>> {
    let profiles = match state.profiles.list().await {
        Ok(profiles) => profiles,
        Err(e) => {
            tracing::warn!(error = %e, "Profile listing failed");
            visitor.flash(Notice::warning(PROFILES_UNAVAILABLE)).await;
            Vec::new()
        }
    };

    let submissions = match state.join.sheet_rows().await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(error = %e, "Sheet listing failed");
            visitor.flash(Notice::warning(SHEET_UNAVAILABLE)).await;
            Vec::new()
        }
    };

    tracing::debug!(
        profiles = profiles.len(),
        submissions = submissions.len(),
        "Admin panel served"
    );
    PageView::render(&visitor, "admin", AdminPage { profiles, submissions }).await
}
