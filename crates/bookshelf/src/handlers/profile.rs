//! Member profile handlers.

use axum::{
    extract::State,
    response::Redirect,
    Extension, Form, Json,
};
use serde::{Deserialize, Serialize};

use super::form::required;
use super::view::PageView;
use crate::error::AppResult;
use crate::services::profile::{PROFILE_SAVE_FAILED, PROFILE_UPDATED};
use crate::services::ProfileUpdate;
use crate::session::{Notice, Session, Visitor};
use crate::state::AppState;
use crate::store::ProfileRecord;

const PROFILE_PATH: &str = "/profile";

#[derive(Debug, Serialize)]
pub struct ProfilePage {
    pub profile: ProfileRecord,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileForm {
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub dob: Option<String>,
    pub qualification: Option<String>,
}

/// `GET /profile`
pub async fn show(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    visitor: Visitor,
) -> Json<PageView<ProfilePage>> {
    let view = state.profiles.view(&session).await;
    if let Some(notice) = view.notice {
        visitor.flash(notice).await;
    }
    PageView::render(&visitor, "profile", ProfilePage { profile: view.profile }).await
}

/// Save the profile form.
///
/// `POST /profile` (form-encoded `name`, `mobile`, `dob`, `qualification`)
///
/// Blank fields are rejected with `422`. The record is stored under the
/// submitted name.
pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    visitor: Visitor,
    Form(form): Form<ProfileForm>,
) -> AppResult<Redirect> {
    let [name, mobile, dob, qualification] = required([
        ("name", form.name),
        ("mobile", form.mobile),
        ("dob", form.dob),
        ("qualification", form.qualification),
    ])?;

    let update = ProfileUpdate {
        name,
        mobile,
        dob,
        qualification,
    };
    let notice = match state.profiles.update(&session, update).await {
        Ok(_) => Notice::success(PROFILE_UPDATED),
        Err(e) => {
            tracing::error!(error = %e, user = %session.user, "Profile save failed");
            Notice::danger(PROFILE_SAVE_FAILED)
        }
    };
    visitor.flash(notice).await;

    Ok(Redirect::to(PROFILE_PATH))
}
