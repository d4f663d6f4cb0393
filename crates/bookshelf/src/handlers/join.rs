//! Join-us form handlers.

use axum::{
    extract::State,
    response::Redirect,
    Form, Json,
};
use serde::{Deserialize, Serialize};

use super::form::required;
use super::view::PageView;
use crate::auth::guard::HOME_PATH;
use crate::error::AppResult;
use crate::session::Visitor;
use crate::state::AppState;
use crate::store::sheet::JOIN_HEADERS;
use crate::store::JoinSubmission;

pub const JOIN_LOGIN: &str = "Please login to access Join Us form.";

const JOIN_PATH: &str = "/join";

#[derive(Debug, Serialize)]
pub struct JoinPage {
    pub title: &'static str,
    pub fields: [&'static str; 4],
}

#[derive(Debug, Default, Deserialize)]
pub struct JoinForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub city: Option<String>,
}

/// `GET /join`
pub async fn form(visitor: Visitor) -> Json<PageView<JoinPage>> {
    let page = JoinPage {
        title: "Join Us",
        fields: JOIN_HEADERS,
    };
    PageView::render(&visitor, "join", page).await
}

/// Record a join-us submission.
///
/// `POST /join` (form-encoded `name`, `email`, `mobile`, `city`)
///
/// Redirects home once the local backup has the row, with a warning when
/// the sheet could not take it. If the local write fails the visitor is sent
/// back to the form.
pub async fn submit(
    State(state): State<AppState>,
    visitor: Visitor,
    Form(form): Form<JoinForm>,
) -> AppResult<Redirect> {
    let [name, email, mobile, city] = required([
        ("name", form.name),
        ("email", form.email),
        ("mobile", form.mobile),
        ("city", form.city),
    ])?;

    let submission = JoinSubmission {
        name,
        email,
        mobile,
        city,
    };
    let outcome = state.join.submit(&submission).await;
    for notice in outcome.notices() {
        visitor.flash(notice).await;
    }

    if outcome.saved() {
        Ok(Redirect::to(HOME_PATH))
    } else {
        Ok(Redirect::to(JOIN_PATH))
    }
}
