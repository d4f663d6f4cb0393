//! Sign-in, sign-out and the explore shortcut.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::guard::{HOME_PATH, LOGIN_PATH};
use crate::session::{Notice, Session, Visitor};
use crate::state::AppState;

pub const LOGGED_IN: &str = "Logged in successfully.";
pub const LOGGED_OUT: &str = "Logged out successfully.";
pub const EXPLORE_LOGIN: &str = "Please login to explore books.";

const INVALID_TOKEN: &str = "Invalid token";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLoginRequest {
    pub id_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionLoginResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

fn invalid_token() -> Response {
    let body = SessionLoginResponse {
        ok: false,
        error: Some(INVALID_TOKEN),
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

/// Exchange an identity token for a session.
///
/// `POST /sessionLogin`
///
/// # Request Body
///
/// ```json
/// { "idToken": "eyJhbGciOi..." }
/// ```
///
/// # Response
///
/// - `200 OK` with `{"ok": true}`. The visitor moves to a new session id
///   and the response carries its cookie; the old id holds nothing.
/// - `401 Unauthorized` with `{"ok": false, "error": "Invalid token"}` when
///   the body is malformed or the token does not verify. The visitor's
///   session is left as it was.
pub async fn session_login(State(state): State<AppState>, visitor: Visitor, body: Bytes) -> Response {
    let token = serde_json::from_slice::<SessionLoginRequest>(&body)
        .ok()
        .and_then(|request| request.id_token)
        .filter(|token| !token.is_empty());
    let Some(token) = token else {
        tracing::warn!("Session login without a token");
        return invalid_token();
    };

    let identity = match state.identity.verify(&token).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!(error = %e, "Token verify failed");
            return invalid_token();
        }
    };

    let Some(session) = Session::from_claims(
        identity.email.as_deref(),
        identity.name.as_deref(),
        identity.uid.as_deref(),
    ) else {
        tracing::warn!("Verified token carries neither email nor uid");
        return invalid_token();
    };

    tracing::info!(user = %session.user, "Visitor signed in");
    let visitor = visitor.rotate().await;
    visitor.sign_in(session).await;
    visitor.flash(Notice::success(LOGGED_IN)).await;

    let mut response = Json(SessionLoginResponse { ok: true, error: None }).into_response();
    state.sessions.set_cookie(&mut response, &visitor);
    response
}

/// `GET /logout`
pub async fn logout(visitor: Visitor) -> Redirect {
    if let Some(session) = visitor.session().await {
        tracing::info!(user = %session.user, "Visitor signed out");
    }
    visitor.clear().await;
    visitor.flash(Notice::danger(LOGGED_OUT)).await;
    Redirect::to(HOME_PATH)
}

/// `GET /explore`
pub async fn explore(visitor: Visitor) -> Redirect {
    if visitor.session().await.is_some() {
        return Redirect::to("/search");
    }
    visitor.flash(Notice::warning(EXPLORE_LOGIN)).await;
    Redirect::to(LOGIN_PATH)
}
