//! Route guards.
//!
//! [`authorize`] decides; [`enforce`] applies the decision as a per-route
//! middleware so guarded handlers only run for allowed visitors.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::AdminAllowList;
use crate::session::{Notice, Session, Visitor};

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

pub const LOGIN_REQUIRED: &str = "Please login to use this feature.";
pub const ADMIN_REQUIRED: &str = "You are not authorized to view the admin panel.";

/// What a route demands from the visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Policy {
    /// Any signed-in visitor; `notice` is shown when redirected to login.
    Session { notice: &'static str },
    /// A signed-in visitor whose user is on the admin allow-list.
    Admin,
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allowed(Session),
    RedirectTo { path: &'static str, notice: Notice },
}

/// Check `session` against `policy`.
pub fn authorize(policy: &Policy, session: Option<Session>, allow_list: &AdminAllowList) -> Access {
    let Some(session) = session else {
        let message = match policy {
            Policy::Session { notice } => *notice,
            Policy::Admin => LOGIN_REQUIRED,
        };
        return Access::RedirectTo {
            path: LOGIN_PATH,
            notice: Notice::warning(message),
        };
    };

    match policy {
        Policy::Session { .. } => Access::Allowed(session),
        Policy::Admin if allow_list.contains(&session.user) => Access::Allowed(session),
        Policy::Admin => Access::RedirectTo {
            path: HOME_PATH,
            notice: Notice::warning(ADMIN_REQUIRED),
        },
    }
}

/// A policy bound to the allow-list, used as middleware state.
#[derive(Clone)]
pub struct Gate {
    policy: Policy,
    allow_list: Arc<AdminAllowList>,
}

impl Gate {
    pub fn session(allow_list: Arc<AdminAllowList>, notice: &'static str) -> Self {
        Self {
            policy: Policy::Session { notice },
            allow_list,
        }
    }

    pub fn admin(allow_list: Arc<AdminAllowList>) -> Self {
        Self {
            policy: Policy::Admin,
            allow_list,
        }
    }
}

/// Middleware applying a [`Gate`].
///
/// Allowed requests get the [`Session`] in their extensions; everything else
/// is redirected with a warning notice queued for the visitor.
pub async fn enforce(
    State(gate): State<Gate>,
    visitor: Visitor,
    mut request: Request,
    next: Next,
) -> Response {
    match authorize(&gate.policy, visitor.session().await, &gate.allow_list) {
        Access::Allowed(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Access::RedirectTo { path, notice } => {
            tracing::info!(
                uri = %request.uri(),
                redirect = path,
                "Guard redirected visitor"
            );
            visitor.flash(notice).await;
            Redirect::to(path).into_response()
        }
    }
}
