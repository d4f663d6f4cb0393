//! JSON page views.
//!
//! Every page is rendered as a view model: the view name, the signed-in
//! session (if any), the notices queued for the visitor, and the page's own
//! fields flattened alongside.

use axum::Json;
use serde::Serialize;

use crate::session::{Notice, Session, Visitor};

#[derive(Debug, Serialize)]
pub struct PageView<T> {
    /// Which page this is. Named `view` so page data may carry its own `page`
    pub view: &'static str,
    pub session: Option<Session>,
    pub notices: Vec<Notice>,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> PageView<T> {
    /// Build the view, draining the visitor's notices.
    pub async fn render(visitor: &Visitor, view: &'static str, data: T) -> Json<Self> {
        let session = visitor.session().await;
        let notices = visitor.take_notices().await;
        Json(Self {
            view,
            session,
            notices,
            data,
        })
    }
}

/// Page with nothing but a title.
#[derive(Debug, Serialize)]
pub struct Titled {
    pub title: &'static str,
}
