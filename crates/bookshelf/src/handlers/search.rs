//! Catalog search handler.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use super::view::PageView;
use crate::services::{SearchPage, SearchRequest};
use crate::session::Visitor;
use crate::state::AppState;

pub const SEARCH_LOGIN: &str = "Please login to use search functionality!";

/// Raw query string. Values are kept as text so a bad `page` falls back to 1
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub topic: Option<String>,
    pub page: Option<String>,
}

/// Search the catalog.
///
/// `GET /search?q=gita&topic=Religion&page=2`
///
/// A missing or unreadable catalog renders an empty page with a warning.
pub async fn search(
    State(state): State<AppState>,
    visitor: Visitor,
    Query(params): Query<SearchParams>,
) -> Json<PageView<SearchPage>> {
    let request = SearchRequest::new(
        params.q.as_deref(),
        params.topic.as_deref(),
        params.page.as_deref(),
    );
    let outcome = state.search.search(&request).await;
    if let Some(notice) = outcome.notice {
        visitor.flash(notice).await;
    }

    tracing::debug!(
        query = ?request.query,
        topic = ?request.topic,
        page = request.page,
        total = outcome.page.total,
        "Search served"
    );
    PageView::render(&visitor, "search", outcome.page).await
}
