//! Catalog search and pagination.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;

use crate::session::Notice;
use crate::store::{load_catalog, BookRecord, CatalogSnapshot};

/// Rows per result page.
pub const PER_PAGE: usize = 10;

pub const CATALOG_MISSING: &str = "Books database not found!";
pub const CATALOG_UNREADABLE: &str = "Books database could not be read!";

/// Normalized search input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: Option<String>,
    pub topic: Option<String>,
    /// 1-based
    pub page: usize,
}

impl SearchRequest {
    /// Blank strings count as absent; a missing, unparsable or zero page is 1.
    pub fn new(query: Option<&str>, topic: Option<&str>, page: Option<&str>) -> Self {
        let present = |v: Option<&str>| v.filter(|v| !v.is_empty()).map(str::to_string);
        let page = page
            .and_then(|p| p.trim().parse::<usize>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        Self {
            query: present(query),
            topic: present(topic),
            page,
        }
    }
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

/// One page of results plus the data needed to render filter controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchPage {
    pub results: Vec<BookRecord>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub query: String,
    pub topic: String,
    pub topics: Vec<String>,
}

fn contains_ci(value: Option<&String>, needle_lower: &str) -> bool {
    value.is_some_and(|v| v.to_lowercase().contains(needle_lower))
}

/// Filter, count and slice `rows`.
pub fn search_rows(rows: &[BookRecord], request: &SearchRequest) -> SearchPage {
    let needle = request.query.as_ref().map(|q| q.to_lowercase());

    let matching: Vec<&BookRecord> = rows
        .iter()
        .filter(|row| match needle.as_deref() {
            Some(q) => {
                contains_ci(row.title.as_ref(), q)
                    || contains_ci(row.author.as_ref(), q)
                    || contains_ci(row.script.as_ref(), q)
            }
            None => true,
        })
        .filter(|row| match request.topic.as_deref() {
            Some(topic) => row.topic.as_deref().map(str::trim) == Some(topic),
            None => true,
        })
        .collect();

    let total = matching.len();
    let start = request.page.saturating_sub(1).saturating_mul(PER_PAGE);
    let results = matching
        .into_iter()
        .skip(start)
        .take(PER_PAGE)
        .cloned()
        .collect();

    SearchPage {
        results,
        total,
        page: request.page,
        per_page: PER_PAGE,
        query: request.query.clone().unwrap_or_default(),
        topic: request.topic.clone().unwrap_or_default(),
        topics: distinct_topics(rows),
    }
}

/// Sorted distinct non-empty topics, trimmed the same way the topic filter
/// compares them.
pub fn distinct_topics(rows: &[BookRecord]) -> Vec<String> {
    rows.iter()
        .filter_map(|row| row.topic.as_deref())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Result of a search request, with a notice when the catalog was unusable.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub page: SearchPage,
    pub notice: Option<Notice>,
}

/// Searches the catalog file, reloading it on every call.
#[derive(Clone)]
pub struct SearchService {
    catalog_path: PathBuf,
}

impl SearchService {
    pub fn new(catalog_path: impl Into<PathBuf>) -> Self {
        Self {
            catalog_path: catalog_path.into(),
        }
    }

    pub async fn search(&self, request: &SearchRequest) -> SearchOutcome {
        match load_catalog(&self.catalog_path).await {
            Ok(CatalogSnapshot::Loaded(rows)) => SearchOutcome {
                page: search_rows(&rows, request),
                notice: None,
            },
            Ok(CatalogSnapshot::Absent) => {
                tracing::warn!(path = %self.catalog_path.display(), "Catalog file missing");
                SearchOutcome {
                    page: search_rows(&[], request),
                    notice: Some(Notice::warning(CATALOG_MISSING)),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, path = %self.catalog_path.display(), "Catalog file unreadable");
                SearchOutcome {
                    page: search_rows(&[], request),
                    notice: Some(Notice::warning(CATALOG_UNREADABLE)),
                }
            }
        }
    }
}
