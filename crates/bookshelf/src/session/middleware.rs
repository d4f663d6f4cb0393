//! Session middleware and the [`Visitor`] extractor.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::COOKIE, header::SET_COOKIE, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tokio::task::JoinHandle;

use super::{sign_session_id, verify_signed_cookie, SessionConfig, SessionStore, Visitor};
use crate::error::AppError;

/// State for [`session_layer`].
#[derive(Clone)]
pub struct SessionManager {
    pub store: SessionStore,
    pub config: Arc<SessionConfig>,
}

impl SessionManager {
    /// Append a signed cookie naming `visitor` to the response.
    pub fn set_cookie(&self, response: &mut Response, visitor: &Visitor) {
        let signed = sign_session_id(visitor.id(), &self.config.secret_key);
        match HeaderValue::from_str(&self.config.cookie_header(&signed)) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "Failed to encode session cookie"),
        }
    }

    /// Sweep idle visitors from the store every `prune_every`.
    pub fn spawn_pruner(&self) -> JoinHandle<()> {
        let store = self.store.clone();
        let config = self.config.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.prune_every);
            loop {
                ticker.tick().await;
                let removed = store.prune_idle(config.idle_timeout, config.notice_ttl).await;
                if removed > 0 {
                    let remaining = store.len().await;
                    tracing::debug!(removed, remaining, "Pruned idle visitors");
                }
            }
        })
    }
}

/// Middleware resolving the visitor behind the session cookie.
///
/// A missing or tampered cookie starts a fresh visitor and the response
/// carries a newly signed cookie, unless the handler already set one. The
/// [`Visitor`] is placed in the request extensions for handlers and guards.
pub async fn session_layer(
    State(manager): State<SessionManager>,
    mut request: Request,
    next: Next,
) -> Response {
    let known_id = extract_cookie(request.headers(), &manager.config.cookie_name)
        .and_then(|value| verify_signed_cookie(value, &manager.config.secret_key));

    let (visitor, issued) = match known_id {
        Some(id) => {
            let visitor = manager.store.visitor(id);
            visitor.touch().await;
            (visitor, false)
        }
        None => (manager.store.new_visitor(), true),
    };
    request.extensions_mut().insert(visitor.clone());

    let mut response = next.run(request).await;

    if issued && !sets_cookie(response.headers(), &manager.config.cookie_name) {
        manager.set_cookie(&mut response, &visitor);
    }

    response
}

fn sets_cookie(headers: &HeaderMap, name: &str) -> bool {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|cookie| cookie.split_once('='))
        .any(|(key, _)| key == name)
}

/// Find a cookie by name in the `Cookie` headers.
fn extract_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

impl<S> FromRequestParts<S> for Visitor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Visitor>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer is not installed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; bookshelf_session=abc.123; lang=en"),
        );
        assert_eq!(extract_cookie(&headers, "bookshelf_session"), Some("abc.123"));
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_extract_cookie_multiple_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(COOKIE, HeaderValue::from_static("bookshelf_session=xyz.9"));
        assert_eq!(extract_cookie(&headers, "bookshelf_session"), Some("xyz.9"));
    }

    #[test]
    fn test_sets_cookie_matches_name_only() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("theme=dark; Path=/"));
        assert!(!sets_cookie(&headers, "bookshelf_session"));

        headers.append(SET_COOKIE, HeaderValue::from_static("bookshelf_session=abc.1; Path=/"));
        assert!(sets_cookie(&headers, "bookshelf_session"));
    }

    #[tokio::test]
    async fn test_set_cookie_signs_visitor_id() {
        let manager = SessionManager {
            store: SessionStore::new(),
            config: Arc::new(SessionConfig {
                secret_key: "secret".to_string(),
                ..SessionConfig::default()
            }),
        };
        let visitor = manager.store.new_visitor();
        let mut response = Response::new(axum::body::Body::empty());
        manager.set_cookie(&mut response, &visitor);

        let header = response.headers()[SET_COOKIE].to_str().unwrap();
        let value = header
            .strip_prefix("bookshelf_session=")
            .and_then(|rest| rest.split(';').next())
            .unwrap();
        assert_eq!(verify_signed_cookie(value, "secret").as_deref(), Some(visitor.id()));
    }
}
