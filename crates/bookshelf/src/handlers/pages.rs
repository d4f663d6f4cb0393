//! Static pages.

use axum::Json;

use super::view::{PageView, Titled};
use crate::session::Visitor;

/// `GET /`
pub async fn home(visitor: Visitor) -> Json<PageView<Titled>> {
    PageView::render(&visitor, "index", Titled { title: "Home" }).await
}

/// `GET /login`
///
/// The page hosts the identity provider's client-side sign-in, which posts
/// the resulting token to `/sessionLogin`.
pub async fn login(visitor: Visitor) -> Json<PageView<Titled>> {
    PageView::render(&visitor, "login", Titled { title: "Login" }).await
}

/// `GET /about`
pub async fn about(visitor: Visitor) -> Json<PageView<Titled>> {
    PageView::render(&visitor, "about", Titled { title: "About" }).await
}

/// `GET /team`
pub async fn team(visitor: Visitor) -> Json<PageView<Titled>> {
    PageView::render(&visitor, "team", Titled { title: "Our Team" }).await
}

/// `GET /contact`
pub async fn contact(visitor: Visitor) -> Json<PageView<Titled>> {
    PageView::render(&visitor, "contact", Titled { title: "Contact" }).await
}

/// `GET /supporters`
pub async fn supporters(visitor: Visitor) -> Json<PageView<Titled>> {
    PageView::render(&visitor, "supporters", Titled { title: "Supporters" }).await
}
