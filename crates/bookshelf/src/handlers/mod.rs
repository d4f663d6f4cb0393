//! HTTP handlers for the bookshelf server.
//!
//! Pages are served as JSON view models (see [`view::PageView`]); form posts
//! answer with redirects and queue notices for the next page.

pub mod admin;
pub mod auth;
pub mod form;
pub mod health;
pub mod join;
pub mod pages;
pub mod profile;
pub mod search;
pub mod view;

pub use health::{api_health, health_check};
