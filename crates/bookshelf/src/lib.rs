//! Bookshelf Library
//!
//! This crate provides the bookshelf web server:
//!
//! - **Catalog Search**: Substring search and paging over the book catalog file
//! - **Sign-in**: Identity tokens from the external provider exchanged for a session
//! - **Profiles**: Member profiles kept in the document store
//! - **Join Us**: Submissions written to a local backup and a remote sheet
//! - **Admin Panel**: Read-only listing for allow-listed accounts
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from environment variables
//! - [`session`]: Signed session cookies and per-visitor state
//! - [`auth`]: Identity verification and route guards
//! - [`store`]: Catalog file, join backup and remote stores
//! - [`services`]: Search, profile and join logic
//! - [`handlers`]: HTTP route handlers
//! - [`routes`]: Router assembly
//! - [`state`]: Shared application state
//!
//! ## Example
//!
//! ```ignore
//! use bookshelf::{config::AppConfig, routes::build_router, state::AppState};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::from_env()?;
//!     let addr = config.bind_address();
//!     let app = build_router(AppState::from_config(config)?);
//!     let listener = tokio::net::TcpListener::bind(addr).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod google;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
pub mod store;

pub use error::{AppError, AppResult};
