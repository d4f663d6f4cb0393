//! Configuration module for the Bookshelf server.
//!
//! Settings come from `BOOKSHELF_*` environment variables via `envy`;
//! secrets may also be read from local files.

mod app;
mod secrets;

pub use app::AppConfig;
pub use secrets::{load_secret, SecretSource};
