//! Session cookie attributes and the signing secret.

use std::time::Duration;

use rand::RngCore;

use crate::config::{load_secret, AppConfig, SecretSource};

/// Cookie and signing settings for visitor sessions.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub cookie_path: String,
    pub cookie_secure: bool,
    pub secret_key: String,
    /// Signed-in visitors idle longer than this are forgotten
    pub idle_timeout: Duration,
    /// Anonymous visitors' unread notices are dropped after this
    pub notice_ttl: Duration,
    /// How often the store is swept
    pub prune_every: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "bookshelf_session".to_owned(),
            cookie_path: "/".to_owned(),
            cookie_secure: false,
            secret_key: String::new(),
            idle_timeout: Duration::from_secs(24 * 60 * 60),
            notice_ttl: Duration::from_secs(15 * 60),
            prune_every: Duration::from_secs(60),
        }
    }
}

impl SessionConfig {
    /// Resolve the signing secret from the environment or its file.
    ///
    /// Without either, a random secret is generated; sessions then do not
    /// survive a restart.
    pub fn from_app_config(config: &AppConfig) -> std::io::Result<Self> {
        let secret_key = match load_secret(config.session_secret.as_deref(), &config.session_secret_file)? {
            Some((secret, source)) => {
                tracing::info!(from_env = source == SecretSource::Environment, "Session secret loaded");
                secret
            }
            None => {
                tracing::warn!("No session secret configured, generating an ephemeral one");
                random_secret()
            }
        };

        Ok(Self {
            cookie_secure: config.cookie_secure,
            secret_key,
            idle_timeout: Duration::from_secs(config.session_idle_secs),
            notice_ttl: Duration::from_secs(config.notice_ttl_secs),
            ..Self::default()
        })
    }

    /// `Set-Cookie` value for a signed session id.
    pub fn cookie_header(&self, signed_id: &str) -> String {
        let mut cookie = format!(
            "{}={}; Path={}; HttpOnly; SameSite=Lax",
            self.cookie_name, signed_id, self.cookie_path
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

fn random_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
