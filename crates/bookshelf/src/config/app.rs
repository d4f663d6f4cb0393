//! Application configuration for the Bookshelf server.

use serde::Deserialize;

use crate::auth::AdminAllowList;

/// Application configuration loaded from environment variables.
///
/// Environment variables are prefixed with `BOOKSHELF_`:
/// - `BOOKSHELF_HOST`: Server bind address (default: "0.0.0.0")
/// - `BOOKSHELF_PORT`: Server port (default: 5000)
/// - `BOOKSHELF_CATALOG_PATH`: Book catalog, a workbook or a CSV export (default: "books.xlsx")
/// - `BOOKSHELF_JOIN_BACKUP_PATH`: Local join-us backup (default: "join_data.csv")
/// - `BOOKSHELF_ADMIN_EMAILS`: Comma-separated admin allow-list
/// - `BOOKSHELF_SPREADSHEET_ID`: Remote join-us sheet (optional)
/// - `BOOKSHELF_SESSION_IDLE_SECS`: Signed-in visitors idle longer than this are forgotten (default: 86400)
/// - `BOOKSHELF_NOTICE_TTL_SECS`: Anonymous visitors' unread notices are kept this long (default: 900)
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Tabular book catalog, re-read on every search
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Local backup of join-us submissions
    #[serde(default = "default_join_backup_path")]
    pub join_backup_path: String,

    /// Admin emails, comma separated
    #[serde(default)]
    pub admin_emails: String,

    /// Session signing secret given inline
    #[serde(default)]
    pub session_secret: Option<String>,

    /// File holding the session signing secret
    #[serde(default = "default_session_secret_file")]
    pub session_secret_file: String,

    /// Mark the session cookie `Secure`
    #[serde(default)]
    pub cookie_secure: bool,

    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,

    #[serde(default = "default_notice_ttl_secs")]
    pub notice_ttl_secs: u64,

    /// Identity provider service account (JSON payload)
    #[serde(default)]
    pub firebase_credentials: Option<String>,

    #[serde(default = "default_firebase_credentials_file")]
    pub firebase_credentials_file: String,

    /// Spreadsheet service account (JSON payload)
    #[serde(default)]
    pub sheets_credentials: Option<String>,

    #[serde(default = "default_sheets_credentials_file")]
    pub sheets_credentials_file: String,

    /// Spreadsheet receiving join-us rows
    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    /// A1 range rows are appended to
    #[serde(default = "default_sheet_range")]
    pub sheet_range: String,

    /// Document collection holding profiles
    #[serde(default = "default_profile_collection")]
    pub profile_collection: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_catalog_path() -> String {
    "books.xlsx".to_string()
}

fn default_join_backup_path() -> String {
    "join_data.csv".to_string()
}

fn default_session_secret_file() -> String {
    "session_secret".to_string()
}

fn default_session_idle_secs() -> u64 {
    24 * 60 * 60
}

fn default_notice_ttl_secs() -> u64 {
    15 * 60
}

fn default_firebase_credentials_file() -> String {
    "firebase_key.json".to_string()
}

fn default_sheets_credentials_file() -> String {
    "gsheet_key.json".to_string()
}

fn default_sheet_range() -> String {
    "Sheet1".to_string()
}

fn default_profile_collection() -> String {
    "users".to_string()
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables are prefixed with `BOOKSHELF_`.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("BOOKSHELF_").from_env::<AppConfig>()
    }

    /// Get the server bind address as a string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn admin_allow_list(&self) -> AdminAllowList {
        AdminAllowList::parse(&self.admin_emails)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            catalog_path: default_catalog_path(),
            join_backup_path: default_join_backup_path(),
            admin_emails: String::new(),
            session_secret: None,
            session_secret_file: default_session_secret_file(),
            cookie_secure: false,
            session_idle_secs: default_session_idle_secs(),
            notice_ttl_secs: default_notice_ttl_secs(),
            firebase_credentials: None,
            firebase_credentials_file: default_firebase_credentials_file(),
            sheets_credentials: None,
            sheets_credentials_file: default_sheets_credentials_file(),
            spreadsheet_id: None,
            sheet_range: default_sheet_range(),
            profile_collection: default_profile_collection(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.catalog_path, "books.xlsx");
        assert!(!config.cookie_secure);
        assert_eq!(config.session_idle_secs, 86400);
        assert_eq!(config.notice_ttl_secs, 900);
        assert!(config.spreadsheet_id.is_none());
    }

    #[test]
    fn test_bind_address() {
        let config = AppConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
    }

    #[test]
    fn test_admin_allow_list_from_config() {
        let config = AppConfig {
            admin_emails: "root@example.com, ops@example.com".to_string(),
            ..AppConfig::default()
        };
        let allow_list = config.admin_allow_list();
        assert!(allow_list.contains("root@example.com"));
        assert!(allow_list.contains("ops@example.com"));
        assert!(!allow_list.contains("guest@example.com"));
    }
}
