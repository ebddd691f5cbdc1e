use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub security: SecurityConfig,
    pub identity: IdentityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL clients (and the archive engine's source fetch) can reach us on.
    pub public_base_url: String,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory of the hot tier; objects live at {root}/{uid}/{name}.
    pub hot_root: String,
    /// Root directory of the cold archive bucket.
    pub cold_root: String,
    /// Scratch directory for archive staging files.
    pub staging_dir: String,
    /// Logical bucket name, used when minting cold-tier URLs.
    pub cold_bucket: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    /// Emails allowed to self-provision the first administrator account.
    pub bootstrap_admin_emails: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Accounts fetched per page when listing; the lifecycle manager follows
    /// continuation tokens until the set is exhausted.
    pub list_page_size: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("PUBLIC_BASE_URL") {
            self.server.public_base_url = v;
        }
        if let Ok(v) = env::var("SERVER_ENABLE_CORS") {
            self.server.enable_cors = v.parse().unwrap_or(self.server.enable_cors);
        }
        if let Ok(v) = env::var("SERVER_CORS_ORIGINS") {
            self.server.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("SERVER_ENABLE_REQUEST_LOGGING") {
            self.server.enable_request_logging =
                v.parse().unwrap_or(self.server.enable_request_logging);
        }

        // Storage overrides
        if let Ok(v) = env::var("STORAGE_HOT_ROOT") {
            self.storage.hot_root = v;
        }
        if let Ok(v) = env::var("STORAGE_COLD_ROOT") {
            self.storage.cold_root = v;
        }
        if let Ok(v) = env::var("STORAGE_STAGING_DIR") {
            self.storage.staging_dir = v;
        }
        if let Ok(v) = env::var("STORAGE_COLD_BUCKET") {
            self.storage.cold_bucket = v;
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("BOOTSTRAP_ADMIN_EMAILS") {
            self.security.bootstrap_admin_emails = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Identity overrides
        if let Ok(v) = env::var("ACCOUNT_LIST_PAGE_SIZE") {
            self.identity.list_page_size = v.parse().unwrap_or(self.identity.list_page_size);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                public_base_url: "http://localhost:3000".to_string(),
                enable_cors: true,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
                enable_request_logging: true,
            },
            storage: StorageConfig {
                hot_root: "./data/hot".to_string(),
                cold_root: "./data/cold".to_string(),
                staging_dir: "./data/staging".to_string(),
                cold_bucket: "coldvault-archive-dev".to_string(),
            },
            security: SecurityConfig {
                jwt_secret: "dev-secret-do-not-use-in-production".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                bootstrap_admin_emails: vec![],
            },
            identity: IdentityConfig { list_page_size: 1000 },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                public_base_url: "https://staging.example.com".to_string(),
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                enable_request_logging: true,
            },
            storage: StorageConfig {
                hot_root: "/var/lib/coldvault/hot".to_string(),
                cold_root: "/var/lib/coldvault/cold".to_string(),
                staging_dir: "/var/lib/coldvault/staging".to_string(),
                cold_bucket: "coldvault-archive-staging".to_string(),
            },
            security: SecurityConfig {
                jwt_secret: String::new(), // must come from JWT_SECRET
                jwt_expiry_hours: 24,
                bootstrap_admin_emails: vec![],
            },
            identity: IdentityConfig { list_page_size: 1000 },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                public_base_url: "https://app.example.com".to_string(),
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                enable_request_logging: false,
            },
            storage: StorageConfig {
                hot_root: "/var/lib/coldvault/hot".to_string(),
                cold_root: "/var/lib/coldvault/cold".to_string(),
                staging_dir: "/var/lib/coldvault/staging".to_string(),
                cold_bucket: "coldvault-archive".to_string(),
            },
            security: SecurityConfig {
                jwt_secret: String::new(), // must come from JWT_SECRET
                jwt_expiry_hours: 4,
                bootstrap_admin_emails: vec![],
            },
            identity: IdentityConfig { list_page_size: 1000 },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
