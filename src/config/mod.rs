use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub site: SiteConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Fixed navigation targets and the authenticated-area prefix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub protected_prefix: String,
    pub home_path: String,
    pub dashboard_path: String,
    pub sign_in_path: String,
    /// Directory served for static asset requests
    pub asset_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL URL; the in-memory store is used when absent
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub session_cookie: String,
    /// Require the session subject to match the user id named in the request
    pub enforce_caller_match: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Site overrides
        if let Ok(v) = env::var("SITE_PROTECTED_PREFIX") {
            self.site.protected_prefix = v;
        }
        if let Ok(v) = env::var("SITE_SIGN_IN_PATH") {
            self.site.sign_in_path = v;
        }
        if let Ok(v) = env::var("SITE_ASSET_DIR") {
            self.site.asset_dir = v;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Some(port) = env::var("GOALPOST_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_SESSION_COOKIE") {
            self.security.session_cookie = v;
        }
        if let Ok(v) = env::var("SECURITY_ENFORCE_CALLER_MATCH") {
            self.security.enforce_caller_match = v.parse().unwrap_or(self.security.enforce_caller_match);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            site: SiteConfig::default(),
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: "goalpost-development-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                session_cookie: "__session".to_string(),
                enforce_caller_match: false,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            site: SiteConfig::default(),
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_request_size_bytes: 512 * 1024,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                // Must come from JWT_SECRET outside development
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                session_cookie: "__session".to_string(),
                enforce_caller_match: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            site: SiteConfig::default(),
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: false,
                max_request_size_bytes: 256 * 1024,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                session_cookie: "__session".to_string(),
                enforce_caller_match: true,
            },
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            protected_prefix: "/application".to_string(),
            home_path: "/".to_string(),
            dashboard_path: "/application/dashboard".to_string(),
            sign_in_path: "/sign-in".to_string(),
            asset_dir: "public".to_string(),
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
