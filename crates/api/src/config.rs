use std::time::Duration;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Externally visible base URL, used in signed URLs and invite links.
    pub public_base_url: String,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Lifetime of issued signed download/preview URLs (default: 600s).
    pub signed_url_ttl_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Object storage backend selection.
    pub storage: StorageConfig,
    /// SMTP settings for invite mail; `None` downgrades invites to a log line.
    pub smtp: Option<SmtpConfig>,
}

/// Which object-store backend to run against.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// Files under a local directory, served through the signed
    /// `/files/local` route.
    Local {
        root: String,
        signing_secret: String,
    },
    /// S3-compatible bucket with native presigned URLs.
    S3 { bucket: String },
}

/// SMTP relay settings for outgoing invite mail.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    /// Sender address, e.g. `"Portal <noreply@example.com>"`.
    pub from: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `PUBLIC_BASE_URL`      | `http://localhost:3000`    |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SIGNED_URL_TTL_SECS`  | `600`                      |
    /// | `STORAGE_BACKEND`      | `local`                    |
    /// | `STORAGE_ROOT`         | `./storage`                |
    /// | `FILE_SIGNING_SECRET`  | -- (required for `local`)  |
    /// | `S3_BUCKET`            | -- (required for `s3`)     |
    /// | `SMTP_HOST`/`SMTP_USERNAME`/`SMTP_PASSWORD`/`SMTP_FROM` | unset |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into());

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let signed_url_ttl_secs: u64 = std::env::var("SIGNED_URL_TTL_SECS")
            .unwrap_or_else(|_| "600".into())
            .parse()
            .expect("SIGNED_URL_TTL_SECS must be a valid u64");

        let storage = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".into())
            .as_str()
        {
            "s3" => StorageConfig::S3 {
                bucket: std::env::var("S3_BUCKET")
                    .expect("S3_BUCKET must be set when STORAGE_BACKEND=s3"),
            },
            "local" => StorageConfig::Local {
                root: std::env::var("STORAGE_ROOT").unwrap_or_else(|_| "./storage".into()),
                signing_secret: std::env::var("FILE_SIGNING_SECRET")
                    .expect("FILE_SIGNING_SECRET must be set when STORAGE_BACKEND=local"),
            },
            other => panic!("Unknown STORAGE_BACKEND '{other}' (expected 'local' or 's3')"),
        };

        let smtp = match std::env::var("SMTP_HOST") {
            Ok(smtp_host) => Some(SmtpConfig {
                host: smtp_host,
                username: std::env::var("SMTP_USERNAME")
                    .expect("SMTP_USERNAME must be set when SMTP_HOST is set"),
                password: std::env::var("SMTP_PASSWORD")
                    .expect("SMTP_PASSWORD must be set when SMTP_HOST is set"),
                from: std::env::var("SMTP_FROM")
                    .expect("SMTP_FROM must be set when SMTP_HOST is set"),
            }),
            Err(_) => None,
        };

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            public_base_url,
            cors_origins,
            request_timeout_secs,
            signed_url_ttl_secs,
            jwt,
            storage,
            smtp,
        }
    }

    /// Signed-URL lifetime as a [`Duration`].
    pub fn signed_url_ttl(&self) -> Duration {
        Duration::from_secs(self.signed_url_ttl_secs)
    }
}
