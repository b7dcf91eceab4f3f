/// Configuration management for the API server
///
/// Configuration is loaded from environment variables (with `.env` support
/// in development) into a type-safe struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `AUTH_SECRET`: shared secret for identity token validation (required)
/// - `STORAGE_BASE_URL`: public root of the attachment blob store
///   (default: http://localhost:9000)
/// - `STORAGE_SIGNING_SECRET`: secret for signed attachment URLs
///   (defaults to `AUTH_SECRET`)
/// - `STORAGE_URL_TTL_SECONDS`: lifetime of signed URLs (default: 900)
/// - `RUST_LOG`: log level (default: info)
use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Attachment storage configuration
    pub storage: StorageConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret with the identity provider
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,
}

/// Attachment storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Public root URL of the blob store
    pub base_url: String,

    /// Secret for signing upload/download URLs
    pub signing_secret: String,

    /// Lifetime of signed URLs in seconds
    pub url_ttl_seconds: i64,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does
    /// not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let auth_secret = env::var("AUTH_SECRET")
            .map_err(|_| anyhow::anyhow!("AUTH_SECRET environment variable is required"))?;

        if auth_secret.len() < 32 {
            anyhow::bail!("AUTH_SECRET must be at least 32 characters long");
        }

        let storage_base_url =
            env::var("STORAGE_BASE_URL").unwrap_or_else(|_| "http://localhost:9000".to_string());
        let storage_signing_secret =
            env::var("STORAGE_SIGNING_SECRET").unwrap_or_else(|_| auth_secret.clone());
        let storage_url_ttl_seconds = env::var("STORAGE_URL_TTL_SECONDS")
            .unwrap_or_else(|_| "900".to_string())
            .parse::<i64>()?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            auth: AuthConfig {
                secret: auth_secret,
            },
            storage: StorageConfig {
                base_url: storage_base_url,
                signing_secret: storage_signing_secret,
                url_ttl_seconds: storage_url_ttl_seconds,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            },
            storage: StorageConfig {
                base_url: "http://localhost:9000".to_string(),
                signing_secret: "test-secret-key-at-least-32-bytes-long".to_string(),
                url_ttl_seconds: 900,
            },
        };

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }
}
