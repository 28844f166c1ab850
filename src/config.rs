//! Application configuration module
//!
//! Handles loading and validating configuration from environment variables.

use serde::Deserialize;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use thiserror::Error;

/// Default bearer token lifetime (24 hours)
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 86_400;

/// Longest accepted token lifetime (ten years)
pub const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 86_400;

#[derive(Error, Debug)]
#[allow(dead_code)]
pub enum ConfigError {
    #[error("Failed to load environment variables: {0}")]
    EnvLoad(#[from] dotenvy::Error),

    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: Ipv4Addr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::new(0, 0, 0, 0),
            port: 3000,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3001".to_string()],
        }
    }
}

/// Token signing and password hashing configuration
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC signing secret, read once at startup
    pub jwt_secret: String,
    /// Fixed lifetime of every issued token
    pub token_ttl_secs: i64,
    /// bcrypt cost used when hashing seeded plaintext passwords
    pub bcrypt_cost: u32,
}

// Keep the secret out of logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// Where the user/role/menu snapshot comes from
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedConfig {
    /// `None` means the built-in default snapshot
    pub path: Option<PathBuf>,
}

/// Complete application settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub auth: AuthConfig,
    pub seed: SeedConfig,
}

impl Settings {
    /// Load settings from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore errors if file not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server = ServerConfig {
            host: lookup("HOST")
                .and_then(|h| h.parse().ok())
                .unwrap_or_else(|| ServerConfig::default().host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(|| ServerConfig::default().port),
        };

        let cors = CorsConfig {
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|| CorsConfig::default().allowed_origins),
        };

        let auth = Self::parse_auth(&lookup)?;

        let seed = SeedConfig {
            path: lookup("SEED_FILE")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        };

        Ok(Self {
            server,
            cors,
            auth,
            seed,
        })
    }

    /// The signing key is mandatory: a server without one cannot issue tokens
    fn parse_auth<F>(lookup: &F) -> Result<AuthConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingVar("JWT_SECRET".to_string()))?;

        let token_ttl_secs = match lookup("TOKEN_TTL_SECS") {
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|e| ConfigError::ParseError(format!("TOKEN_TTL_SECS: {}", e)))?,
            None => DEFAULT_TOKEN_TTL_SECS,
        };
        if token_ttl_secs <= 0 {
            return Err(ConfigError::InvalidValue(
                "TOKEN_TTL_SECS must be positive".to_string(),
            ));
        }
        if token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::InvalidValue(format!(
                "TOKEN_TTL_SECS must not exceed {}",
                MAX_TOKEN_TTL_SECS
            )));
        }

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|e| ConfigError::ParseError(format!("BCRYPT_COST: {}", e)))?,
            None => bcrypt::DEFAULT_COST,
        };

        Ok(AuthConfig {
            jwt_secret,
            token_ttl_secs,
            bcrypt_cost,
        })
    }
}
