// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup. The identity strategy and the
//! administrative gate are both decided here so handlers never branch on
//! the deployment environment themselves.

use std::env;
use std::str::FromStr;

const DEFAULT_WHOP_API_BASE: &str = "https://api.whop.com/api/v5";

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::Invalid(
                "APP_ENV",
                format!("unknown environment '{other}'"),
            )),
        }
    }
}

/// How callers are identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityMode {
    /// Verify the Whop-issued user token and look the user up via the Whop API.
    Whop,
    /// Trust the `x-test-user-id` header. Development only.
    TestHeader,
}

impl FromStr for IdentityMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "whop" => Ok(IdentityMode::Whop),
            "test-header" | "test_header" => Ok(IdentityMode::TestHeader),
            other => Err(ConfigError::Invalid(
                "IDENTITY_MODE",
                format!("unknown identity mode '{other}'"),
            )),
        }
    }
}

/// Whop credentials, required when `identity_mode` is `Whop`.
#[derive(Debug, Clone)]
pub struct WhopConfig {
    /// App ID, also the expected token audience
    pub app_id: String,
    /// Server-side API key
    pub api_key: String,
    /// ES256 public key (PEM) used to verify user tokens
    pub token_public_key_pem: String,
    /// Base URL of the Whop REST API
    pub api_base: String,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub identity_mode: IdentityMode,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Present only in `Whop` identity mode
    pub whop: Option<WhopConfig>,
    /// Shared secret for administrative endpoints; `None` disables them
    pub admin_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = match env::var("APP_ENV") {
            Ok(v) => v.parse()?,
            Err(_) => Environment::Production,
        };

        let identity_mode = match env::var("IDENTITY_MODE") {
            Ok(v) => v.parse()?,
            Err(_) if environment == Environment::Development => IdentityMode::TestHeader,
            Err(_) => IdentityMode::Whop,
        };

        if identity_mode == IdentityMode::TestHeader && environment == Environment::Production {
            return Err(ConfigError::Invalid(
                "IDENTITY_MODE",
                "test-header identity is not allowed in production".to_string(),
            ));
        }

        let whop = match identity_mode {
            IdentityMode::Whop => Some(WhopConfig {
                app_id: required("WHOP_APP_ID")?,
                api_key: required("WHOP_API_KEY")?,
                token_public_key_pem: required("WHOP_TOKEN_PUBLIC_KEY")?,
                api_base: env::var("WHOP_API_BASE")
                    .map(|v| v.trim().trim_end_matches('/').to_string())
                    .unwrap_or_else(|_| DEFAULT_WHOP_API_BASE.to_string()),
            }),
            IdentityMode::TestHeader => None,
        };

        Ok(Self {
            environment,
            identity_mode,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", "not a valid port".to_string()))?,
            whop,
            admin_token: env::var("ADMIN_TOKEN")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }

    /// Deterministic configuration for tests: development, test-header identity.
    pub fn test_default() -> Self {
        Self {
            environment: Environment::Development,
            identity_mode: IdentityMode::TestHeader,
            frontend_url: "http://localhost:3000".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            whop: None,
            admin_token: Some("test_admin_token".to_string()),
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
