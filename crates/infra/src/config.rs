//! Process configuration, read from the environment once at startup.

use std::net::{Ipv4Addr, SocketAddr};

use thiserror::Error;

const DEV_SECRET: &str = "dev-secret";
const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:80,http://127.0.0.1:7000";
const DEFAULT_TOKEN_TTL_SECS: i64 = 60 * 60;
const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Clone)]
pub struct AppConfig {
    pub http_port: u16,
    /// `None` selects the in-memory directory.
    pub database_url: Option<String>,
    pub app_secret: String,
    pub cors_allowed_origins: Vec<String>,
    pub token_ttl_secs: i64,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("http_port", &self.http_port)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("app_secret", &"<redacted>")
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let app_secret = match get("APP_SECRET") {
            Some(secret) => secret,
            None if get("APP_ENV").as_deref() == Some("dev") => {
                tracing::warn!("APP_SECRET not set; using insecure dev default");
                DEV_SECRET.to_string()
            }
            None => return Err(ConfigError::Missing("APP_SECRET")),
        };

        let http_port = match get("HTTP_PORT") {
            Some(raw) => parse_port(&raw)?,
            None => DEFAULT_HTTP_PORT,
        };

        let cors_allowed_origins = parse_origins(
            get("CORS_ALLOWED_ORIGINS")
                .as_deref()
                .unwrap_or(DEFAULT_CORS_ORIGINS),
        );

        let token_ttl_secs = match get("TOKEN_TTL_SECS") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(secs) if (1..=MAX_TOKEN_TTL_SECS).contains(&secs) => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "TOKEN_TTL_SECS",
                        reason: format!(
                            "expected between 1 and {MAX_TOKEN_TTL_SECS} seconds, got '{raw}'"
                        ),
                    });
                }
            },
            None => DEFAULT_TOKEN_TTL_SECS,
        };

        Ok(Self {
            http_port,
            database_url: get("DATABASE_URL"),
            app_secret,
            cors_allowed_origins,
            token_ttl_secs,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.http_port))
    }
}

/// Accepts `8080` as well as the `:8080` listen-address form.
fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix(':').unwrap_or(trimmed);
    digits.parse::<u16>().map_err(|e| ConfigError::Invalid {
        name: "HTTP_PORT",
        reason: format!("'{raw}': {e}"),
    })
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
