use anyhow::{Context, Result};

/// Default lifetime of all session keys in the store. Refreshed on every write.
const DEFAULT_SESSION_TTL_SECONDS: u64 = 3600;

/// Application configuration loaded from environment variables.
/// Panics at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub redis_url: String,
    pub anthropic_api_key: String,
    pub session_ttl_seconds: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            redis_url: require_env("REDIS_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            session_ttl_seconds: std::env::var("SESSION_TTL_SECONDS")
                .unwrap_or_else(|_| DEFAULT_SESSION_TTL_SECONDS.to_string())
                .parse::<u64>()
                .context("SESSION_TTL_SECONDS must be a positive integer")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
