//! Process configuration, resolved once at startup and passed explicitly.

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub token_secret: String,
    pub bind_addr: String,
}

impl Config {
    /// Read configuration from the environment. This is the only place that
    /// touches the environment; the result is immutable for the process
    /// lifetime.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let token_secret = std::env::var("TOKEN_SECRET").unwrap_or_else(|_| {
            tracing::warn!("TOKEN_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        Ok(Self {
            database_url,
            token_secret,
            bind_addr,
        })
    }
}
