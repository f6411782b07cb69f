use anyhow::Context;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    /// Read the configuration from the environment. `DATABASE_URL` is
    /// required; host and port fall back to `127.0.0.1:3000`. A present
    /// but unparsable `APP_PORT` is an error rather than a silent default.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = match env::var("APP_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("APP_PORT is not a valid port: {raw}"))?,
            Err(_) => 3000,
        };
        Ok(Self {
            database_url,
            host,
            port,
        })
    }
}
