use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Lifetime of email-verification codes, in minutes.
    pub email_code_ttl_minutes: i64,
    /// Lifetime of account-link codes, in minutes.
    pub link_code_ttl_minutes: i64,
    /// How long past expiry a code is kept before the sweep deletes it, in minutes.
    pub code_sweep_grace_minutes: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            email_code_ttl_minutes: minutes_var("EMAIL_CODE_TTL_MINUTES", 30)?,
            link_code_ttl_minutes: minutes_var("LINK_CODE_TTL_MINUTES", 15)?,
            code_sweep_grace_minutes: minutes_var("CODE_SWEEP_GRACE_MINUTES", 60)?,
        })
    }
}

fn minutes_var(name: &str, default: i64) -> Result<i64> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("{} must be a whole number of minutes", name)),
        Err(_) => Ok(default),
    }
}
