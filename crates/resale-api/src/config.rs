use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "a_very_secret_key_that_should_be_in_env_vars",
];

/// Runtime configuration, read from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub upload_dir: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let port: u16 = std::env::var("RESALE_PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .context("RESALE_PORT must be a port number")?;
        let token_ttl_minutes: i64 = std::env::var("RESALE_TOKEN_TTL_MINUTES")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .context("RESALE_TOKEN_TTL_MINUTES must be an integer")?;
        if token_ttl_minutes <= 0 {
            bail!("RESALE_TOKEN_TTL_MINUTES must be positive");
        }

        Ok(Self {
            host: std::env::var("RESALE_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            db_path: std::env::var("RESALE_DB_PATH")
                .unwrap_or_else(|_| "reselling.db".into())
                .into(),
            upload_dir: std::env::var("RESALE_UPLOAD_DIR")
                .unwrap_or_else(|_| "uploads".into())
                .into(),
            jwt_secret: std::env::var("RESALE_JWT_SECRET").unwrap_or_default(),
            token_ttl_minutes,
        })
    }

    /// The server refuses to start without a real signing secret.
    pub fn check_secret(&self) -> Result<()> {
        if self.jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&self.jwt_secret.as_str()) {
            bail!("RESALE_JWT_SECRET is unset or still a placeholder");
        }
        Ok(())
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.token_ttl_minutes)
    }
}
