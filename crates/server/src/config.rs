use std::env;
use std::path::PathBuf;

use anyhow::Context;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub secret_key: String,
    pub gemini_api_key: String,
    pub service_account_path: PathBuf,
    pub sheet_name: String,
    pub bind_addr: String,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        Ok(Config {
            database_url: var_or("DATABASE_URL", "sqlite:mabot.db"),
            secret_key: env::var("SECRET_KEY").context("SECRET_KEY must be set")?,
            gemini_api_key: env::var("GEMINI_API_KEY").context("GEMINI_API_KEY must be set")?,
            service_account_path: PathBuf::from(var_or(
                "GOOGLE_SERVICE_ACCOUNT",
                "service_account.json",
            )),
            sheet_name: var_or("SHEET_NAME", "transactions"),
            bind_addr: var_or("BIND_ADDR", "127.0.0.1:8080"),
        })
    }
}
