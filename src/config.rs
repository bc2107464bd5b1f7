// src/config.rs
use std::env;

use tracing::info;

use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 3030;
pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    /// Public origin of the web front end, used to build the reset link.
    pub site_url: String,
}

impl Config {
    /// Reads configuration from the process environment. Call
    /// `dotenvy::dotenv()` first to pick up a local `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                key: "PORT",
                reason: e.to_string(),
            })?,
            None => {
                info!("PORT not set, using default: {DEFAULT_PORT}");
                DEFAULT_PORT
            }
        };

        let supabase_url = lookup("SUPABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        let supabase_anon_key = lookup("SUPABASE_ANON_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("SUPABASE_ANON_KEY"))?;

        let site_url = lookup("SITE_URL").unwrap_or_else(|| DEFAULT_SITE_URL.to_string());

        Ok(Self {
            port,
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            supabase_anon_key,
            site_url: site_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn reset_password_url(&self) -> String {
        format!("{}/auth/reset-password", self.site_url)
    }
}
