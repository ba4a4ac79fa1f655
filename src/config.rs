use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid SUPABASE_URL format. Expected: https://PROJECT.supabase.co, got {0}")]
    SupabaseUrl(String),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime settings, read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    /// `<ref>` in `https://<ref>.supabase.co`.
    pub supabase_project_ref: String,
    pub supabase_anon_key: String,
    pub port: u16,
    pub run_migrations: bool,
    pub jwks_cache_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let database_url = required("DATABASE_URL")?;
        let supabase_url = required("SUPABASE_URL")?;
        let supabase_anon_key = required("SUPABASE_ANON_KEY")?;

        let supabase_project_ref = project_ref(&supabase_url)
            .ok_or_else(|| ConfigError::SupabaseUrl(supabase_url.clone()))?
            .to_string();

        let port = parse_or("PORT", lookup("PORT"), 8080)?;
        let run_migrations = parse_or("RUN_MIGRATIONS", lookup("RUN_MIGRATIONS"), true)?;
        let ttl_secs = parse_or("JWKS_CACHE_TTL_SECS", lookup("JWKS_CACHE_TTL_SECS"), 3600)?;

        Ok(Self {
            database_url,
            supabase_project_ref,
            supabase_anon_key,
            port,
            run_migrations,
            jwks_cache_ttl: Duration::from_secs(ttl_secs),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn project_ref(supabase_url: &str) -> Option<&str> {
    supabase_url
        .trim_end_matches('/')
        .strip_prefix("https://")
        .and_then(|s| s.strip_suffix(".supabase.co"))
        .filter(|s| !s.is_empty())
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
