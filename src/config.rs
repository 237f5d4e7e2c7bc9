use std::env;
use std::str::FromStr;

use anyhow::{bail, Context};

use crate::calendar::YearWindow;

/// `DATABASE_URL` value selecting the in-memory store.
pub const MEMORY_DATABASE_URL: &str = "memory://";

/// Upper bound for `JWT_ACCESS_TTL_SECS` (one year).
pub const MAX_JWT_ACCESS_TTL_SECS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub cors_extra_origins: Vec<String>,

    pub jwt_secret: String,
    pub jwt_access_ttl_secs: i64,

    pub calendar_min_year: i32,
    pub calendar_max_year: i32,

    pub login_rate_limit_max: u32,
    pub login_rate_limit_window_secs: u64,

    pub admin: Option<AdminBootstrap>,
}

/// Account created at start-up when it does not exist yet.
#[derive(Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub password: String,
    pub full_name: String,
}

impl std::fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("username", &self.username)
            .field("full_name", &self.full_name)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_var("PORT", 8080)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            cors_extra_origins: env::var("CORS_EXTRA_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),

            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_access_ttl_secs: parse_var("JWT_ACCESS_TTL_SECS", 3600)?,

            calendar_min_year: parse_var("CALENDAR_MIN_YEAR", 2020)?,
            calendar_max_year: parse_var("CALENDAR_MAX_YEAR", 2030)?,

            login_rate_limit_max: parse_var("LOGIN_RATE_LIMIT_MAX", 5)?,
            login_rate_limit_window_secs: parse_var("LOGIN_RATE_LIMIT_WINDOW_SECS", 60)?,

            admin: match (env::var("ADMIN_USERNAME"), env::var("ADMIN_PASSWORD")) {
                (Ok(username), Ok(password)) if !username.is_empty() && !password.is_empty() => {
                    Some(AdminBootstrap {
                        full_name: env::var("ADMIN_FULL_NAME")
                            .unwrap_or_else(|_| "Administrator".into()),
                        username,
                        password,
                    })
                }
                _ => None,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Cross-field checks run once at start-up.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.calendar_min_year > self.calendar_max_year {
            bail!(
                "CALENDAR_MIN_YEAR ({}) must not exceed CALENDAR_MAX_YEAR ({})",
                self.calendar_min_year,
                self.calendar_max_year
            );
        }
        if !(1..=MAX_JWT_ACCESS_TTL_SECS).contains(&self.jwt_access_ttl_secs) {
            bail!(
                "JWT_ACCESS_TTL_SECS must be between 1 and {MAX_JWT_ACCESS_TTL_SECS}, got {}",
                self.jwt_access_ttl_secs
            );
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn year_window(&self) -> YearWindow {
        YearWindow {
            min: self.calendar_min_year,
            max: self.calendar_max_year,
        }
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_DATABASE_URL
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_config;

    #[test]
    fn test_defaults_pass_validation() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_ttl_must_be_positive_and_bounded() {
        let mut config = test_config();
        config.jwt_access_ttl_secs = 0;
        assert!(config.validate().is_err());

        config.jwt_access_ttl_secs = MAX_JWT_ACCESS_TTL_SECS + 1;
        assert!(config.validate().is_err());

        config.jwt_access_ttl_secs = i64::MAX;
        assert!(config.validate().is_err());

        config.jwt_access_ttl_secs = MAX_JWT_ACCESS_TTL_SECS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_year_window_is_rejected() {
        let mut config = test_config();
        config.calendar_min_year = 2031;
        assert!(config.validate().is_err());
    }
}
