use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, Context, Result};
use chrono::Duration;
use jsonwebtoken::Algorithm;

use crate::core::DEFAULT_TOKEN_TTL_MINUTES;

const MIN_SECRET_BYTES: usize = 32;
const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

/// Credentials for the account created on first start.
#[derive(Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

/// Process-wide settings, fixed at startup.
#[derive(Clone)]
pub struct Config {
    pub secret: String,
    pub algorithm: Algorithm,
    pub token_ttl: Duration,
    pub bcrypt_cost: u32,
    pub port: u16,
    pub log_level: String,
    pub admin: Option<AdminSeed>,
}

impl Config {
    /// Reads `.env` (if any) and then the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("SECRET environment variable must be set"))?;

        let algorithm = match lookup("JWT_ALGORITHM") {
            Some(value) => parse_algorithm(&value)?,
            None => Algorithm::HS256,
        };

        let ttl_minutes: i64 = parse_or("TOKEN_TTL_MINUTES", &lookup, DEFAULT_TOKEN_TTL_MINUTES)?;
        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&ttl_minutes) {
            bail!(
                "TOKEN_TTL_MINUTES must be between 1 and {}, got {}",
                MAX_TOKEN_TTL_MINUTES,
                ttl_minutes
            );
        }
        let token_ttl = Duration::try_minutes(ttl_minutes)
            .with_context(|| format!("TOKEN_TTL_MINUTES out of range: {}", ttl_minutes))?;

        let bcrypt_cost: u32 = parse_or("BCRYPT_COST", &lookup, bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            bail!("BCRYPT_COST must be between 4 and 31, got {}", bcrypt_cost);
        }

        let port: u16 = parse_or("PORT", &lookup, 3000)?;
        let log_level = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());

        let admin = match (lookup("AUTHLY_ADMIN_EMAIL"), lookup("AUTHLY_ADMIN_PASS")) {
            (Some(email), Some(password)) => Some(AdminSeed { email, password }),
            (None, None) => None,
            _ => bail!("AUTHLY_ADMIN_EMAIL and AUTHLY_ADMIN_PASS must be set together"),
        };

        Ok(Self {
            secret,
            algorithm,
            token_ttl,
            bcrypt_cost,
            port,
            log_level,
            admin,
        })
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", key, value)),
        None => Ok(default),
    }
}

fn parse_algorithm(value: &str) -> Result<Algorithm> {
    let algorithm = Algorithm::from_str(value.trim())
        .map_err(|e| anyhow!("Invalid JWT_ALGORITHM {:?}: {}", value, e))?;
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => bail!("JWT_ALGORITHM must be HS256, HS384 or HS512, got {:?}", other),
    }
}

impl Config {
    pub fn has_weak_secret(&self) -> bool {
        self.secret.len() < MIN_SECRET_BYTES
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("secret", &"***")
            .field("algorithm", &self.algorithm)
            .field("token_ttl_minutes", &self.token_ttl.num_minutes())
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("admin", &self.admin.as_ref().map(|a| a.email.as_str()))
            .finish()
    }
}
