use std::env;

const LOCAL_JWT_SECRET: &str = "super-secure-test-secret-value-local";
const DEFAULT_ADDR: &str = "0.0.0.0:3000";

/// AppConfig
///
/// Immutable application configuration, loaded once at startup and shared
/// with handlers through `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Runtime environment marker. Controls the dev session bypass and log format.
    pub env: Env,
    /// Postgres connection string. `None` (local only) selects the in-memory store.
    pub db_url: Option<String>,
    /// Secret used to validate session JWTs.
    pub jwt_secret: String,
    /// Address the HTTP server binds to.
    pub bind_addr: String,
}

/// Env
///
/// Runtime context: local development or hardened production.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    MissingInProduction(&'static str),
}

impl Default for AppConfig {
    /// Test-friendly configuration that needs no environment variables.
    fn default() -> Self {
        Self {
            env: Env::Local,
            db_url: None,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            bind_addr: DEFAULT_ADDR.to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads configuration from the environment. Production refuses to start
    /// without `DATABASE_URL` and `JWT_SECRET`; local mode falls back to the
    /// in-memory store and a well-known development secret.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let db_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());
        let jwt_secret = env::var("JWT_SECRET").ok().filter(|secret| !secret.is_empty());

        let (db_url, jwt_secret) = match env {
            Env::Production => (
                Some(db_url.ok_or(ConfigError::MissingInProduction("DATABASE_URL"))?),
                jwt_secret.ok_or(ConfigError::MissingInProduction("JWT_SECRET"))?,
            ),
            Env::Local => (
                db_url,
                jwt_secret.unwrap_or_else(|| LOCAL_JWT_SECRET.to_string()),
            ),
        };

        Ok(Self {
            env,
            db_url,
            jwt_secret,
            bind_addr: env::var("APP_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string()),
        })
    }
}
