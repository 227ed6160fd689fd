use std::env;

use alfra_common::{helpers::env_or_default, Secret};
use chrono::{FixedOffset, Offset, Utc};
use fudo_tools::{FudoConfig, MAX_PAGE_SIZE};
use log::*;

use crate::errors::ServerError;

const DEFAULT_ALFRA_HOST: &str = "127.0.0.1";
const DEFAULT_ALFRA_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/alfra.db";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 25;
/// Buenos Aires. Argentina does not observe daylight saving time.
const DEFAULT_UTC_OFFSET_HOURS: i32 = -3;
const DEFAULT_FUDO_PAGE_SIZE: usize = 50;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub auth: AuthConfig,
    /// The restaurant's offset from UTC. Calendar days are interpreted at this offset.
    pub utc_offset: FixedOffset,
    pub fudo: FudoConfig,
    /// How many of the most recent sales a mirror run pulls from Fudo.
    pub fudo_page_size: usize,
    /// Fudo must send this value in the `secret` query parameter of webhook calls.
    pub webhook_secret: Secret<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_ALFRA_HOST.to_string(),
            port: DEFAULT_ALFRA_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            auth: AuthConfig::default(),
            utc_offset: default_utc_offset(),
            fudo: FudoConfig::default(),
            fudo_page_size: DEFAULT_FUDO_PAGE_SIZE,
            webhook_secret: Secret::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("ALFRA_HOST").ok().unwrap_or_else(|| DEFAULT_ALFRA_HOST.into());
        let port = env_or_default("ALFRA_PORT", DEFAULT_ALFRA_PORT);
        let database_url = env::var("ALFRA_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ ALFRA_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let db_max_connections = env_or_default("ALFRA_DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS).max(1);
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Every request that \
                 needs a bearer token will be rejected."
            );
            AuthConfig::default()
        });
        let utc_offset = parse_utc_offset(env_or_default("ALFRA_UTC_OFFSET_HOURS", DEFAULT_UTC_OFFSET_HOURS));
        let fudo = FudoConfig::new_from_env_or_default();
        let fudo_page_size = clamp_page_size(env_or_default("ALFRA_FUDO_PAGE_SIZE", DEFAULT_FUDO_PAGE_SIZE));
        let webhook_secret = env::var("ALFRA_FUDO_WEBHOOK_SECRET").ok().filter(|s| !s.is_empty()).unwrap_or_else(|| {
            warn!("🪛️ ALFRA_FUDO_WEBHOOK_SECRET is not set. All Fudo webhook calls will be rejected.");
            String::default()
        });
        Self {
            host,
            port,
            database_url,
            db_max_connections,
            auth,
            utc_offset,
            fudo,
            fudo_page_size,
            webhook_secret: Secret::new(webhook_secret),
        }
    }
}

fn default_utc_offset() -> FixedOffset {
    parse_utc_offset(DEFAULT_UTC_OFFSET_HOURS)
}

fn parse_utc_offset(hours: i32) -> FixedOffset {
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| {
            error!("🪛️ {hours} is not a valid value for ALFRA_UTC_OFFSET_HOURS. Using UTC.");
            Utc.fix()
        })
}

fn clamp_page_size(size: usize) -> usize {
    if size == 0 || size > MAX_PAGE_SIZE {
        let clamped = size.clamp(1, MAX_PAGE_SIZE);
        warn!("🪛️ ALFRA_FUDO_PAGE_SIZE must be between 1 and {MAX_PAGE_SIZE}. Using {clamped}.");
        clamped
    } else {
        size
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug, Default)]
pub struct AuthConfig {
    /// The HS256 secret the identity provider signs its access tokens with.
    pub jwt_secret: Secret<String>,
}

impl AuthConfig {
    pub fn new<S: Into<String>>(jwt_secret: S) -> Self {
        Self { jwt_secret: Secret::new(jwt_secret.into()) }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("ALFRA_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [ALFRA_JWT_SECRET]")))?;
        if secret.trim().is_empty() {
            return Err(ServerError::ConfigurationError("ALFRA_JWT_SECRET is empty".to_string()));
        }
        Ok(Self::new(secret))
    }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// A subset of the server configuration that handlers need at request time. Secrets are kept out of it.
#[derive(Clone, Copy, Debug)]
pub struct ServerOptions {
    pub utc_offset: FixedOffset,
    pub fudo_page_size: usize,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { utc_offset: config.utc_offset, fudo_page_size: config.fudo_page_size }
    }
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self::from_config(&ServerConfig::default())
    }
}
