use std::time::Duration;

use alfra_common::{helpers::env_or_default, Secret};
use log::*;

pub const DEFAULT_FUDO_API_URL: &str = "https://api.fu.do/v1alpha1";
pub const DEFAULT_FUDO_AUTH_URL: &str = "https://auth.fu.do/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct FudoConfig {
    /// Base url for the REST API, without a trailing slash. e.g. "https://api.fu.do/v1alpha1"
    pub api_url: String,
    /// The token endpoint. Credentials are POSTed here in exchange for a bearer token.
    pub auth_url: String,
    pub api_key: Secret<String>,
    pub api_secret: Secret<String>,
    /// Per-request timeout for every call made to Fudo.
    pub timeout: Duration,
}

impl Default for FudoConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_FUDO_API_URL.to_string(),
            auth_url: DEFAULT_FUDO_AUTH_URL.to_string(),
            api_key: Secret::default(),
            api_secret: Secret::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl FudoConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("ALFRA_FUDO_API_URL").unwrap_or_else(|_| {
            info!("🪛️ ALFRA_FUDO_API_URL not set, using {DEFAULT_FUDO_API_URL}");
            DEFAULT_FUDO_API_URL.to_string()
        });
        let auth_url = std::env::var("ALFRA_FUDO_AUTH_URL").unwrap_or_else(|_| {
            info!("🪛️ ALFRA_FUDO_AUTH_URL not set, using {DEFAULT_FUDO_AUTH_URL}");
            DEFAULT_FUDO_AUTH_URL.to_string()
        });
        let api_key = Secret::new(std::env::var("ALFRA_FUDO_API_KEY").unwrap_or_else(|_| {
            warn!("🪛️ ALFRA_FUDO_API_KEY not set. Calls to Fudo will fail until it is configured.");
            String::default()
        }));
        let api_secret = Secret::new(std::env::var("ALFRA_FUDO_API_SECRET").unwrap_or_else(|_| {
            warn!("🪛️ ALFRA_FUDO_API_SECRET not set. Calls to Fudo will fail until it is configured.");
            String::default()
        }));
        let timeout = Duration::from_secs(env_or_default("ALFRA_FUDO_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS));
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            auth_url,
            api_key,
            api_secret,
            timeout,
        }
    }
}
