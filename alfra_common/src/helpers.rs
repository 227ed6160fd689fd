use std::{env, fmt::Display, str::FromStr};

use log::{info, warn};

/// Reads and parses the environment variable `key`. Missing or unparseable values are logged and replaced by
/// `default`.
pub fn env_or_default<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            warn!("🪛️ {s} is not a valid value for {key}. {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => {
            info!("🪛️ {key} is not set. Using the default value of {default}.");
            default
        },
    }
}
