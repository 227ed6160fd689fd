//! # SQLite backend
//!
//! The low-level query functions in [`orders`], [`profiles`] and [`status_changes`] are simple functions that accept a
//! `&mut SqliteConnection` argument. Callers can obtain a connection from the pool, or open a transaction when several
//! of them must succeed or fail together, and call through without any other changes.
//!
//! [`SqliteDatabase`] ties them together and implements the storage traits.
use std::{env, str::FromStr};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

mod sqlite_impl;

pub mod orders;
pub mod profiles;
pub mod status_changes;

pub use sqlite_impl::SqliteDatabase;

pub const SQLITE_DB_URL: &str = "sqlite://data/alfra.db";

pub fn db_url() -> String {
    let result = env::var("ALFRA_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ ALFRA_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true).foreign_keys(true);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}
