//! `SqliteDatabase` is the concrete storage backend of the AlFra engine.
//!
//! It implements every trait defined in the [`traits`](crate::traits) module on top of a single SQLite pool.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::{migrate::MigrateError, SqlitePool};

use super::{db_url, new_pool, orders, profiles, status_changes};
use crate::{
    db_types::{NewOrder, NewProfile, NewStatusChange, Order, Profile, StatusChange},
    traits::{OrderStore, OrderStoreError, ProfileApiError, ProfileManagement},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl OrderStore for SqliteDatabase {
    async fn upsert_orders(&self, orders: &[NewOrder]) -> Result<usize, OrderStoreError> {
        let mut tx = self.pool.begin().await?;
        let synced_at = Utc::now();
        for order in orders {
            orders::upsert_order(order, synced_at, &mut tx).await?;
        }
        tx.commit().await?;
        debug!("🗃️ {} orders mirrored in a single batch", orders.len());
        Ok(orders.len())
    }

    async fn fetch_order(&self, id: i64) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_external_id(&self, external_id: &str) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_external_id(external_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_between(from, to, &mut conn).await?;
        trace!("🗃️ {} orders observed between {from} and {to}", orders.len());
        Ok(orders)
    }

    /// In a single atomic transaction,
    /// * checks that the order exists and, if the caller asked for it, that it is still at the expected version,
    /// * overwrites the status columns and bumps the version,
    /// * appends the change to `order_status_changes`.
    async fn update_order_status(&self, change: &NewStatusChange) -> Result<Order, OrderStoreError> {
        let mut tx = self.pool.begin().await?;
        let current = orders::fetch_order(change.order_id, &mut tx)
            .await?
            .ok_or(OrderStoreError::OrderNotFound(change.order_id))?;
        if let Some(expected) = change.expected_version {
            if expected != current.version {
                debug!("🗃️ Order #{} is at v{}, caller expected v{expected}", current.id, current.version);
                return Err(OrderStoreError::VersionConflict {
                    order_id: current.id,
                    expected,
                    actual: current.version,
                });
            }
        }
        let changed_at = Utc::now();
        let updated = orders::update_status(change, current.version, changed_at, &mut tx).await?;
        status_changes::insert_status_change(
            current.id,
            current.status,
            change.new_status,
            change.source,
            &change.changed_by,
            changed_at,
            &mut tx,
        )
        .await?;
        tx.commit().await?;
        info!(
            "🗃️ Order #{} moved from '{}' to '{}' by {} via {}",
            updated.id, current.status, updated.status, change.changed_by, change.source
        );
        Ok(updated)
    }

    async fn fetch_status_history(&self, order_id: i64) -> Result<Vec<StatusChange>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let history = status_changes::fetch_status_history(order_id, &mut conn).await?;
        Ok(history)
    }
}

impl ProfileManagement for SqliteDatabase {
    async fn fetch_profile(&self, id: &str) -> Result<Option<Profile>, ProfileApiError> {
        let mut conn = self.pool.acquire().await?;
        let profile = profiles::fetch_profile(id, &mut conn).await?;
        Ok(profile)
    }

    async fn upsert_profile(&self, profile: NewProfile) -> Result<Profile, ProfileApiError> {
        let mut conn = self.pool.acquire().await?;
        let profile = profiles::upsert_profile(profile, &mut conn).await?;
        debug!("🗃️ Profile {} saved with role {}", profile.id, profile.role);
        Ok(profile)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using the `ALFRA_DATABASE_URL` environment variable (or the default).
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date. Safe to call on every startup.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/db/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
