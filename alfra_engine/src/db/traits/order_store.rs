use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db_types::{NewOrder, NewStatusChange, Order, StatusChange};

#[derive(Debug, Clone, Error)]
pub enum OrderStoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(i64),
    #[error("Order {order_id} is at version {actual}, not {expected}")]
    VersionConflict { order_id: i64, expected: i64, actual: i64 },
}

impl From<sqlx::Error> for OrderStoreError {
    fn from(e: sqlx::Error) -> Self {
        OrderStoreError::DatabaseError(e.to_string())
    }
}

/// The `OrderStore` trait defines the behaviour for storing mirrored orders and applying status changes to them.
#[allow(async_fn_in_trait)]
pub trait OrderStore {
    /// Inserts or overwrites the given orders, keyed on `external_id`, in a single atomic batch. Either every order
    /// is written or none is. Application-level status fields of existing rows are left alone.
    ///
    /// Returns the number of orders written.
    async fn upsert_orders(&self, orders: &[NewOrder]) -> Result<usize, OrderStoreError>;

    async fn fetch_order(&self, id: i64) -> Result<Option<Order>, OrderStoreError>;

    async fn fetch_order_by_external_id(&self, external_id: &str) -> Result<Option<Order>, OrderStoreError>;

    /// Fetches orders first observed in the half-open interval `[from, to)`, ordered by the POS creation time.
    ///
    /// Orders without a POS creation time are placed by their sync time instead.
    async fn fetch_orders_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Order>, OrderStoreError>;

    /// Overwrites the status of an order and appends the change to its audit trail, atomically.
    ///
    /// Fails with [`OrderStoreError::OrderNotFound`] if the order does not exist, and with
    /// [`OrderStoreError::VersionConflict`] if `change.expected_version` is set and the order has moved on. Nothing is
    /// written in either case.
    async fn update_order_status(&self, change: &NewStatusChange) -> Result<Order, OrderStoreError>;

    /// The status audit trail for an order, oldest first.
    async fn fetch_status_history(&self, order_id: i64) -> Result<Vec<StatusChange>, OrderStoreError>;
}
