use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::db_types::{OrderStatus, StatusChange, StatusSource};

/// Appends an entry to the status audit trail. Entries are never updated or deleted.
pub async fn insert_status_change(
    order_id: i64,
    old_status: OrderStatus,
    new_status: OrderStatus,
    source: StatusSource,
    changed_by: &str,
    changed_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<StatusChange, sqlx::Error> {
    let change = sqlx::query_as(
        r#"
            INSERT INTO order_status_changes (order_id, old_status, new_status, source, changed_by, changed_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(old_status)
    .bind(new_status)
    .bind(source)
    .bind(changed_by)
    .bind(changed_at)
    .fetch_one(conn)
    .await?;
    Ok(change)
}

pub async fn fetch_status_history(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<StatusChange>, sqlx::Error> {
    let history = sqlx::query_as("SELECT * FROM order_status_changes WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(history)
}
