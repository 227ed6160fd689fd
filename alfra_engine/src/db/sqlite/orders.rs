use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewOrder, NewStatusChange, Order},
    traits::OrderStoreError,
};

/// Inserts the order, or overwrites the POS-owned fields of the existing order with the same `external_id`.
///
/// The status columns of an existing order are never touched. `version` only moves when one of the POS-owned fields
/// actually changed, so that re-mirroring an unchanged sale leaves the row as it was, apart from `synced_at`.
///
/// This is not atomic on its own. Pass `&mut *tx` to embed it in a transaction.
pub async fn upsert_order(
    order: &NewOrder,
    synced_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                external_id,
                created_at_external,
                closed_at_external,
                total,
                sale_type,
                sale_state,
                customer_name,
                synced_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (external_id) DO UPDATE SET
                version = CASE
                    WHEN orders.created_at_external IS excluded.created_at_external
                        AND orders.closed_at_external IS excluded.closed_at_external
                        AND orders.total = excluded.total
                        AND orders.sale_type = excluded.sale_type
                        AND orders.sale_state = excluded.sale_state
                        AND orders.customer_name IS excluded.customer_name
                    THEN orders.version
                    ELSE orders.version + 1
                END,
                created_at_external = excluded.created_at_external,
                closed_at_external = excluded.closed_at_external,
                total = excluded.total,
                sale_type = excluded.sale_type,
                sale_state = excluded.sale_state,
                customer_name = excluded.customer_name,
                synced_at = excluded.synced_at
            RETURNING *;
        "#,
    )
    .bind(&order.external_id)
    .bind(order.created_at_external)
    .bind(order.closed_at_external)
    .bind(order.total)
    .bind(order.sale_type)
    .bind(order.sale_state)
    .bind(&order.customer_name)
    .bind(synced_at)
    .fetch_one(conn)
    .await?;
    trace!("🗃️ Order [{}] mirrored as #{} (v{})", order.external_id, order.id, order.version);
    Ok(order)
}

pub async fn fetch_order(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_by_external_id(
    external_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE external_id = $1").bind(external_id).fetch_optional(conn).await?;
    Ok(order)
}

/// Fetches the orders whose POS creation time (or, failing that, sync time) lies in `[from, to)`.
///
/// Resulting orders are ordered by that time in ascending order, with ties broken by `id`.
pub async fn fetch_orders_between(
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as(
        r#"
            SELECT * FROM orders
            WHERE COALESCE(created_at_external, synced_at) >= $1
              AND COALESCE(created_at_external, synced_at) < $2
            ORDER BY COALESCE(created_at_external, synced_at) ASC, id ASC
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(conn)
    .await?;
    Ok(orders)
}

/// Overwrites the status columns of an order and bumps its version.
///
/// If `change.expected_version` is set, the update only applies to the row at that version. The caller is expected to
/// have checked that the order exists, so zero affected rows is reported as a version conflict.
pub(crate) async fn update_status(
    change: &NewStatusChange,
    current_version: i64,
    changed_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderStoreError> {
    let mut builder = QueryBuilder::new("UPDATE orders SET version = version + 1, status = ");
    builder.push_bind(change.new_status);
    builder.push(", status_source = ");
    builder.push_bind(change.source);
    builder.push(", status_changed_at = ");
    builder.push_bind(changed_at);
    builder.push(", status_changed_by = ");
    builder.push_bind(change.changed_by.as_str());
    builder.push(" WHERE id = ");
    builder.push_bind(change.order_id);
    if let Some(expected) = change.expected_version {
        builder.push(" AND version = ");
        builder.push_bind(expected);
    }
    builder.push(" RETURNING *");
    trace!("🗃️ Executing query: {}", builder.sql());
    let updated: Option<Order> = builder.build_query_as::<Order>().fetch_optional(conn).await?;
    match updated {
        Some(order) => {
            debug!("🗃️ Order #{} is now '{}' (v{})", order.id, order.status, order.version);
            Ok(order)
        },
        None => Err(OrderStoreError::VersionConflict {
            order_id: change.order_id,
            expected: change.expected_version.unwrap_or(current_version),
            actual: current_version,
        }),
    }
}
