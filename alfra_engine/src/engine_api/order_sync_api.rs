//! Writes the POS mirror and reads it back.
use std::fmt::Debug;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use log::*;

use crate::{
    db_types::{NewOrder, Order},
    traits::{OrderStore, OrderStoreError},
};

pub struct OrderSyncApi<B> {
    db: B,
}

impl<B: Debug> Debug for OrderSyncApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderSyncApi ({:?})", self.db)
    }
}

impl<B> OrderSyncApi<B>
where B: OrderStore
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Upserts a batch of projected orders. The batch is written atomically: on error nothing from it is kept.
    ///
    /// Returns the number of orders written.
    pub async fn mirror_orders(&self, orders: &[NewOrder]) -> Result<usize, OrderStoreError> {
        if orders.is_empty() {
            debug!("🔄️ Nothing to mirror");
            return Ok(0);
        }
        let count = self.db.upsert_orders(orders).await.map_err(|e| {
            error!("🔄️ Could not mirror {} orders. The batch was rolled back. {e}", orders.len());
            e
        })?;
        info!("🔄️ {count} orders mirrored from the POS");
        Ok(count)
    }

    /// All orders observed on the given calendar day, where the day is interpreted at `utc_offset`. Orders are sorted
    /// by their POS creation time.
    pub async fn orders_for_day(&self, day: NaiveDate, utc_offset: FixedOffset) -> Result<Vec<Order>, OrderStoreError> {
        let (from, to) = day_window(day, utc_offset);
        trace!("🔄️ Orders for {day} ({utc_offset}) are those observed in [{from}, {to})");
        self.db.fetch_orders_between(from, to).await
    }

    pub async fn order_by_id(&self, id: i64) -> Result<Option<Order>, OrderStoreError> {
        self.db.fetch_order(id).await
    }

    pub async fn order_by_external_id(&self, external_id: &str) -> Result<Option<Order>, OrderStoreError> {
        self.db.fetch_order_by_external_id(external_id).await
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

/// The UTC interval `[start, end)` covered by `day` in a timezone with the given offset.
pub fn day_window(day: NaiveDate, utc_offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    let local_midnight = day.and_time(NaiveTime::default());
    let utc_midnight = local_midnight - Duration::seconds(i64::from(utc_offset.local_minus_utc()));
    let start = Utc.from_utc_datetime(&utc_midnight);
    (start, start + Duration::days(1))
}
