//! Glue between the Fudo point of sale and the engine's order mirror.
//!
//! The pipeline is one-way and pull based: a [`SalesFetcher`] pulls raw sales, [`project_sale`] normalises each of them
//! into a [`NewOrder`], and the [`OrderSyncApi`] upserts the batch.
use alfra_common::Pesos;
use alfra_engine::{
    db_types::{NewOrder, SaleState, SaleType},
    OrderStore,
    OrderSyncApi,
};
use chrono::{DateTime, Utc};
use fudo_tools::{helpers::value_to_string, FudoApi, FudoApiError, FudoSale};
use log::*;
use serde_json::Value;

use crate::errors::ServerError;

/// The source of raw sales. [`FudoApi`] is the production implementation.
#[allow(async_fn_in_trait)]
pub trait SalesFetcher {
    /// The most recent sales, newest first, in a single bounded request.
    async fn fetch_recent_sales(&self, limit: usize) -> Result<Vec<FudoSale>, FudoApiError>;

    /// A single sale, or `None` if the POS does not know it.
    async fn fetch_sale(&self, sale_id: &str) -> Result<Option<FudoSale>, FudoApiError>;
}

impl SalesFetcher for FudoApi {
    async fn fetch_recent_sales(&self, limit: usize) -> Result<Vec<FudoSale>, FudoApiError> {
        FudoApi::fetch_recent_sales(self, limit).await
    }

    async fn fetch_sale(&self, sale_id: &str) -> Result<Option<FudoSale>, FudoApiError> {
        FudoApi::fetch_sale(self, sale_id).await
    }
}

/// Projects a raw POS sale into the order shape the mirror stores. This never fails.
///
/// * Unknown or missing sale types and states become `UNKNOWN`.
/// * A missing, non-numeric or negative total becomes zero.
/// * Timestamps that are missing or not RFC 3339 become `None`.
/// * The customer name comes from the sale itself, falling back to the included customer resource.
pub fn project_sale(sale: &FudoSale) -> NewOrder {
    let attrs = &sale.attributes;
    let customer_name = non_empty(attrs.customer_name.as_deref())
        .or_else(|| sale.customer.as_ref().and_then(|c| non_empty(c.attributes.name.as_deref())));
    NewOrder {
        external_id: sale.id.clone(),
        created_at_external: parse_timestamp(attrs.created_at.as_deref()),
        closed_at_external: parse_timestamp(attrs.closed_at.as_deref()),
        total: project_total(attrs.total),
        sale_type: SaleType::from_pos_value(attrs.sale_type.as_deref()),
        sale_state: SaleState::from_pos_value(attrs.sale_state.as_deref()),
        customer_name,
    }
}

fn project_total(total: Option<f64>) -> Pesos {
    match total.map(Pesos::try_from_decimal) {
        Some(Ok(p)) if !p.is_negative() => p,
        Some(Ok(p)) => {
            debug!("🧾️ Negative sale total {p} mirrored as zero");
            Pesos::default()
        },
        Some(Err(e)) => {
            debug!("🧾️ Sale total mirrored as zero. {e}");
            Pesos::default()
        },
        None => Pesos::default(),
    }
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| debug!("🧾️ Ignoring unparseable POS timestamp '{value}'. {e}"))
        .ok()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

/// The outcome of a mirror run.
#[derive(Debug, Clone, Default)]
pub struct MirrorReport {
    pub processed: usize,
    /// The first projected order of the batch, if there was one.
    pub sample: Option<NewOrder>,
}

/// Pulls the most recent `limit` sales and mirrors them in one batch.
///
/// Fetch failures surface as [`ServerError::RemoteUnavailable`] and storage failures as
/// [`ServerError::StoreWriteFailed`]. Nothing is retried.
pub async fn mirror_recent_sales<B, F>(
    fetcher: &F,
    api: &OrderSyncApi<B>,
    limit: usize,
) -> Result<MirrorReport, ServerError>
where
    B: OrderStore,
    F: SalesFetcher,
{
    let sales = fetcher.fetch_recent_sales(limit).await.map_err(|e| {
        warn!("🧾️ Could not fetch recent sales from Fudo. {e}");
        ServerError::from(e)
    })?;
    let orders = sales.iter().map(project_sale).collect::<Vec<_>>();
    trace!("🧾️ Projected {} sales into orders", orders.len());
    let processed =
        api.mirror_orders(&orders).await.map_err(|e| ServerError::StoreWriteFailed(e.to_string()))?;
    let sample = orders.into_iter().next();
    Ok(MirrorReport { processed, sample })
}

/// Re-reads one sale from the POS and mirrors it. Returns `false` if the POS does not know the sale.
pub async fn refresh_sale<B, F>(fetcher: &F, api: &OrderSyncApi<B>, sale_id: &str) -> Result<bool, ServerError>
where
    B: OrderStore,
    F: SalesFetcher,
{
    let Some(sale) = fetcher.fetch_sale(sale_id).await? else {
        return Ok(false);
    };
    let order = project_sale(&sale);
    api.mirror_orders(&[order]).await.map_err(|e| ServerError::StoreWriteFailed(e.to_string()))?;
    Ok(true)
}

/// Looks for the sale a webhook payload refers to, in `saleId`, `data.id` or `id`, in that order.
pub fn sale_id_from_payload(payload: &Value) -> Option<String> {
    [&payload["saleId"], &payload["data"]["id"], &payload["id"]]
        .into_iter()
        .find_map(value_to_string)
        .filter(|id| !id.trim().is_empty())
}
