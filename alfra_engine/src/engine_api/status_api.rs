//! Applies application-level status changes to mirrored orders.
//!
//! Every change is attributed to an explicit caller. The API does not keep any notion of a "current user"; whoever
//! invokes it must pass the identity it has verified.
use std::fmt::Debug;

use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{NewStatusChange, Order, OrderStatus, StatusChange, StatusSource},
    engine_api::errors::StatusUpdateError,
    traits::{OrderStore, ProfileManagement},
};

/// A request to move an order to a new status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub order_id: i64,
    pub new_status: OrderStatus,
    #[serde(default)]
    pub source: StatusSource,
    /// If given, the change is rejected when the order is no longer at this version.
    #[serde(default)]
    pub expected_version: Option<i64>,
}

impl StatusUpdateRequest {
    pub fn new(order_id: i64, new_status: OrderStatus) -> Self {
        Self { order_id, new_status, source: StatusSource::default(), expected_version: None }
    }

    pub fn with_source(mut self, source: StatusSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_expected_version(mut self, version: i64) -> Self {
        self.expected_version = Some(version);
        self
    }
}

pub struct StatusApi<B> {
    db: B,
}

impl<B: Debug> Debug for StatusApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StatusApi ({:?})", self.db)
    }
}

impl<B> StatusApi<B>
where B: OrderStore + ProfileManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Moves an order to a new status on behalf of `caller`.
    ///
    /// `caller` is the profile id of whoever is making the change, as established by the caller's own authentication.
    /// Checks are made in this order, and nothing is written unless all of them pass:
    /// * the caller must be given and must have a profile, otherwise [`StatusUpdateError::Unauthorized`];
    /// * the order must exist, otherwise [`StatusUpdateError::NotFound`];
    /// * if the request carries an expected version, the order must still be at it, otherwise
    ///   [`StatusUpdateError::VersionConflict`].
    ///
    /// Any status may follow any other.
    pub async fn apply_status_change(
        &self,
        caller: Option<&str>,
        request: StatusUpdateRequest,
    ) -> Result<Order, StatusUpdateError> {
        let caller = caller.filter(|c| !c.trim().is_empty()).ok_or_else(|| {
            info!("🔄️ Status change for order #{} rejected. No caller identity.", request.order_id);
            StatusUpdateError::Unauthorized("No caller identity was provided".to_string())
        })?;
        let profile = self.db.fetch_profile(caller).await?.ok_or_else(|| {
            info!("🔄️ Status change for order #{} rejected. {caller} has no profile.", request.order_id);
            StatusUpdateError::Unauthorized(format!("{caller} is not a known user"))
        })?;
        let order = self.db.fetch_order(request.order_id).await?;
        if order.is_none() {
            info!("🔄️ Status change rejected. Order #{} does not exist.", request.order_id);
            return Err(StatusUpdateError::NotFound(request.order_id));
        }
        let change = NewStatusChange {
            order_id: request.order_id,
            new_status: request.new_status,
            source: request.source,
            changed_by: profile.id,
            expected_version: request.expected_version,
        };
        let updated = self.db.update_order_status(&change).await.map_err(|e| {
            warn!("🔄️ Status change for order #{} failed. {e}", change.order_id);
            StatusUpdateError::from(e)
        })?;
        debug!("🔄️ Order #{} status set to '{}' by {} ({})", updated.id, updated.status, caller, profile.role);
        Ok(updated)
    }

    /// The audit trail of status changes for an order, oldest first.
    pub async fn status_history(&self, order_id: i64) -> Result<Vec<StatusChange>, StatusUpdateError> {
        let history = self.db.fetch_status_history(order_id).await?;
        Ok(history)
    }
}
