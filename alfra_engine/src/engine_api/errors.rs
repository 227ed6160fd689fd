use thiserror::Error;

use crate::traits::{OrderStoreError, ProfileApiError};

#[derive(Debug, Clone, Error)]
pub enum StatusUpdateError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Order {0} does not exist")]
    NotFound(i64),
    #[error("Order {order_id} has changed since it was read. Expected version {expected}, but it is at {actual}")]
    VersionConflict { order_id: i64, expected: i64, actual: i64 },
    #[error("Could not save the status change: {0}")]
    StoreWriteFailed(String),
}

impl From<OrderStoreError> for StatusUpdateError {
    fn from(e: OrderStoreError) -> Self {
        match e {
            OrderStoreError::OrderNotFound(id) => StatusUpdateError::NotFound(id),
            OrderStoreError::VersionConflict { order_id, expected, actual } => {
                StatusUpdateError::VersionConflict { order_id, expected, actual }
            },
            OrderStoreError::DatabaseError(s) => StatusUpdateError::StoreWriteFailed(s),
        }
    }
}

impl From<ProfileApiError> for StatusUpdateError {
    fn from(e: ProfileApiError) -> Self {
        match e {
            ProfileApiError::DatabaseError(s) => StatusUpdateError::StoreWriteFailed(s),
        }
    }
}
