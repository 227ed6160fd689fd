use alfra_engine::{
    db_types::{NewOrder, OrderStatus, StatusSource},
    StatusUpdateRequest,
};
use serde::{Deserialize, Serialize};

use crate::errors::ServerError;

/// The acknowledgement sent back to webhook callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    pub ok: bool,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Result of a mirror run, in the envelope the web front end expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResponse {
    pub ok: bool,
    pub mensaje: String,
    pub procesados: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ejemplo: Option<NewOrder>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncFailure {
    pub ok: bool,
    pub error: String,
}

impl SyncFailure {
    pub fn new<S: Into<String>>(error: S) -> Self {
        Self { ok: false, error: error.into() }
    }
}

/// Body of `POST /api/orders/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateParams {
    #[serde(rename = "orderId")]
    pub order_id: i64,
    pub estado: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub version: Option<i64>,
}

impl TryFrom<StatusUpdateParams> for StatusUpdateRequest {
    type Error = ServerError;

    fn try_from(params: StatusUpdateParams) -> Result<Self, Self::Error> {
        let new_status = params.estado.parse::<OrderStatus>().map_err(|e| ServerError::BadPayload(e.to_string()))?;
        let source = match params.source.as_deref() {
            Some(s) => s.parse::<StatusSource>().map_err(|e| ServerError::BadPayload(e.to_string()))?,
            None => StatusSource::default(),
        };
        let mut request = StatusUpdateRequest::new(params.order_id, new_status).with_source(source);
        if let Some(version) = params.version {
            request = request.with_expected_version(version);
        }
        Ok(request)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateResponse {
    pub ok: bool,
    #[serde(rename = "orderId")]
    pub order_id: i64,
    pub estado: OrderStatus,
}
