use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use alfra_engine::{OrderStoreError, ProfileApiError, StatusUpdateError};
use fudo_tools::FudoApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("The point of sale could not be reached. {0}")]
    RemoteUnavailable(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("Unauthorized. {0}")]
    Unauthorized(String),
    #[error("The data was not found. {0}")]
    NotFound(String),
    #[error("Invalid request. {0}")]
    BadPayload(String),
    #[error("Conflicting update. {0}")]
    VersionConflict(String),
    #[error("Could not save changes. {0}")]
    StoreWriteFailed(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::RemoteUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadPayload(_) => StatusCode::BAD_REQUEST,
            Self::VersionConflict(_) => StatusCode::CONFLICT,
            Self::StoreWriteFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No access token was provided.")]
    MissingToken,
    #[error("Access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Access token is invalid. {0}")]
    ValidationError(String),
    #[error("Webhook secret is missing or incorrect.")]
    InvalidWebhookSecret,
}

impl From<StatusUpdateError> for ServerError {
    fn from(e: StatusUpdateError) -> Self {
        match e {
            StatusUpdateError::Unauthorized(s) => Self::Unauthorized(s),
            StatusUpdateError::NotFound(id) => Self::NotFound(format!("Order {id} does not exist")),
            e @ StatusUpdateError::VersionConflict { .. } => Self::VersionConflict(e.to_string()),
            StatusUpdateError::StoreWriteFailed(s) => Self::StoreWriteFailed(s),
        }
    }
}

impl From<OrderStoreError> for ServerError {
    fn from(e: OrderStoreError) -> Self {
        match e {
            OrderStoreError::OrderNotFound(id) => Self::NotFound(format!("Order {id} does not exist")),
            e @ OrderStoreError::VersionConflict { .. } => Self::VersionConflict(e.to_string()),
            OrderStoreError::DatabaseError(s) => Self::BackendError(s),
        }
    }
}

impl From<ProfileApiError> for ServerError {
    fn from(e: ProfileApiError) -> Self {
        Self::BackendError(e.to_string())
    }
}

impl From<FudoApiError> for ServerError {
    fn from(e: FudoApiError) -> Self {
        Self::RemoteUnavailable(e.to_string())
    }
}
