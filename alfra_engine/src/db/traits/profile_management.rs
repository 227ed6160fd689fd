use thiserror::Error;

use crate::db_types::{NewProfile, Profile};

#[derive(Debug, Clone, Error)]
pub enum ProfileApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for ProfileApiError {
    fn from(e: sqlx::Error) -> Self {
        ProfileApiError::DatabaseError(e.to_string())
    }
}

/// Profiles are provisioned by the admin panel. The engine mostly reads them to resolve callers.
#[allow(async_fn_in_trait)]
pub trait ProfileManagement {
    async fn fetch_profile(&self, id: &str) -> Result<Option<Profile>, ProfileApiError>;

    /// Creates the profile, or updates the name and role of an existing one.
    async fn upsert_profile(&self, profile: NewProfile) -> Result<Profile, ProfileApiError>;
}
