use std::fmt::Debug;

use crate::{
    db_types::{NewProfile, Profile},
    traits::{ProfileApiError, ProfileManagement},
};

/// Looks up and provisions the profiles that callers are resolved against.
pub struct ProfileApi<B> {
    db: B,
}

impl<B: Debug> Debug for ProfileApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProfileApi ({:?})", self.db)
    }
}

impl<B> ProfileApi<B>
where B: ProfileManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn profile_by_id(&self, id: &str) -> Result<Option<Profile>, ProfileApiError> {
        self.db.fetch_profile(id).await
    }

    pub async fn upsert_profile(&self, profile: NewProfile) -> Result<Profile, ProfileApiError> {
        self.db.upsert_profile(profile).await
    }
}
