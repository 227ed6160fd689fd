use chrono::Utc;
use sqlx::SqliteConnection;

use crate::db_types::{NewProfile, Profile};

pub async fn fetch_profile(id: &str, conn: &mut SqliteConnection) -> Result<Option<Profile>, sqlx::Error> {
    let profile = sqlx::query_as("SELECT * FROM profiles WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(profile)
}

/// Creates the profile, or updates the name and role of the existing one. `created_at` is kept for existing profiles.
pub async fn upsert_profile(profile: NewProfile, conn: &mut SqliteConnection) -> Result<Profile, sqlx::Error> {
    let profile = sqlx::query_as(
        r#"
            INSERT INTO profiles (id, full_name, role, created_at) VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET full_name = excluded.full_name, role = excluded.role
            RETURNING *;
        "#,
    )
    .bind(profile.id)
    .bind(profile.full_name)
    .bind(profile.role)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    Ok(profile)
}
