//! # AlFra engine public API
//!
//! The `engine_api` module exposes the programmatic API of the AlFra engine. It is split by concern, so that callers
//! only need a backend that implements the traits the API they use depends on.
//!
//! * [`order_sync_api`] writes projected POS sales into the mirror and answers read queries about mirrored orders.
//! * [`status_api`] applies application-level status changes on behalf of an identified caller.
//! * [`profile_api`] resolves caller identities to profiles.
//!
//! # API usage
//!
//! An API instance is created by supplying a database backend that implements the backend traits the API needs.
//!
//! ```rust,ignore
//! use alfra_engine::{SqliteDatabase, StatusApi, StatusUpdateRequest};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! // SqliteDatabase implements OrderStore and ProfileManagement
//! let api = StatusApi::new(db);
//! let order = api.apply_status_change(Some(caller_id), request).await?;
//! ```
pub mod errors;
pub mod order_sync_api;
pub mod profile_api;
pub mod status_api;
