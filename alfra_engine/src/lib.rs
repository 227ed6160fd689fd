//! AlFra engine
//!
//! The AlFra engine keeps a local mirror of the sales recorded on the Fudo point of sale, and lets restaurant staff
//! drive an application-level status for each mirrored order. It knows nothing about HTTP or about the Fudo wire
//! format; the server projects POS sales into [`db_types::NewOrder`]s before handing them over.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@db`]). SQLite is the supported backend. You should not need to access the
//!    database directly. Use the public API instead. The exception is the data types, which are defined in
//!    [`db_types`] and are public.
//! 2. The engine public API ([`mod@engine_api`]): [`OrderSyncApi`] for the mirror, [`StatusApi`] for status changes
//!    and [`ProfileApi`] for identity resolution. Backends implement the traits in [`traits`] to serve these APIs.
mod db;

pub mod db_types;
mod engine_api;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::SqliteDatabase;
pub use db::traits;
pub use engine_api::{
    errors::StatusUpdateError,
    order_sync_api::{day_window, OrderSyncApi},
    profile_api::ProfileApi,
    status_api::{StatusApi, StatusUpdateRequest},
};
pub use traits::{OrderStore, OrderStoreError, ProfileApiError, ProfileManagement};
