//! # Fudo tools
//!
//! A small client for the Fudo point-of-sale REST API. Fudo is the source of truth for sales in the restaurant; this
//! crate only reads from it.
//!
//! * [`FudoApi`] authenticates against the Fudo auth endpoint and fetches sales, either the most recent page or a
//!   single sale with its customer.
//! * [`data_objects`] holds the JSON:API documents returned by Fudo. Decoding is deliberately forgiving: attributes
//!   that are missing or of an unexpected type decode to `None` rather than failing the whole page.
mod api;
mod config;
mod error;

pub mod data_objects;
pub mod helpers;

pub use api::{FudoApi, MAX_PAGE_SIZE};
pub use config::FudoConfig;
pub use data_objects::{FudoCustomer, FudoSale, SaleAttributes, SalesPage};
pub use error::FudoApiError;
