//! #  Database management and control.
//!
//! This module defines the interface contracts that storage *backends* must satisfy to be used by the AlFra engine.
//!
//! ## Orders
//! Orders are mirrored from the Fudo point of sale. The POS owns the sale fields (totals, timestamps, sale type and
//! state) and the mirror overwrites them wholesale, keyed on the POS sale id. The application owns the order status,
//! which only changes through an authenticated status update and is never touched by the mirror.
//!
//! ## Traits
//! * [`OrderStore`] stores mirrored orders, answers queries about them, and applies status changes atomically together
//!   with their audit trail.
//! * [`ProfileManagement`] resolves caller identities to known staff and customer profiles.
mod order_store;
mod profile_management;

pub use order_store::{OrderStore, OrderStoreError};
pub use profile_management::{ProfileApiError, ProfileManagement};
