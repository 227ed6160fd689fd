mod pesos;

pub mod helpers;
pub mod op;
mod secret;

pub use pesos::{Pesos, PesosConversionError};
pub use secret::Secret;
