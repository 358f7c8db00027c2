//! Order records and the status machine they move through.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
