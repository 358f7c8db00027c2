//! User records and registration rules.

pub mod entity;
pub mod error;

pub use error::*;
