//! Core types and errors for polychaos.
//!
//! This crate hosts the pieces shared by every workspace member: the error
//! enum, the `Result` alias, and small value types returned by the
//! distribution layer.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::Recurrence;
