//! # beacon-core
//!
//! Core crate for Beacon, the notification delivery core. Contains traits,
//! configuration schemas, typed identifiers, domain types, store mutation
//! events, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Beacon crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
