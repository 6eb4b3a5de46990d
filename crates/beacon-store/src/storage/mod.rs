//! Key/value storage backends.

pub mod file;
pub mod memory;
