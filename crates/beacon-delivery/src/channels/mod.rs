//! Channel provider implementations over the injected platform bindings.

pub mod native;
pub mod system;
