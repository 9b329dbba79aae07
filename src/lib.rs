//! Workspace umbrella crate.
//!
//! Exposes the gateway façade behind a feature flag so host applications can
//! depend on one crate and enable `desktop-shims` without wiring each
//! workspace crate individually.

#[cfg(feature = "desktop-shims")]
pub use core_service::*;
