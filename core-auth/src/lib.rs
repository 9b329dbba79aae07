//! # Identity Adapter
//!
//! Session management for the gateway: anonymous and e-mail/password
//! sign-in, account lifecycle operations and the two-phase external
//! provider sign-in that round-trips through host-native UI.
//!
//! ## Overview
//!
//! - [`IdentityManager`] turns every identity operation into exactly one
//!   terminal outcome event (two for failed side operations).
//! - [`CorrelationHandler`] matches host-delivered UI results to the flow
//!   that launched the UI.
//! - [`user_record`] builds the host-facing snapshot of the current user.

pub mod correlation;
pub mod error;
pub mod manager;
pub mod types;

pub use correlation::{CorrelationHandler, CorrelationToken, FlowKind, FlowState};
pub use error::{AuthError, Result};
pub use manager::{IdentityManager, NO_SESSION_REASON};
pub use types::{user_record, USER_RECORD_KEYS};
