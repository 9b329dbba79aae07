//! # Document-Store Adapter
//!
//! Forwards document operations to a [`DocumentBackend`](bridge_traits::DocumentBackend)
//! and reports each one on the `firestore_*` events.
//!
//! A read of a missing document is a failure (`Document does not exist`),
//! not a separate outcome.

pub mod error;
pub mod manager;

pub use error::{FirestoreError, Result};
pub use manager::FirestoreManager;
