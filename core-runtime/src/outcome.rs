//! Operation outcomes
//!
//! Every backend call an adapter makes is reduced to exactly one [`Outcome`]
//! before anything reaches the dispatcher.

use futures::FutureExt;
use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;

/// Reason reported when a backend fails without saying why.
pub const UNKNOWN_REASON: &str = "Unknown error";

/// Terminal result of one asynchronous backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    /// Human-readable reason, forwarded to the host as-is.
    Failure(String),
}

impl<T> Outcome<T> {
    pub fn from_result<E: Display>(result: std::result::Result<T, E>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(error) => {
                let reason = error.to_string();
                if reason.is_empty() {
                    Outcome::Failure(UNKNOWN_REASON.to_string())
                } else {
                    Outcome::Failure(reason)
                }
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failure(reason) => Outcome::Failure(reason),
        }
    }

    /// Rewrite the failure reason, leaving a success untouched.
    pub fn map_failure<F: FnOnce(String) -> String>(self, f: F) -> Outcome<T> {
        match self {
            Outcome::Success(value) => Outcome::Success(value),
            Outcome::Failure(reason) => Outcome::Failure(f(reason)),
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(reason) => Some(reason),
        }
    }
}

/// Await a backend future and reduce it to an [`Outcome`].
///
/// A panic inside the future becomes a `Failure` so a faulty backend still
/// produces its terminal event.
pub async fn capture<T, E, F>(future: F) -> Outcome<T>
where
    E: Display,
    F: Future<Output = std::result::Result<T, E>>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => Outcome::from_result(result),
        Err(panic) => {
            let reason = panic_reason(panic.as_ref());
            tracing::error!(reason = %reason, "Backend call panicked");
            Outcome::Failure(reason)
        }
    }
}

fn panic_reason(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "Backend call panicked".to_string()
    }
}
