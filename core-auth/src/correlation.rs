//! # Correlation Handler
//!
//! Matches results the host delivers after host-native UI completes with the
//! two-phase flow that launched that UI.
//!
//! Each flow kind owns one reserved [`CorrelationToken`]. Tokens are constant:
//! starting a flow records the token, and a matching result moves the handler
//! back to [`FlowState::Idle`] without consuming it. A result whose code
//! matches no registered token belongs to some other part of the host and is
//! ignored.
//!
//! ```text
//!            begin(token)
//!   Idle ───────────────────> AwaitingExternalResult(token)
//!    ^                                   │
//!    └───────── resolve(code) ───────────┘
//! ```

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::error::{AuthError, Result};

/// Request code reserved for one kind of two-phase flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationToken(i32);

impl CorrelationToken {
    /// External identity provider sign-in.
    pub const EXTERNAL_SIGN_IN: Self = Self(9001);

    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    pub fn code(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowKind {
    ExternalSignIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    AwaitingExternalResult(CorrelationToken),
}

#[derive(Debug)]
pub struct CorrelationHandler {
    flows: HashMap<CorrelationToken, FlowKind>,
    state: Mutex<FlowState>,
}

impl Default for CorrelationHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CorrelationHandler {
    pub fn new() -> Self {
        Self {
            flows: HashMap::new(),
            state: Mutex::new(FlowState::Idle),
        }
    }

    /// Reserve `token` for `kind`.
    ///
    /// # Errors
    ///
    /// [`AuthError::TokenCollision`] if the token is already reserved.
    pub fn register(&mut self, token: CorrelationToken, kind: FlowKind) -> Result<()> {
        if self.flows.contains_key(&token) {
            return Err(AuthError::TokenCollision {
                token: token.code(),
            });
        }
        self.flows.insert(token, kind);
        Ok(())
    }

    pub fn is_registered(&self, token: CorrelationToken) -> bool {
        self.flows.contains_key(&token)
    }

    /// Record that host UI was launched for `token`.
    ///
    /// Overlapping flows are not guarded against; a second `begin` simply
    /// re-records the token.
    pub fn begin(&self, token: CorrelationToken) {
        let mut state = self.state.lock();
        if let FlowState::AwaitingExternalResult(previous) = *state {
            debug!(previous = %previous, token = %token, "Flow started while another is outstanding");
        }
        *state = FlowState::AwaitingExternalResult(token);
    }

    /// Return to `Idle` without a result, e.g. when launching the UI failed.
    pub fn abandon(&self) {
        *self.state.lock() = FlowState::Idle;
    }

    /// Match a host-delivered request code.
    ///
    /// Returns the flow kind for a registered code (and returns to `Idle`),
    /// or `None` when the code belongs to an unrelated flow.
    pub fn resolve(&self, code: i32) -> Option<FlowKind> {
        let token = CorrelationToken::new(code);
        let Some(kind) = self.flows.get(&token).copied() else {
            debug!(code, "Ignoring host result with unrelated request code");
            return None;
        };

        let mut state = self.state.lock();
        if *state != FlowState::AwaitingExternalResult(token) {
            debug!(code, state = ?*state, "Host result arrived without a recorded flow start");
        }
        *state = FlowState::Idle;
        Some(kind)
    }

    pub fn state(&self) -> FlowState {
        *self.state.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> CorrelationHandler {
        let mut handler = CorrelationHandler::new();
        handler
            .register(CorrelationToken::EXTERNAL_SIGN_IN, FlowKind::ExternalSignIn)
            .unwrap();
        handler
    }

    #[test]
    fn test_round_trip() {
        let handler = handler();
        assert_eq!(handler.state(), FlowState::Idle);

        handler.begin(CorrelationToken::EXTERNAL_SIGN_IN);
        assert_eq!(
            handler.state(),
            FlowState::AwaitingExternalResult(CorrelationToken::EXTERNAL_SIGN_IN)
        );

        assert_eq!(handler.resolve(9001), Some(FlowKind::ExternalSignIn));
        assert_eq!(handler.state(), FlowState::Idle);
    }

    #[test]
    fn test_mismatch_is_ignored_and_keeps_state() {
        let handler = handler();
        handler.begin(CorrelationToken::EXTERNAL_SIGN_IN);

        assert_eq!(handler.resolve(42), None);
        assert_eq!(
            handler.state(),
            FlowState::AwaitingExternalResult(CorrelationToken::EXTERNAL_SIGN_IN)
        );
    }

    #[test]
    fn test_token_is_not_consumed() {
        let handler = handler();
        handler.begin(CorrelationToken::EXTERNAL_SIGN_IN);
        assert!(handler.resolve(9001).is_some());
        assert!(handler.resolve(9001).is_some());
        assert!(handler.is_registered(CorrelationToken::EXTERNAL_SIGN_IN));
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut handler = handler();
        let result = handler.register(CorrelationToken::new(9001), FlowKind::ExternalSignIn);
        assert!(matches!(result, Err(AuthError::TokenCollision { token: 9001 })));
    }

    #[test]
    fn test_abandon_returns_to_idle() {
        let handler = handler();
        handler.begin(CorrelationToken::EXTERNAL_SIGN_IN);
        handler.abandon();
        assert_eq!(handler.state(), FlowState::Idle);
    }
}
