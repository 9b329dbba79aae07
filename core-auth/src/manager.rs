//! # Identity Manager
//!
//! Identity adapter of the gateway: session sign-in, account lifecycle and the
//! two-phase external provider sign-in.
//!
//! ## Overview
//!
//! Every asynchronous operation is spawned on the configured runtime and
//! reduced to exactly one [`Outcome`] before it reaches the dispatcher:
//!
//! - **Sign-in family** (anonymous, e-mail/password, account creation,
//!   external provider): `auth_success` with a snapshot of the current user,
//!   or `auth_failure` with the backend reason.
//! - **Side operations** (verification e-mail, password reset, account
//!   deletion, sign-out): the operation's boolean event, plus `auth_failure`
//!   when it failed.
//!
//! The current user is never cached; snapshots are read from the backend the
//! moment a sign-in completes.
//!
//! ## External sign-in
//!
//! ```text
//! host ── sign_in_with_external_provider() ──> start_activity_for_result(intent, 9001)
//!                                                          │
//! host <──────────── host-native UI ───────────────────────┘
//!   │
//!   └── on_external_result(9001, result) ──> credential ──> sign_in_with_credential
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use core_auth::IdentityManager;
//!
//! let identity = IdentityManager::new(backend, dispatcher, runtime)?
//!     .with_external_provider(google);
//! identity.init(host_context);
//!
//! identity.sign_in_with_email_password("ada@example.com", "hunter2");
//! ```

use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::{ExternalIdentityProvider, ExternalResult, HostContext, IdentityBackend, Record};
use core_runtime::config::DEFAULT_CLIENT_ID_RESOURCE;
use core_runtime::dispatcher::EventDispatcher;
use core_runtime::events::{AuthEvent, EventDescriptor};
use core_runtime::logging::redact_if_sensitive;
use core_runtime::outcome::{capture, Outcome};
use core_runtime::OperationHandle;
use parking_lot::RwLock;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, error, info, info_span, instrument, warn, Instrument};

use crate::correlation::{CorrelationHandler, CorrelationToken, FlowKind};
use crate::error::{AuthError, Result};
use crate::types::user_record;

/// Failure reason for user-scoped operations without a session.
pub const NO_SESSION_REASON: &str = "No user is currently signed in";

/// Host context captured by `init`, with the client identifier resolved once.
struct HostBinding {
    context: Arc<dyn HostContext>,
    client_id: Option<String>,
}

pub struct IdentityManager {
    backend: Arc<dyn IdentityBackend>,
    provider: Option<Arc<dyn ExternalIdentityProvider>>,
    dispatcher: EventDispatcher,
    runtime: Handle,
    correlation: CorrelationHandler,
    host: RwLock<Option<HostBinding>>,
    client_id_resource: String,
    report_start_failures: bool,
}

impl IdentityManager {
    /// Creates the adapter and reserves the external sign-in correlation token.
    pub fn new(
        backend: Arc<dyn IdentityBackend>,
        dispatcher: EventDispatcher,
        runtime: Handle,
    ) -> Result<Self> {
        let mut correlation = CorrelationHandler::new();
        correlation.register(CorrelationToken::EXTERNAL_SIGN_IN, FlowKind::ExternalSignIn)?;

        Ok(Self {
            backend,
            provider: None,
            dispatcher,
            runtime,
            correlation,
            host: RwLock::new(None),
            client_id_resource: DEFAULT_CLIENT_ID_RESOURCE.to_string(),
            report_start_failures: true,
        })
    }

    pub fn with_external_provider(mut self, provider: Arc<dyn ExternalIdentityProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_client_id_resource(mut self, resource: impl Into<String>) -> Self {
        self.client_id_resource = resource.into();
        self
    }

    /// Whether a failure to launch the external sign-in UI emits `auth_failure`.
    pub fn with_start_failure_reporting(mut self, enabled: bool) -> Self {
        self.report_start_failures = enabled;
        self
    }

    /// Events this adapter can emit.
    pub fn describe_events() -> Vec<EventDescriptor> {
        AuthEvent::descriptors()
    }

    pub fn correlation(&self) -> &CorrelationHandler {
        &self.correlation
    }

    /// Bind the host context and resolve the external provider's client id.
    ///
    /// A missing client id only disables external sign-in; it is logged and
    /// never surfaced as an event.
    #[instrument(skip_all, fields(resource = %self.client_id_resource))]
    pub fn init(&self, context: Arc<dyn HostContext>) {
        let client_id = context.resource_string(&self.client_id_resource);

        match (&client_id, &self.provider) {
            (None, _) => {
                let error = AuthError::ConfigurationMissing {
                    resource: self.client_id_resource.clone(),
                };
                error!(error = %error, "External sign-in unavailable");
            }
            (Some(_), None) => {
                warn!("No external identity provider configured, external sign-in unavailable")
            }
            (Some(_), Some(provider)) => {
                info!(provider = provider.provider_id(), "Identity adapter initialized")
            }
        }

        *self.host.write() = Some(HostBinding { context, client_id });
    }

    pub fn is_initialized(&self) -> bool {
        self.host.read().is_some()
    }

    // ------------------------------------------------------------------
    // Sign-in family
    // ------------------------------------------------------------------

    #[instrument(skip(self))]
    pub fn sign_in_anonymously(&self) -> OperationHandle {
        self.spawn_sign_in("sign_in_anonymously", |backend| async move {
            backend.sign_in_anonymously().await
        })
    }

    /// The new account becomes the current session, so success is reported
    /// through `auth_success` like any other sign-in.
    #[instrument(skip(self, password), fields(email = %redact_if_sensitive("email", email)))]
    pub fn create_user_with_email_password(&self, email: &str, password: &str) -> OperationHandle {
        let email = email.to_string();
        let password = password.to_string();
        self.spawn_sign_in("create_user_with_email_password", move |backend| async move {
            backend
                .create_user_with_email_password(&email, &password)
                .await
        })
    }

    #[instrument(skip(self, password), fields(email = %redact_if_sensitive("email", email)))]
    pub fn sign_in_with_email_password(&self, email: &str, password: &str) -> OperationHandle {
        let email = email.to_string();
        let password = password.to_string();
        self.spawn_sign_in("sign_in_with_email_password", move |backend| async move {
            backend.sign_in_with_email_password(&email, &password).await
        })
    }

    /// Phase one of external sign-in: hand the provider's intent to the host UI.
    ///
    /// Returns immediately. The outcome arrives later via
    /// [`on_external_result`](Self::on_external_result).
    #[instrument(skip(self))]
    pub fn sign_in_with_external_provider(&self) {
        match self.launch_external_sign_in() {
            Ok(()) => info!("External sign-in UI launched"),
            Err(e) => {
                self.correlation.abandon();
                error!(error = %e, "Failed to start external sign-in");
                if self.report_start_failures {
                    self.dispatcher
                        .emit(AuthEvent::Failure {
                            reason: e.to_string(),
                        })
                        .ok();
                }
            }
        }
    }

    fn launch_external_sign_in(&self) -> Result<()> {
        let provider = self.provider.as_ref().ok_or(AuthError::ProviderUnavailable)?;

        let (context, client_id) = {
            let host = self.host.read();
            let binding = host.as_ref().ok_or(AuthError::NotInitialized)?;
            let client_id =
                binding
                    .client_id
                    .clone()
                    .ok_or_else(|| AuthError::ConfigurationMissing {
                        resource: self.client_id_resource.clone(),
                    })?;
            (Arc::clone(&binding.context), client_id)
        };

        let intent = provider.sign_in_intent(&client_id);
        let token = CorrelationToken::EXTERNAL_SIGN_IN;
        self.correlation.begin(token);

        // Host UI must never unwind into the gateway.
        match catch_unwind(AssertUnwindSafe(|| {
            context.start_activity_for_result(intent, token.code())
        })) {
            Ok(result) => result.map_err(|e| AuthError::LaunchFailed(e.to_string())),
            Err(_) => Err(AuthError::LaunchFailed(
                "host panicked while opening sign-in UI".to_string(),
            )),
        }
    }

    /// Lifecycle hook for results of host-native UI.
    ///
    /// Returns `None` when `request_code` belongs to an unrelated flow; no
    /// event is emitted in that case.
    #[instrument(skip(self, result), fields(result_code = result.result_code))]
    pub fn on_external_result(
        &self,
        request_code: i32,
        result: ExternalResult,
    ) -> Option<OperationHandle> {
        match self.correlation.resolve(request_code)? {
            FlowKind::ExternalSignIn => Some(self.complete_external_sign_in(result)),
        }
    }

    fn complete_external_sign_in(&self, result: ExternalResult) -> OperationHandle {
        let provider = self.provider.clone();
        self.spawn_sign_in("sign_in_with_credential", move |backend| async move {
            let provider = provider.ok_or_else(|| {
                BridgeError::NotAvailable("External identity provider".to_string())
            })?;
            let credential = provider.credential_from_result(&result)?;
            debug!(provider = %credential.provider_id, "Exchanging provider credential");
            backend.sign_in_with_credential(credential).await
        })
    }

    // ------------------------------------------------------------------
    // Account lifecycle side operations
    // ------------------------------------------------------------------

    #[instrument(skip(self))]
    pub fn send_email_verification(&self) -> OperationHandle {
        self.spawn_side_operation(
            "send_email_verification",
            |success| AuthEvent::EmailVerificationSent { success },
            true,
            |backend| async move { backend.send_email_verification().await },
        )
    }

    #[instrument(skip(self), fields(email = %redact_if_sensitive("email", email)))]
    pub fn send_password_reset_email(&self, email: &str) -> OperationHandle {
        let email = email.to_string();
        self.spawn_side_operation(
            "send_password_reset_email",
            |success| AuthEvent::PasswordResetSent { success },
            false,
            move |backend| async move { backend.send_password_reset_email(&email).await },
        )
    }

    #[instrument(skip(self))]
    pub fn delete_user(&self) -> OperationHandle {
        self.spawn_side_operation(
            "delete_user",
            |success| AuthEvent::UserDeleted { success },
            true,
            |backend| async move { backend.delete_user().await },
        )
    }

    /// Signs out of the identity backend and the external provider (if any).
    /// Signing out without a session is not an error.
    #[instrument(skip(self))]
    pub fn sign_out(&self) -> OperationHandle {
        let provider = self.provider.clone();
        self.spawn_side_operation(
            "sign_out",
            |success| AuthEvent::SignOut { success },
            false,
            move |backend| async move {
                let backend_result = backend.sign_out().await;
                let provider_result = match provider {
                    Some(provider) => provider.sign_out().await,
                    None => Ok(()),
                };
                backend_result.and(provider_result)
            },
        )
    }

    // ------------------------------------------------------------------
    // Synchronous reads
    // ------------------------------------------------------------------

    /// Snapshot of the current user; empty without a session.
    pub fn current_user(&self) -> Record {
        user_record(self.backend.current_user().as_ref())
    }

    pub fn is_signed_in(&self) -> bool {
        self.backend.current_user().is_some()
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    fn spawn_sign_in<F, Fut>(&self, operation: &'static str, call: F) -> OperationHandle
    where
        F: FnOnce(Arc<dyn IdentityBackend>) -> Fut,
        Fut: Future<Output = BridgeResult<()>> + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        let dispatcher = self.dispatcher.clone();
        let future = call(Arc::clone(&self.backend));

        self.runtime.spawn(
            async move {
                // The snapshot read is backend code too and stays inside the capture.
                let outcome = capture(async move {
                    future.await?;
                    Ok::<_, BridgeError>(user_record(backend.current_user().as_ref()))
                })
                .await;
                report_sign_in(&dispatcher, operation, outcome);
            }
            .instrument(info_span!("identity_operation", operation)),
        )
    }

    fn spawn_side_operation<F, Fut>(
        &self,
        operation: &'static str,
        event: fn(bool) -> AuthEvent,
        requires_session: bool,
        call: F,
    ) -> OperationHandle
    where
        F: FnOnce(Arc<dyn IdentityBackend>) -> Fut,
        Fut: Future<Output = BridgeResult<()>> + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        let dispatcher = self.dispatcher.clone();
        let future = call(Arc::clone(&self.backend));

        self.runtime.spawn(
            async move {
                let outcome = capture(async move {
                    if requires_session && backend.current_user().is_none() {
                        return Err(BridgeError::backend(NO_SESSION_REASON));
                    }
                    future.await
                })
                .await;
                report_side_operation(&dispatcher, operation, event, outcome);
            }
            .instrument(info_span!("identity_operation", operation)),
        )
    }
}

fn report_sign_in(dispatcher: &EventDispatcher, operation: &str, outcome: Outcome<Record>) {
    match outcome {
        Outcome::Success(user) => {
            info!(operation, "Sign-in succeeded");
            dispatcher.emit(AuthEvent::Success { user }).ok();
        }
        Outcome::Failure(reason) => {
            warn!(operation, reason = %reason, "Sign-in failed");
            dispatcher.emit(AuthEvent::Failure { reason }).ok();
        }
    }
}

fn report_side_operation(
    dispatcher: &EventDispatcher,
    operation: &str,
    event: fn(bool) -> AuthEvent,
    outcome: Outcome<()>,
) {
    match outcome {
        Outcome::Success(()) => {
            info!(operation, "Operation succeeded");
            dispatcher.emit(event(true)).ok();
        }
        Outcome::Failure(reason) => {
            warn!(operation, reason = %reason, "Operation failed");
            dispatcher.emit(event(false)).ok();
            dispatcher.emit(AuthEvent::Failure { reason }).ok();
        }
    }
}
