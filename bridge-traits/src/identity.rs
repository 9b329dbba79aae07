//! Identity Backend Bridges
//!
//! The identity service holds the ambient "current user". The gateway never
//! caches it; every read goes through [`IdentityBackend::current_user`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{error::Result, host::ExternalResult, record::Record};

/// Snapshot of the signed-in user as reported by the identity backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    pub email_verified: bool,
    pub is_anonymous: bool,
}

impl UserProfile {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            ..Default::default()
        }
    }
}

/// Credential issued by an external identity provider, exchanged with the
/// identity backend for a session.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderCredential {
    pub provider_id: String,
    pub id_token: String,
    pub access_token: Option<String>,
}

impl fmt::Debug for ProviderCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCredential")
            .field("provider_id", &self.provider_id)
            .field("id_token", &"[REDACTED]")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Everything the host needs to open the provider's sign-in UI.
#[derive(Debug, Clone, PartialEq)]
pub struct SignInIntent {
    pub provider_id: String,
    pub client_id: String,
    pub scopes: Vec<String>,
    pub extras: Record,
}

/// Remote identity service.
///
/// Each async method resolves once the backend has completed the call.
/// Failures carry the backend's reason text.
#[async_trait]
pub trait IdentityBackend: Send + Sync {
    async fn sign_in_anonymously(&self) -> Result<()>;

    async fn create_user_with_email_password(&self, email: &str, password: &str) -> Result<()>;

    async fn sign_in_with_email_password(&self, email: &str, password: &str) -> Result<()>;

    async fn sign_in_with_credential(&self, credential: ProviderCredential) -> Result<()>;

    async fn send_email_verification(&self) -> Result<()>;

    async fn send_password_reset_email(&self, email: &str) -> Result<()>;

    async fn delete_user(&self) -> Result<()>;

    /// Signing out without a session is a no-op success.
    async fn sign_out(&self) -> Result<()>;

    fn current_user(&self) -> Option<UserProfile>;
}

/// External identity provider driving host-native sign-in UI (e.g. Google).
#[async_trait]
pub trait ExternalIdentityProvider: Send + Sync {
    fn provider_id(&self) -> &str;

    /// Build the intent for the host UI. `client_id` is the pre-registered
    /// web client identifier resolved during `init`.
    fn sign_in_intent(&self, client_id: &str) -> SignInIntent;

    /// Extract a credential from the result the host delivered.
    fn credential_from_result(&self, result: &ExternalResult) -> Result<ProviderCredential>;

    /// Forget the provider-side account so the next sign-in shows the chooser.
    async fn sign_out(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_debug_redacts_tokens() {
        let credential = ProviderCredential {
            provider_id: "google.com".to_string(),
            id_token: "secret-id-token".to_string(),
            access_token: Some("secret-access".to_string()),
        };

        let rendered = format!("{:?}", credential);
        assert!(rendered.contains("google.com"));
        assert!(!rendered.contains("secret-id-token"));
        assert!(!rendered.contains("secret-access"));
    }

    #[test]
    fn test_user_profile_new() {
        let profile = UserProfile::new("u-1");
        assert_eq!(profile.uid, "u-1");
        assert!(profile.email.is_none());
        assert!(!profile.email_verified);
    }
}
