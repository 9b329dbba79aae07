//! In-process identity service and a scripted external provider.
//!
//! Rejection texts follow the wording hosted identity services use, so
//! host-side error handling can be exercised on desktop.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    host::ExternalResult,
    identity::{ExternalIdentityProvider, IdentityBackend, ProviderCredential, SignInIntent, UserProfile},
    record::Record,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

pub const USER_NOT_FOUND: &str =
    "There is no user record corresponding to this identifier. The user may have been deleted.";
pub const WRONG_PASSWORD: &str = "The password is invalid or the user does not have a password.";
pub const EMAIL_IN_USE: &str = "The email address is already in use by another account.";
pub const WEAK_PASSWORD: &str =
    "The given password is invalid. [ Password should be at least 6 characters ]";
pub const NO_CURRENT_USER: &str = "No user is currently signed in";
pub const MISSING_ID_TOKEN: &str = "Google sign-in result did not carry an ID token";

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    profile: UserProfile,
    password: Option<String>,
}

#[derive(Debug, Default)]
struct IdentityState {
    /// Keyed by uid.
    accounts: HashMap<String, Account>,
    current: Option<String>,
    verification_emails: Vec<String>,
    password_resets: Vec<String>,
}

impl IdentityState {
    fn uid_for_email(&self, email: &str) -> Option<String> {
        self.accounts
            .values()
            .find(|account| account.profile.email.as_deref() == Some(email))
            .map(|account| account.profile.uid.clone())
    }
}

/// Accounts and the current session held in memory.
#[derive(Debug, Default)]
pub struct InMemoryIdentityBackend {
    state: Mutex<IdentityState>,
}

impl InMemoryIdentityBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an e-mail/password account without signing in.
    pub fn with_account(self, email: &str, password: &str) -> Self {
        let mut profile = UserProfile::new(Uuid::new_v4().to_string());
        profile.email = Some(email.to_string());
        self.state.lock().accounts.insert(
            profile.uid.clone(),
            Account {
                profile,
                password: Some(password.to_string()),
            },
        );
        self
    }

    /// Addresses verification e-mails were sent to.
    pub fn verification_emails(&self) -> Vec<String> {
        self.state.lock().verification_emails.clone()
    }

    /// Addresses password-reset e-mails were sent to.
    pub fn password_resets(&self) -> Vec<String> {
        self.state.lock().password_resets.clone()
    }

    pub fn account_count(&self) -> usize {
        self.state.lock().accounts.len()
    }
}

#[async_trait]
impl IdentityBackend for InMemoryIdentityBackend {
    async fn sign_in_anonymously(&self) -> Result<()> {
        let mut profile = UserProfile::new(Uuid::new_v4().to_string());
        profile.is_anonymous = true;

        let mut state = self.state.lock();
        state.current = Some(profile.uid.clone());
        state.accounts.insert(
            profile.uid.clone(),
            Account {
                profile,
                password: None,
            },
        );
        Ok(())
    }

    async fn create_user_with_email_password(&self, email: &str, password: &str) -> Result<()> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(BridgeError::backend(WEAK_PASSWORD));
        }

        let mut state = self.state.lock();
        if state.uid_for_email(email).is_some() {
            return Err(BridgeError::backend(EMAIL_IN_USE));
        }

        let mut profile = UserProfile::new(Uuid::new_v4().to_string());
        profile.email = Some(email.to_string());
        state.current = Some(profile.uid.clone());
        state.accounts.insert(
            profile.uid.clone(),
            Account {
                profile,
                password: Some(password.to_string()),
            },
        );
        Ok(())
    }

    async fn sign_in_with_email_password(&self, email: &str, password: &str) -> Result<()> {
        let mut state = self.state.lock();
        let uid = state
            .uid_for_email(email)
            .ok_or_else(|| BridgeError::backend(USER_NOT_FOUND))?;

        let matches = state
            .accounts
            .get(&uid)
            .and_then(|account| account.password.as_deref())
            == Some(password);
        if !matches {
            return Err(BridgeError::backend(WRONG_PASSWORD));
        }

        state.current = Some(uid);
        Ok(())
    }

    async fn sign_in_with_credential(&self, credential: ProviderCredential) -> Result<()> {
        let uid = format!("{}:{}", credential.provider_id, credential.id_token);

        let mut state = self.state.lock();
        state.accounts.entry(uid.clone()).or_insert_with(|| {
            let mut profile = UserProfile::new(uid.clone());
            profile.email_verified = true;
            Account {
                profile,
                password: None,
            }
        });
        state.current = Some(uid);
        Ok(())
    }

    async fn send_email_verification(&self) -> Result<()> {
        let mut state = self.state.lock();
        let email = state
            .current
            .as_ref()
            .and_then(|uid| state.accounts.get(uid))
            .map(|account| account.profile.email.clone())
            .ok_or_else(|| BridgeError::backend(NO_CURRENT_USER))?;

        match email {
            Some(email) => {
                state.verification_emails.push(email);
                Ok(())
            }
            None => Err(BridgeError::backend(
                "The current user has no e-mail address to verify.",
            )),
        }
    }

    async fn send_password_reset_email(&self, email: &str) -> Result<()> {
        let mut state = self.state.lock();
        if state.uid_for_email(email).is_none() {
            return Err(BridgeError::backend(USER_NOT_FOUND));
        }
        state.password_resets.push(email.to_string());
        Ok(())
    }

    async fn delete_user(&self) -> Result<()> {
        let mut state = self.state.lock();
        let uid = state
            .current
            .take()
            .ok_or_else(|| BridgeError::backend(NO_CURRENT_USER))?;
        state.accounts.remove(&uid);
        debug!("Deleted current account");
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        self.state.lock().current = None;
        Ok(())
    }

    fn current_user(&self) -> Option<UserProfile> {
        let state = self.state.lock();
        state
            .current
            .as_ref()
            .and_then(|uid| state.accounts.get(uid))
            .map(|account| account.profile.clone())
    }
}

/// External provider that reads the ID token straight from the result data
/// (`idToken` key), standing in for a provider SDK on desktop.
#[derive(Debug)]
pub struct ScriptedIdentityProvider {
    provider_id: String,
    sign_outs: Mutex<usize>,
}

impl ScriptedIdentityProvider {
    pub const GOOGLE: &'static str = "google.com";

    pub fn google() -> Self {
        Self {
            provider_id: Self::GOOGLE.to_string(),
            sign_outs: Mutex::new(0),
        }
    }

    pub fn sign_out_count(&self) -> usize {
        *self.sign_outs.lock()
    }
}

#[async_trait]
impl ExternalIdentityProvider for ScriptedIdentityProvider {
    fn provider_id(&self) -> &str {
        &self.provider_id
    }

    fn sign_in_intent(&self, client_id: &str) -> SignInIntent {
        SignInIntent {
            provider_id: self.provider_id.clone(),
            client_id: client_id.to_string(),
            scopes: vec!["openid".to_string(), "email".to_string()],
            extras: Record::new().with("requestIdToken", true),
        }
    }

    fn credential_from_result(&self, result: &ExternalResult) -> Result<ProviderCredential> {
        if !result.is_ok() {
            return Err(BridgeError::backend(format!(
                "{}: Sign-in was cancelled",
                result.result_code
            )));
        }

        let data = result.data.as_ref();
        let id_token = data
            .and_then(|data| data.get("idToken"))
            .and_then(|value| value.as_text())
            .ok_or_else(|| BridgeError::backend(MISSING_ID_TOKEN))?;
        let access_token = data
            .and_then(|data| data.get("accessToken"))
            .and_then(|value| value.as_text())
            .map(str::to_string);

        Ok(ProviderCredential {
            provider_id: self.provider_id.clone(),
            id_token: id_token.to_string(),
            access_token,
        })
    }

    async fn sign_out(&self) -> Result<()> {
        *self.sign_outs.lock() += 1;
        Ok(())
    }
}
