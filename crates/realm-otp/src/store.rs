//! Policy and credential collaborators.
//!
//! The engine itself never persists anything. These traits describe what the
//! [`Authenticator`](crate::Authenticator) needs from the surrounding system,
//! and the in-memory implementations back tests and embedders that keep
//! state elsewhere.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use crate::{OtpError, OtpPolicy, OtpSecret};

// ── Policy store ────────────────────────────────────────────────────

/// Supplies the active OTP policy of a realm.
pub trait PolicyStore: Send + Sync {
    /// Snapshot of the realm's current policy.
    ///
    /// # Errors
    /// Returns `OtpError::Store` if the backing store fails.
    fn active_policy(&self, realm: &str) -> Result<OtpPolicy, OtpError>;
}

/// Realm policies held in memory. Realms never configured get
/// [`OtpPolicy::default`].
#[derive(Debug, Default)]
pub struct InMemoryPolicyStore {
    policies: RwLock<HashMap<String, OtpPolicy>>,
}

impl InMemoryPolicyStore {
    /// An empty store: every realm uses the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a realm's policy wholesale.
    ///
    /// Attempts that already took a snapshot keep using it.
    ///
    /// # Errors
    /// Returns `OtpError::InvalidPolicy` if `policy` does not validate (the
    /// stored policy is left untouched), or `OtpError::Store` if the lock is
    /// poisoned.
    pub fn replace_policy(&self, realm: &str, policy: OtpPolicy) -> Result<(), OtpError> {
        if let Err(e) = policy.validate() {
            tracing::warn!(realm, "rejected OTP policy update: {e}");
            return Err(e);
        }
        let mut policies = self
            .policies
            .write()
            .map_err(|_| OtpError::Store("policy store lock poisoned".to_owned()))?;
        policies.insert(realm.to_owned(), policy);
        tracing::info!(realm, mode = ?policy.mode, digits = policy.digits, "OTP policy replaced");
        Ok(())
    }
}

impl PolicyStore for InMemoryPolicyStore {
    fn active_policy(&self, realm: &str) -> Result<OtpPolicy, OtpError> {
        let policies = self
            .policies
            .read()
            .map_err(|_| OtpError::Store("policy store lock poisoned".to_owned()))?;
        Ok(policies.get(realm).copied().unwrap_or_default())
    }
}

// ── Credential store ────────────────────────────────────────────────

/// A user's OTP credential as held by the credential store.
#[derive(Clone, Debug)]
pub struct OtpCredential {
    /// Credential identifier.
    pub id: String,
    /// Realm whose policy governs this credential.
    pub realm: String,
    /// Shared secret.
    pub secret: OtpSecret,
    /// Next HOTP counter to accept. Unused (0) for TOTP credentials.
    pub counter: u64,
}

/// Persists OTP credentials and their HOTP counters.
pub trait CredentialStore: Send + Sync {
    /// Fetch a credential by ID.
    ///
    /// # Errors
    /// Returns `OtpError::Store` if the backing store fails.
    fn load(&self, id: &str) -> Result<Option<OtpCredential>, OtpError>;

    /// Insert or overwrite a credential.
    ///
    /// # Errors
    /// Returns `OtpError::Store` if the backing store fails.
    fn save(&self, credential: OtpCredential) -> Result<(), OtpError>;

    /// Set the counter to `new` only if it still equals `expected`.
    ///
    /// Returns `Ok(false)` when another writer got there first, or when `new`
    /// is not strictly greater than `expected`.
    ///
    /// # Errors
    /// Returns `OtpError::CredentialNotFound` for an unknown ID, or
    /// `OtpError::Store` if the backing store fails.
    fn compare_and_swap_counter(&self, id: &str, expected: u64, new: u64)
        -> Result<bool, OtpError>;

    /// Delete a credential. Returns `true` if it existed.
    ///
    /// # Errors
    /// Returns `OtpError::Store` if the backing store fails.
    fn remove(&self, id: &str) -> Result<bool, OtpError>;
}

/// Credentials held in memory behind a single mutex.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    credentials: Mutex<HashMap<String, OtpCredential>>,
}

impl InMemoryCredentialStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, OtpCredential>>, OtpError> {
        self.credentials
            .lock()
            .map_err(|_| OtpError::Store("credential store lock poisoned".to_owned()))
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn load(&self, id: &str) -> Result<Option<OtpCredential>, OtpError> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn save(&self, credential: OtpCredential) -> Result<(), OtpError> {
        self.lock()?.insert(credential.id.clone(), credential);
        Ok(())
    }

    fn compare_and_swap_counter(
        &self,
        id: &str,
        expected: u64,
        new: u64,
    ) -> Result<bool, OtpError> {
        let mut credentials = self.lock()?;
        let credential = credentials
            .get_mut(id)
            .ok_or_else(|| OtpError::CredentialNotFound(id.to_owned()))?;
        if credential.counter != expected || new <= expected {
            return Ok(false);
        }
        credential.counter = new;
        Ok(true)
    }

    fn remove(&self, id: &str) -> Result<bool, OtpError> {
        Ok(self.lock()?.remove(id).is_some())
    }
}
