//! Enrollment and login flows over the policy store, credential store and clock.
//!
//! Each call reads one policy snapshot and uses it for the whole attempt.
//! HOTP counters advance through
//! [`CredentialStore::compare_and_swap_counter`], so two logins racing with
//! the same code cannot both succeed.

use crate::secret::decode_secret;
use crate::store::{CredentialStore, OtpCredential, PolicyStore};
use crate::verify::{verify_hotp, verify_totp};
use crate::{MatchResult, OtpError, OtpMode, OtpPolicy, TimeSource};

/// Runs OTP enrollment and login for one deployment.
#[derive(Debug)]
pub struct Authenticator<P, C, T> {
    policies: P,
    credentials: C,
    clock: T,
}

impl<P, C, T> Authenticator<P, C, T>
where
    P: PolicyStore,
    C: CredentialStore,
    T: TimeSource,
{
    /// Wire the collaborators together.
    pub const fn new(policies: P, credentials: C, clock: T) -> Self {
        Self {
            policies,
            credentials,
            clock,
        }
    }

    /// The policy store.
    pub const fn policies(&self) -> &P {
        &self.policies
    }

    /// The credential store.
    pub const fn credentials(&self) -> &C {
        &self.credentials
    }

    /// The time source.
    pub const fn clock(&self) -> &T {
        &self.clock
    }

    /// Confirm a new OTP device by checking its first code, then store the credential.
    ///
    /// HOTP devices are checked from the realm's `initial_counter` and stored
    /// with the counter after the one that matched. A match at `u64::MAX`
    /// leaves no counter to store and is reported as `NoMatch`. On `NoMatch`
    /// nothing is stored.
    ///
    /// # Errors
    /// Returns `OtpError::InvalidSecretEncoding` for a malformed secret,
    /// `OtpError::InvalidPolicy` for an invalid realm policy, or
    /// `OtpError::Store` if a store fails.
    pub fn enroll(
        &self,
        realm: &str,
        credential_id: &str,
        encoded_secret: &str,
        presented_code: &str,
    ) -> Result<MatchResult, OtpError> {
        let policy = self.policies.active_policy(realm)?;
        let secret = decode_secret(encoded_secret)?;

        let result = match policy.mode {
            OtpMode::Hotp => verify_hotp(
                secret.expose(),
                presented_code,
                &policy,
                policy.initial_counter,
            )?,
            OtpMode::Totp => verify_totp(
                secret.expose(),
                presented_code,
                &policy,
                self.clock.now_unix(),
            )?,
        };

        if !result.is_match() {
            tracing::info!(realm, credential_id, "OTP enrollment rejected: code did not match");
            return Ok(MatchResult::NoMatch);
        }

        let counter = match policy.mode {
            OtpMode::Hotp => {
                let Some(next) = result.next_counter() else {
                    tracing::warn!(realm, credential_id, "HOTP counter exhausted; rejecting code");
                    return Ok(MatchResult::NoMatch);
                };
                next
            }
            OtpMode::Totp => 0,
        };
        self.credentials.save(OtpCredential {
            id: credential_id.to_owned(),
            realm: realm.to_owned(),
            secret,
            counter,
        })?;
        tracing::info!(realm, credential_id, mode = ?policy.mode, "OTP credential enrolled");
        Ok(result)
    }

    /// Check a login code against a stored credential.
    ///
    /// The realm's current policy applies, so a policy change takes effect
    /// for existing credentials at their next login. For HOTP the stored
    /// counter advances past the matched one; if a concurrent login advanced
    /// it first, this attempt reports `NoMatch`.
    ///
    /// # Errors
    /// Returns `OtpError::CredentialNotFound` for an unknown ID,
    /// `OtpError::InvalidPolicy` for an invalid realm policy, or
    /// `OtpError::Store` if a store fails.
    pub fn authenticate(
        &self,
        credential_id: &str,
        presented_code: &str,
    ) -> Result<MatchResult, OtpError> {
        let credential = self
            .credentials
            .load(credential_id)?
            .ok_or_else(|| OtpError::CredentialNotFound(credential_id.to_owned()))?;
        let policy = self.policies.active_policy(&credential.realm)?;

        match policy.mode {
            OtpMode::Totp => verify_totp(
                credential.secret.expose(),
                presented_code,
                &policy,
                self.clock.now_unix(),
            ),
            OtpMode::Hotp => self.authenticate_hotp(&credential, presented_code, &policy),
        }
    }

    fn authenticate_hotp(
        &self,
        credential: &OtpCredential,
        presented_code: &str,
        policy: &OtpPolicy,
    ) -> Result<MatchResult, OtpError> {
        let result = verify_hotp(
            credential.secret.expose(),
            presented_code,
            policy,
            credential.counter,
        )?;
        let Some(next) = result.next_counter() else {
            if result.is_match() {
                tracing::warn!(
                    credential_id = %credential.id,
                    "HOTP counter exhausted; rejecting code"
                );
            }
            return Ok(MatchResult::NoMatch);
        };
        if self
            .credentials
            .compare_and_swap_counter(&credential.id, credential.counter, next)?
        {
            Ok(result)
        } else {
            tracing::warn!(
                credential_id = %credential.id,
                "HOTP counter advanced concurrently; rejecting code"
            );
            Ok(MatchResult::NoMatch)
        }
    }

    /// Delete a credential.
    ///
    /// # Errors
    /// Returns `OtpError::CredentialNotFound` if no such credential exists,
    /// or `OtpError::Store` if the store fails.
    pub fn remove(&self, credential_id: &str) -> Result<(), OtpError> {
        if self.credentials.remove(credential_id)? {
            tracing::info!(credential_id, "OTP credential removed");
            Ok(())
        } else {
            Err(OtpError::CredentialNotFound(credential_id.to_owned()))
        }
    }
}
