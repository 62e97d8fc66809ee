//! Error types for `realm-otp`.

use thiserror::Error;

/// Errors produced by OTP operations.
///
/// A wrong or stale code is not an error: verification reports it as
/// [`MatchResult::NoMatch`](crate::MatchResult::NoMatch). Messages never carry
/// secret material or codes.
#[derive(Debug, Error)]
pub enum OtpError {
    /// The stored shared secret is not valid base32 (bad alphabet, padding, or length).
    #[error("invalid secret encoding: {0}")]
    InvalidSecretEncoding(String),

    /// Digits, period, or algorithm outside the supported set.
    #[error("invalid OTP policy: {0}")]
    InvalidPolicy(String),

    /// No credential is stored under the given ID.
    #[error("credential not found: {0}")]
    CredentialNotFound(String),

    /// The OS CSPRNG failed while generating a new secret.
    #[error("secret generation failed: {0}")]
    SecretGeneration(String),

    /// A value could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A policy or credential store failed.
    #[error("store error: {0}")]
    Store(String),
}
