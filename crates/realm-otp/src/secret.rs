//! Shared-secret handling and the base32 secret codec.
//!
//! Secrets are held in [`OtpSecret`], which:
//! - Zeroes its bytes on drop via [`zeroize`] (through `secrecy`)
//! - Masks output in `Debug`/`Display` so secrets never reach logs
//!
//! At rest a secret is RFC 4648 base32. [`decode_secret`] turns that form
//! back into key bytes and refuses anything that would not round-trip.

use std::fmt;

use data_encoding::{BASE32, BASE32_NOPAD};
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretSlice};
use zeroize::Zeroizing;

use crate::OtpError;

/// Length in bytes of secrets created by [`OtpSecret::generate_default`] (160 bits, RFC 4226 §4).
pub const DEFAULT_SECRET_LEN: usize = 20;

// ---------------------------------------------------------------------------
// OtpSecret
// ---------------------------------------------------------------------------

/// HMAC key shared between the server and the user's authenticator.
pub struct OtpSecret {
    inner: SecretSlice<u8>,
}

impl OtpSecret {
    /// Create a secret by copying the given key bytes.
    ///
    /// The caller should zeroize the source data afterwards.
    #[must_use]
    pub fn from_bytes(data: &[u8]) -> Self {
        Self {
            inner: data.to_vec().into(),
        }
    }

    /// Create a secret of `len` bytes from the OS CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns `OtpError::SecretGeneration` if `len` is zero or the CSPRNG fails.
    pub fn generate(len: usize) -> Result<Self, OtpError> {
        if len == 0 {
            return Err(OtpError::SecretGeneration(
                "secret length must be > 0".to_owned(),
            ));
        }
        let mut bytes = Zeroizing::new(vec![0u8; len]);
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| OtpError::SecretGeneration(format!("CSPRNG fill failed: {e}")))?;
        Ok(Self::from_bytes(&bytes))
    }

    /// Create a [`DEFAULT_SECRET_LEN`]-byte random secret.
    ///
    /// # Errors
    ///
    /// Returns `OtpError::SecretGeneration` if the CSPRNG fails.
    pub fn generate_default() -> Result<Self, OtpError> {
        Self::generate(DEFAULT_SECRET_LEN)
    }

    /// Expose the key bytes. Only for feeding the HMAC.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        self.inner.expose_secret()
    }

    /// Returns the number of key bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.expose_secret().len()
    }

    /// Returns `true` if the secret holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encode the secret in its at-rest form (RFC 4648 base32, padded).
    ///
    /// The returned string is wrapped in [`Zeroizing`] so it is wiped once the
    /// caller has persisted or displayed it.
    #[must_use]
    pub fn to_base32(&self) -> Zeroizing<String> {
        Zeroizing::new(BASE32.encode(self.expose()))
    }
}

impl Clone for OtpSecret {
    fn clone(&self) -> Self {
        Self::from_bytes(self.expose())
    }
}

impl fmt::Debug for OtpSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpSecret(***)")
    }
}

impl fmt::Display for OtpSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpSecret(***)")
    }
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// Decode a base32 secret into key bytes.
///
/// ASCII whitespace is ignored and lowercase letters are accepted, so the
/// grouped form shown on enrollment pages (`jbsw y3dp ee`) decodes. Padded
/// input must be fully padded; unpadded input must have a valid base32
/// length. Non-zero trailing bits are rejected.
///
/// # Errors
///
/// Returns `OtpError::InvalidSecretEncoding` if the input is empty or is not
/// canonical base32.
pub fn decode_secret(encoded: &str) -> Result<OtpSecret, OtpError> {
    let normalized: Zeroizing<String> = Zeroizing::new(
        encoded
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect(),
    );
    if normalized.is_empty() {
        return Err(OtpError::InvalidSecretEncoding("empty secret".to_owned()));
    }

    let encoding = if normalized.contains('=') {
        &BASE32
    } else {
        &BASE32_NOPAD
    };
    let bytes = Zeroizing::new(
        encoding
            .decode(normalized.as_bytes())
            .map_err(|e| OtpError::InvalidSecretEncoding(format!("invalid base32: {e}")))?,
    );
    if bytes.is_empty() {
        return Err(OtpError::InvalidSecretEncoding("empty secret".to_owned()));
    }
    Ok(OtpSecret::from_bytes(&bytes))
}
