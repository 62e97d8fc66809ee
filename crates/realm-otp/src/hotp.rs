//! RFC 4226 HOTP generation.
//!
//! Uses `ring::hmac` for HMAC-SHA1, HMAC-SHA256, and HMAC-SHA512 as selected
//! by the realm [`OtpPolicy`].

use ring::hmac;

use crate::{OtpError, OtpPolicy};

/// Generate an HOTP code per RFC 4226.
///
/// # Arguments
/// - `secret`: Shared secret key bytes (from `OtpSecret::expose()`)
/// - `counter`: 8-byte counter value (big-endian per RFC 4226 §5.2)
/// - `policy`: supplies the HMAC algorithm and digit count
///
/// # Errors
/// Returns `OtpError::InvalidPolicy` if the policy does not validate.
#[must_use = "OTP code should be used or stored"]
pub fn generate_hotp(secret: &[u8], counter: u64, policy: &OtpPolicy) -> Result<String, OtpError> {
    policy.validate()?;
    let key = signing_key(secret, policy);
    code_for_counter(&key, counter, policy)
}

/// Build the HMAC key once so a window search does not re-derive it per counter.
pub(crate) fn signing_key(secret: &[u8], policy: &OtpPolicy) -> hmac::Key {
    hmac::Key::new(policy.algorithm.to_ring_algorithm(), secret)
}

/// HMAC(K, C), truncate, reduce and zero-pad. The policy must already be validated.
pub(crate) fn code_for_counter(
    key: &hmac::Key,
    counter: u64,
    policy: &OtpPolicy,
) -> Result<String, OtpError> {
    let tag = hmac::sign(key, &counter.to_be_bytes());
    let binary_code = dynamic_truncate(tag.as_ref());

    // modulus is 10^digits with digits in 6..=10 (never zero).
    let modulus = policy.modulus()?;
    #[allow(clippy::arithmetic_side_effects)]
    let code = u64::from(binary_code) % modulus;
    let width = usize::from(policy.digits);

    Ok(format!("{code:0>width$}"))
}

/// Dynamic Truncation (RFC 4226 §5.3).
///
/// `digest` is a full HMAC output (20, 32 or 64 bytes), so `offset + 3` is
/// always in bounds.
fn dynamic_truncate(digest: &[u8]) -> u32 {
    // offset = low-order 4 bits of last byte.
    let offset = usize::from(digest[digest.len().wrapping_sub(1)] & 0x0F);

    // Extract 4 bytes starting at offset, mask high bit (0x7FFFFFFF).
    u32::from_be_bytes([
        digest[offset] & 0x7F,
        digest[offset.wrapping_add(1)],
        digest[offset.wrapping_add(2)],
        digest[offset.wrapping_add(3)],
    ])
}
