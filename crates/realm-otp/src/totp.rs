//! RFC 6238 TOTP generation.
//!
//! The current time is always a parameter; nothing in this module reads a
//! clock. Callers obtain it from a [`TimeSource`](crate::TimeSource).

use crate::hotp::generate_hotp;
use crate::{OtpError, OtpPolicy};

/// Time step containing `at_time`: `T = floor(at_time / period)` (RFC 6238 §4).
///
/// # Errors
/// Returns `OtpError::InvalidPolicy` if `period` is 0.
pub fn time_step(at_time: u64, period: u32) -> Result<u64, OtpError> {
    at_time
        .checked_div(u64::from(period))
        .ok_or_else(|| OtpError::InvalidPolicy("period must be > 0".to_owned()))
}

/// Generate a TOTP code per RFC 6238.
///
/// # Arguments
/// - `secret`: Shared secret key bytes
/// - `at_time`: Unix timestamp in seconds
/// - `policy`: supplies the period, HMAC algorithm and digit count
///
/// # Errors
/// Returns `OtpError::InvalidPolicy` if the policy does not validate or its
/// period is 0.
#[must_use = "OTP code should be used or stored"]
pub fn generate_totp(secret: &[u8], at_time: u64, policy: &OtpPolicy) -> Result<String, OtpError> {
    policy.validate()?;
    let counter = time_step(at_time, policy.period)?;
    generate_hotp(secret, counter, policy)
}
