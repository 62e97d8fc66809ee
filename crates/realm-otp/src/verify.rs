//! Code verification with a forward-only look-ahead window.
//!
//! Both schemes check the expected counter and the next
//! `policy.look_ahead_window` counters. There is no backward tolerance: a
//! TOTP code from the previous time step is rejected, and an HOTP code below
//! the stored counter can never match again.

use crate::hotp::{code_for_counter, signing_key};
use crate::totp::time_step;
use crate::{OtpError, OtpPolicy};

/// Outcome of a verification attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatchResult {
    /// The presented code equals the code for this counter (or time step).
    Matched(u64),
    /// No candidate in the window produced the presented code.
    NoMatch,
}

impl MatchResult {
    /// Returns `true` for [`MatchResult::Matched`].
    #[must_use]
    pub const fn is_match(self) -> bool {
        matches!(self, Self::Matched(_))
    }

    /// The counter that matched, if any.
    #[must_use]
    pub const fn matched_counter(self) -> Option<u64> {
        match self {
            Self::Matched(counter) => Some(counter),
            Self::NoMatch => None,
        }
    }

    /// The HOTP counter to persist after this result: `matched + 1`.
    ///
    /// Storing it makes the matched code and every earlier one unusable.
    /// `None` for `NoMatch`, and for a match at `u64::MAX`, where the counter
    /// has nowhere left to go and the code must not be accepted.
    #[must_use]
    pub const fn next_counter(self) -> Option<u64> {
        match self {
            Self::Matched(counter) => counter.checked_add(1),
            Self::NoMatch => None,
        }
    }
}

/// Verify an HOTP code against `stored_counter ..= stored_counter + look_ahead_window`.
///
/// On a match the caller should persist [`MatchResult::next_counter`]. On
/// `NoMatch` the stored counter stays as it is.
///
/// # Errors
/// Returns `OtpError::InvalidPolicy` if the policy does not validate.
#[must_use = "verification result should be checked"]
pub fn verify_hotp(
    secret: &[u8],
    presented_code: &str,
    policy: &OtpPolicy,
    stored_counter: u64,
) -> Result<MatchResult, OtpError> {
    policy.validate()?;
    search_window(secret, presented_code, policy, stored_counter)
}

/// Verify a TOTP code against the time step containing `at_time` and the
/// `look_ahead_window` steps after it.
///
/// # Errors
/// Returns `OtpError::InvalidPolicy` if the policy does not validate or its
/// period is 0.
#[must_use = "verification result should be checked"]
pub fn verify_totp(
    secret: &[u8],
    presented_code: &str,
    policy: &OtpPolicy,
    at_time: u64,
) -> Result<MatchResult, OtpError> {
    policy.validate()?;
    let base = time_step(at_time, policy.period)?;
    search_window(secret, presented_code, policy, base)
}

/// Check `base ..= base + window` in increasing order; the first match wins.
///
/// Every candidate is generated and compared even after a match, so the
/// amount of work does not depend on where in the window the code matched.
fn search_window(
    secret: &[u8],
    presented_code: &str,
    policy: &OtpPolicy,
    base: u64,
) -> Result<MatchResult, OtpError> {
    // The digit count is public policy; a wrong-length code is simply wrong.
    if presented_code.len() != usize::from(policy.digits) {
        tracing::debug!(
            window = policy.look_ahead_window,
            "OTP rejected: presented code has wrong length"
        );
        return Ok(MatchResult::NoMatch);
    }

    let key = signing_key(secret, policy);
    let end = base.saturating_add(u64::from(policy.look_ahead_window));

    let mut matched = None;
    for counter in base..=end {
        let expected = code_for_counter(&key, counter, policy)?;
        let equal = constant_time_eq(expected.as_bytes(), presented_code.as_bytes());
        if equal && matched.is_none() {
            matched = Some(counter);
        }
    }

    Ok(match matched {
        Some(counter) => {
            tracing::debug!(
                offset = counter.wrapping_sub(base),
                window = policy.look_ahead_window,
                "OTP matched"
            );
            MatchResult::Matched(counter)
        }
        None => {
            tracing::debug!(window = policy.look_ahead_window, "OTP did not match");
            MatchResult::NoMatch
        }
    })
}

/// Constant-time byte comparison for OTP codes.
///
/// Returns `true` iff both slices have equal length and identical contents.
/// Uses bitwise OR accumulation to avoid short-circuit timing leaks.
///
/// The early return on length mismatch is acceptable because the expected
/// digit count is public policy. The constant-time property protects the
/// code value, not its length.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    std::hint::black_box(diff) == 0
}
