//! Per-realm OTP policy.
//!
//! An [`OtpPolicy`] is a plain value: callers read a snapshot from their
//! policy store at the start of an operation and pass it by reference, so an
//! administrator replacing the realm policy never affects an attempt already
//! in flight.

use std::fmt;
use std::str::FromStr;

use ring::hmac;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::OtpError;

// ── Constants ───────────────────────────────────────────────────────

/// Default TOTP period in seconds (RFC 6238 §4).
pub const DEFAULT_PERIOD: u32 = 30;

/// Default number of digits in a code.
pub const DEFAULT_DIGITS: u8 = 6;

/// Default look-ahead window (one extra counter or time step).
pub const DEFAULT_LOOK_AHEAD_WINDOW: u32 = 1;

/// Smallest supported code length (RFC 4226 §5.3).
pub const MIN_DIGITS: u8 = 6;

/// Largest supported code length. A 31-bit truncated value has at most 10 decimal digits.
pub const MAX_DIGITS: u8 = 10;

// ── Types ───────────────────────────────────────────────────────────

/// HMAC algorithm used for OTP generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OtpAlgorithm {
    /// HMAC-SHA1 (RFC 4226 default).
    #[default]
    Sha1,
    /// HMAC-SHA256.
    Sha256,
    /// HMAC-SHA512.
    Sha512,
}

impl OtpAlgorithm {
    /// Map to the corresponding `ring::hmac::Algorithm`.
    pub(crate) fn to_ring_algorithm(self) -> hmac::Algorithm {
        match self {
            Self::Sha1 => hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY,
            Self::Sha256 => hmac::HMAC_SHA256,
            Self::Sha512 => hmac::HMAC_SHA512,
        }
    }

    /// Realm-representation name (`HmacSHA1`, `HmacSHA256`, `HmacSHA512`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sha1 => "HmacSHA1",
            Self::Sha256 => "HmacSHA256",
            Self::Sha512 => "HmacSHA512",
        }
    }
}

impl fmt::Display for OtpAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OtpAlgorithm {
    type Err = OtpError;

    /// Accepts `HmacSHA256`, `SHA256`, `SHA-256`, `sha256` and the like.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_uppercase();
        let name = normalized.strip_prefix("HMAC").unwrap_or(&normalized);
        match name {
            "SHA1" => Ok(Self::Sha1),
            "SHA256" => Ok(Self::Sha256),
            "SHA512" => Ok(Self::Sha512),
            _ => Err(OtpError::InvalidPolicy(format!(
                "unsupported algorithm: {s:?} (expected HmacSHA1, HmacSHA256 or HmacSHA512)"
            ))),
        }
    }
}

impl Serialize for OtpAlgorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OtpAlgorithm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Whether codes are keyed by a stored counter or by the current time step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpMode {
    /// Counter-based (RFC 4226).
    Hotp,
    /// Time-based (RFC 6238).
    #[default]
    Totp,
}

/// Realm OTP policy.
///
/// Deserializes from camelCase JSON and also accepts the realm
/// representation names (`otpPolicyType`, `otpPolicyDigits`, ...).
/// Missing fields take the defaults of [`OtpPolicy::default`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OtpPolicy {
    /// HOTP or TOTP.
    #[serde(alias = "otpPolicyType")]
    pub mode: OtpMode,

    /// HMAC hash function.
    #[serde(alias = "otpPolicyAlgorithm")]
    pub algorithm: OtpAlgorithm,

    /// Code length, 6 to 10 digits.
    #[serde(alias = "otpPolicyDigits")]
    pub digits: u8,

    /// TOTP time step in seconds. Ignored in HOTP mode.
    #[serde(alias = "otpPolicyPeriod")]
    pub period: u32,

    /// Number of counters (HOTP) or time steps (TOTP) accepted beyond the expected one.
    #[serde(alias = "otpPolicyLookAheadWindow")]
    pub look_ahead_window: u32,

    /// Counter a freshly enrolled HOTP credential starts at.
    #[serde(alias = "otpPolicyInitialCounter")]
    pub initial_counter: u64,
}

impl Default for OtpPolicy {
    fn default() -> Self {
        Self {
            mode: OtpMode::Totp,
            algorithm: OtpAlgorithm::Sha1,
            digits: DEFAULT_DIGITS,
            period: DEFAULT_PERIOD,
            look_ahead_window: DEFAULT_LOOK_AHEAD_WINDOW,
            initial_counter: 0,
        }
    }
}

impl OtpPolicy {
    /// Check that digits and period are within supported ranges.
    ///
    /// # Errors
    /// Returns `OtpError::InvalidPolicy` naming the offending field.
    pub fn validate(&self) -> Result<(), OtpError> {
        if !(MIN_DIGITS..=MAX_DIGITS).contains(&self.digits) {
            return Err(OtpError::InvalidPolicy(format!(
                "unsupported digit count: {} (expected {MIN_DIGITS} to {MAX_DIGITS})",
                self.digits
            )));
        }
        if self.mode == OtpMode::Totp && self.period == 0 {
            return Err(OtpError::InvalidPolicy("period must be > 0".to_owned()));
        }
        Ok(())
    }

    /// Deserialize a policy from JSON and validate it.
    ///
    /// # Errors
    /// Returns `OtpError::InvalidPolicy` if the JSON is malformed or the
    /// resulting policy does not validate.
    pub fn from_json(json: &str) -> Result<Self, OtpError> {
        let policy: Self = serde_json::from_str(json)
            .map_err(|e| OtpError::InvalidPolicy(format!("malformed policy JSON: {e}")))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Serialize the policy to camelCase JSON.
    ///
    /// # Errors
    /// Returns `OtpError::Serialization` if serialization fails.
    pub fn to_json(&self) -> Result<String, OtpError> {
        serde_json::to_string(self).map_err(|e| OtpError::Serialization(format!("policy: {e}")))
    }

    /// Truncation modulus, `10^digits`.
    pub(crate) fn modulus(&self) -> Result<u64, OtpError> {
        10_u64
            .checked_pow(u32::from(self.digits))
            .ok_or_else(|| OtpError::InvalidPolicy(format!("digit count {} overflows", self.digits)))
    }
}
