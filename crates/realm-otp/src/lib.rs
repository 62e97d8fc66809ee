//! `realm-otp`: HOTP (RFC 4226) and TOTP (RFC 6238) for realm OTP policies.
//!
//! The engine is pure computation: no clock reads, no storage, no I/O.
//! Counters, time and policies come in as parameters; the [`Authenticator`]
//! wires the engine to caller-provided stores and a [`TimeSource`].

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;

pub mod policy;
pub mod secret;

pub mod hotp;
pub mod totp;
pub mod verify;

pub mod clock;
pub mod store;

pub mod authenticator;

pub use authenticator::Authenticator;
pub use clock::{FixedClock, SystemClock, TimeSource};
pub use error::OtpError;
pub use hotp::generate_hotp;
pub use policy::{
    OtpAlgorithm, OtpMode, OtpPolicy, DEFAULT_DIGITS, DEFAULT_LOOK_AHEAD_WINDOW, DEFAULT_PERIOD,
    MAX_DIGITS, MIN_DIGITS,
};
pub use secret::{decode_secret, OtpSecret, DEFAULT_SECRET_LEN};
pub use store::{
    CredentialStore, InMemoryCredentialStore, InMemoryPolicyStore, OtpCredential, PolicyStore,
};
pub use totp::{generate_totp, time_step};
pub use verify::{verify_hotp, verify_totp, MatchResult};
