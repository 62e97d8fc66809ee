//! Integration tests for the OTP engine.
//!
//! Tests the full OTP lifecycle: decode → generate → verify, cross-algorithm
//! differentiation, and window boundary behavior.

use realm_otp::{
    decode_secret, generate_hotp, generate_totp, time_step, verify_hotp, verify_totp,
    MatchResult, OtpAlgorithm, OtpMode, OtpPolicy,
};

const SECRET_B32: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";
const SECRET_64: &[u8] = b"1234567890123456789012345678901234567890123456789012345678901234";
const TIME: u64 = 1_700_000_000;

/// Decode the at-rest secret, generate, and verify at the same time.
#[test]
fn decode_generate_verify_same_time() {
    let secret = decode_secret(SECRET_B32).expect("decode");
    let policy = OtpPolicy::default();
    let code = generate_totp(secret.expose(), TIME, &policy).expect("generate");
    let result = verify_totp(secret.expose(), &code, &policy, TIME).expect("verify");
    assert_eq!(result, MatchResult::Matched(time_step(TIME, 30).expect("step")));
}

/// A device one step ahead of the server is accepted with the default window of 1.
#[test]
fn device_clock_one_step_ahead_is_accepted() {
    let secret = decode_secret(SECRET_B32).expect("decode");
    let policy = OtpPolicy::default();
    let code = generate_totp(secret.expose(), TIME + 30, &policy).expect("generate");
    assert!(verify_totp(secret.expose(), &code, &policy, TIME)
        .expect("verify")
        .is_match());
}

/// A device one step behind the server is rejected: the window only looks ahead.
#[test]
fn device_clock_one_step_behind_is_rejected() {
    let secret = decode_secret(SECRET_B32).expect("decode");
    let policy = OtpPolicy::default();
    let code = generate_totp(secret.expose(), TIME - 30, &policy).expect("generate");
    assert_eq!(
        verify_totp(secret.expose(), &code, &policy, TIME).expect("verify"),
        MatchResult::NoMatch
    );
}

/// Generate → verify three steps later fails with the default window.
#[test]
fn generate_then_verify_three_steps_later_fails() {
    let policy = OtpPolicy::default();
    let code = generate_totp(SECRET_64, TIME, &policy).expect("generate");
    assert_eq!(
        verify_totp(SECRET_64, &code, &policy, TIME + 90).expect("verify"),
        MatchResult::NoMatch
    );
}

/// All three algorithms produce codes that verify under their own algorithm only.
#[test]
fn cross_algorithm_differentiation() {
    let policy = |algorithm| OtpPolicy {
        algorithm,
        digits: 8,
        look_ahead_window: 0,
        ..OtpPolicy::default()
    };
    let sha1 = generate_totp(SECRET_64, TIME, &policy(OtpAlgorithm::Sha1)).expect("sha1");
    let sha256 = generate_totp(SECRET_64, TIME, &policy(OtpAlgorithm::Sha256)).expect("sha256");
    let sha512 = generate_totp(SECRET_64, TIME, &policy(OtpAlgorithm::Sha512)).expect("sha512");

    for (code, algorithm) in [
        (&sha1, OtpAlgorithm::Sha1),
        (&sha256, OtpAlgorithm::Sha256),
        (&sha512, OtpAlgorithm::Sha512),
    ] {
        assert!(
            verify_totp(SECRET_64, code, &policy(algorithm), TIME)
                .expect("verify")
                .is_match(),
            "{algorithm} code must verify under {algorithm}"
        );
    }

    let all_same = sha1 == sha256 && sha256 == sha512;
    assert!(!all_same, "different algorithms should produce different codes");
}

/// HOTP resynchronization walk: each accepted code moves the counter past it.
#[test]
fn hotp_counter_walk() {
    let secret = decode_secret(SECRET_B32).expect("decode");
    let policy = OtpPolicy {
        mode: OtpMode::Hotp,
        look_ahead_window: 3,
        ..OtpPolicy::default()
    };

    let mut stored = 0u64;
    for device_counter in [0u64, 1, 4, 5, 8] {
        let code = generate_hotp(secret.expose(), device_counter, &policy).expect("generate");
        let result = verify_hotp(secret.expose(), &code, &policy, stored).expect("verify");
        assert_eq!(result, MatchResult::Matched(device_counter));
        stored = result.next_counter().expect("matched");
    }
    assert_eq!(stored, 9);

    // Device jumped further than the window allows.
    let code = generate_hotp(secret.expose(), stored + 4, &policy).expect("generate");
    assert_eq!(
        verify_hotp(secret.expose(), &code, &policy, stored).expect("verify"),
        MatchResult::NoMatch
    );
}
