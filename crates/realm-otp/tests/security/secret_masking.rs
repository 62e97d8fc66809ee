//! Secret material must not leak through formatting or error messages.

use realm_otp::{
    decode_secret, CredentialStore, InMemoryCredentialStore, OtpCredential, OtpError, OtpSecret,
};

const SECRET_B32: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

#[test]
fn secret_debug_is_masked() {
    let secret = decode_secret(SECRET_B32).expect("decode");
    let debug = format!("{secret:?}");
    assert_eq!(debug, "OtpSecret(***)");
    assert!(!debug.contains("1234"));
}

#[test]
fn credential_debug_masks_secret() {
    let credential = OtpCredential {
        id: "user-1".to_owned(),
        realm: "test".to_owned(),
        secret: OtpSecret::from_bytes(b"12345678901234567890"),
        counter: 7,
    };
    let debug = format!("{credential:?}");
    assert!(debug.contains("OtpSecret(***)"), "got: {debug}");
    assert!(!debug.contains("12345678901234567890"), "got: {debug}");

    let store = InMemoryCredentialStore::new();
    store.save(credential).expect("save");
    let debug = format!("{store:?}");
    assert!(!debug.contains("12345678901234567890"), "got: {debug}");
}

#[test]
fn decode_error_does_not_echo_input() {
    // Mostly valid secret with one foreign symbol near the end.
    let input = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJ1";
    let err = decode_secret(input).expect_err("must fail");
    assert!(matches!(err, OtpError::InvalidSecretEncoding(_)));
    let message = err.to_string();
    assert!(
        !message.contains("GEZDGNBV"),
        "error message must not echo the secret: {message}"
    );
}
