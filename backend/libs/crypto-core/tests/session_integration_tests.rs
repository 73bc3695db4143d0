/// Integration tests for crypto-core login primitives
///
/// This test module covers:
/// - Password hash then verify, as done at registration and login
/// - Session token issue and validation through the public API
/// - Tampered and foreign tokens
use crypto_core::{hash_password, verify_password, CryptoError, SessionKeys};

const TEST_SECRET: &[u8] = b"integration-test-secret-0123456789abcdef";

#[test]
fn test_login_flow() {
    let stored = hash_password("somepassword").expect("hash");
    assert!(verify_password("somepassword", &stored).unwrap());
    assert!(!verify_password("wrong", &stored).unwrap());

    let keys = SessionKeys::from_secret(TEST_SECRET, 60 * 60 * 24 * 14).unwrap();
    let token = keys.issue(2, "Trump").unwrap();
    let claims = keys.validate(&token).unwrap();

    assert_eq!(claims.user_id().unwrap(), 2);
    assert_eq!(claims.username, "Trump");
}

#[test]
fn test_tampered_payload_rejected() {
    let keys = SessionKeys::from_secret(TEST_SECRET, 3600).unwrap();
    let token = keys.issue(1, "James").unwrap();

    // Swap the payload for one issued to another user, keeping the signature
    let other = keys.issue(2, "Trump").unwrap();
    let parts: Vec<&str> = token.split('.').collect();
    let other_parts: Vec<&str> = other.split('.').collect();
    let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

    assert!(matches!(
        keys.validate(&forged),
        Err(CryptoError::InvalidToken(_))
    ));
}

#[test]
fn test_malformed_hash_reported() {
    assert!(matches!(
        verify_password("somepassword", "not-a-phc-string"),
        Err(CryptoError::MalformedHash(_))
    ));
}
