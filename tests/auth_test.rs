//! JWT validation against a shared HS256 secret.
//!
//! Tokens are minted locally with the same secret the server is configured
//! with; no running server or identity provider is needed.
//!
//! Run with: `cargo test --test auth_test`
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use uuid::Uuid;

use assignpro_backend::auth::jwt::{Claims, TokenError, TokenVerifier, validate_with_secret};

/// A fake secret for testing: never use the real one in tests committed to git.
const TEST_SECRET: &str = "test-secret-at-least-256-bits-long-for-hs256-xxxxxxx";

fn mint(claims: &Claims, secret: &str) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to encode test JWT")
}

fn claims_for(sub: &str, expires_in: i64) -> Claims {
    let now = Utc::now().timestamp();
    Claims {
        sub: sub.to_string(),
        exp: (now + expires_in) as usize,
        iat: Some(now as usize),
        iss: Some("https://example.supabase.co/auth/v1".to_string()),
        email: Some("worker@example.com".to_string()),
        role: Some("authenticated".to_string()),
    }
}

#[test]
fn test_valid_token_decodes_correctly() {
    let user_id = Uuid::new_v4();
    let token = mint(&claims_for(&user_id.to_string(), 3600), TEST_SECRET);

    let claims = validate_with_secret(&token, TEST_SECRET).expect("Token should be valid");

    assert_eq!(claims.sub, user_id.to_string());
    assert_eq!(claims.email.as_deref(), Some("worker@example.com"));
    assert_eq!(claims.user_id().unwrap(), user_id);
}

#[test]
fn test_expired_token_is_rejected() {
    // Well past the 60s default leeway.
    let token = mint(&claims_for(&Uuid::new_v4().to_string(), -300), TEST_SECRET);

    match validate_with_secret(&token, TEST_SECRET) {
        Err(TokenError::Invalid(e)) => assert!(matches!(e.kind(), ErrorKind::ExpiredSignature)),
        other => panic!("expected expired signature, got {other:?}"),
    }
}

#[test]
fn test_wrong_secret_is_rejected() {
    let token = mint(&claims_for(&Uuid::new_v4().to_string(), 3600), TEST_SECRET);

    match validate_with_secret(&token, "completely-wrong-secret-xxxxxxxxxxxxxxxxxxx") {
        Err(TokenError::Invalid(e)) => assert!(matches!(e.kind(), ErrorKind::InvalidSignature)),
        other => panic!("expected invalid signature, got {other:?}"),
    }
}

#[test]
fn test_garbage_token_is_rejected() {
    assert!(validate_with_secret("not.a.valid.jwt", TEST_SECRET).is_err());
}

#[test]
fn test_non_uuid_subject_is_reported() {
    let token = mint(&claims_for("service-role", 3600), TEST_SECRET);
    let claims = validate_with_secret(&token, TEST_SECRET).unwrap();

    assert!(matches!(claims.user_id(), Err(TokenError::Subject(_))));
}

#[tokio::test]
async fn test_secret_verifier_accepts_minted_tokens() {
    let user_id = Uuid::new_v4();
    let token = mint(&claims_for(&user_id.to_string(), 3600), TEST_SECRET);
    let verifier = TokenVerifier::Secret(TEST_SECRET.to_string());

    let claims = verifier.verify(&token).await.unwrap();
    assert_eq!(claims.user_id().unwrap(), user_id);
}
