use clinassist_auth::jwt::{inspect_claims, is_expired};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::json;

fn token(claims: serde_json::Value) -> String {
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"k")).unwrap()
}

#[test]
fn reads_claims_without_the_signing_key() {
    let claims = inspect_claims(&token(json!({"sub": "claire", "exp": 2_000, "iat": 1_000}))).unwrap();

    assert_eq!(claims.sub.as_deref(), Some("claire"));
    assert_eq!(claims.exp, Some(2_000));
    assert_eq!(claims.iat, Some(1_000));
}

#[test]
fn expiry_is_inclusive() {
    let t = token(json!({"exp": 2_000}));

    assert!(!is_expired(&t, 1_999));
    assert!(is_expired(&t, 2_000));
    assert!(is_expired(&t, 2_001));
}

#[test]
fn missing_exp_never_expires() {
    assert!(!is_expired(&token(json!({"sub": "x"})), i64::MAX));
}

#[test]
fn opaque_tokens_are_not_jwts() {
    assert!(inspect_claims("opaque").is_err());
    assert!(!is_expired("opaque", i64::MAX));
    assert!(!is_expired("a.b.c", i64::MAX));
}
