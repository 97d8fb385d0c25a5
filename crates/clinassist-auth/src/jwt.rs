use jsonwebtoken::{DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;

use crate::error::AuthError;

/// Claims the client cares about in a backend access token.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,
}

/// Decode the claims of `token` without verifying its signature.
///
/// The client never holds the backend's signing key; claims are read only
/// to decide locally whether a stored token is worth presenting.
pub fn inspect_claims(token: &str) -> Result<AccessClaims, AuthError> {
    if token.split('.').count() != 3 {
        return Err(AuthError::InvalidToken("not a JWT".to_string()));
    }

    let header = decode_header(token)?;
    let mut validation = Validation::new(header.alg);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<AccessClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}

/// Whether `token` carries an `exp` claim at or before `now_secs`.
///
/// Opaque tokens and JWTs without `exp` are never considered expired.
pub fn is_expired(token: &str, now_secs: i64) -> bool {
    match inspect_claims(token) {
        Ok(AccessClaims { exp: Some(exp), .. }) => exp <= now_secs,
        Ok(_) => false,
        Err(e) => {
            tracing::trace!(error = %e, "access token is opaque; treating as present");
            false
        }
    }
}

pub fn now_secs() -> i64 {
    jiff::Timestamp::now().as_second()
}
