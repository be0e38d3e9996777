use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClaimsError {
    #[error("Token could not be decoded: {0}")]
    Malformed(#[from] jsonwebtoken::errors::Error),
}

/// Claims read from the payload of a stored access token.
///
/// These are decoded without checking the signature, so they only describe what the
/// token says about itself. The server still authorizes every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: Option<String>,
    pub role: Option<String>,
    pub exp: Option<i64>,
    pub iat: Option<i64>,
}

impl TokenClaims {
    /// A token without `exp` never counts as expired.
    pub fn is_expired_at(&self, now: i64) -> bool {
        matches!(self.exp, Some(exp) if exp < now)
    }

    pub fn has_role(&self, expected: &str) -> bool {
        self.role.as_deref() == Some(expected)
    }
}

fn unverified_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation
}

/// Decodes the payload of a JWT without verifying it.
///
/// # Arguments
/// * `token` - The compact serialized token (`header.payload.signature`)
///
/// # Returns
/// * `Ok(TokenClaims)` - The payload could be parsed
/// * `Err(ClaimsError)` - The token is not a well formed JWT
pub fn decode_claims(token: &str) -> Result<TokenClaims, ClaimsError> {
    let decoded =
        decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &unverified_validation())?;

    Ok(decoded.claims)
}
