use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::jwks::JwksCache;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Failed to decode token header: {0}")]
    Header(jsonwebtoken::errors::Error),
    #[error("No 'kid' in token header")]
    MissingKid,
    #[error("Signing key unavailable: {0}")]
    Key(String),
    #[error("Token validation failed: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
    #[error("Invalid UUID in sub claim: {0}")]
    Subject(#[from] uuid::Error),
}

/// Supabase JWT claims.
///
/// `sub` is the user's UUID in `auth.users`, which is also the primary key of
/// the matching `profiles` row.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Expiration (Unix timestamp).
    pub exp: usize,
    pub iat: Option<usize>,
    pub iss: Option<String>,
    pub email: Option<String>,
    /// Supabase role (e.g. "authenticated"), unrelated to the marketplace role.
    pub role: Option<String>,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, TokenError> {
        Ok(Uuid::parse_str(&self.sub)?)
    }
}

/// How bearer tokens are checked: against the project's JWKS (asymmetric
/// keys) or a shared HS256 secret (legacy projects, tests).
pub enum TokenVerifier {
    Jwks(JwksCache),
    Secret(String),
}

impl TokenVerifier {
    pub async fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        match self {
            TokenVerifier::Jwks(cache) => cache.validate_token(token).await,
            TokenVerifier::Secret(secret) => validate_with_secret(token, secret),
        }
    }
}

/// Validate an HS256-signed token with the project's JWT secret.
pub fn validate_with_secret(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}
