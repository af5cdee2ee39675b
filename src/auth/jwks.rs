use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use moka::future::Cache;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::jwt::{Claims, TokenError};

const JWKS_PATH: &str = "/auth/v1/.well-known/jwks.json";

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: Option<String>,
    alg: Option<String>,
    x: Option<String>,
    y: Option<String>,
}

#[derive(Clone)]
struct SigningKey {
    x: String,
    y: String,
    algorithm: Algorithm,
}

impl TryFrom<Jwk> for SigningKey {
    type Error = TokenError;

    fn try_from(jwk: Jwk) -> Result<Self, Self::Error> {
        let algorithm = match jwk.alg.as_deref() {
            Some("ES384") => Algorithm::ES384,
            _ => Algorithm::ES256,
        };
        Ok(Self {
            x: jwk.x.ok_or_else(|| TokenError::Key("Missing 'x' in JWK".into()))?,
            y: jwk.y.ok_or_else(|| TokenError::Key("Missing 'y' in JWK".into()))?,
            algorithm,
        })
    }
}

/// Fetches the project's signing keys once per hour and caches them by `kid`.
#[derive(Clone)]
pub struct JwksCache {
    keys: Cache<String, SigningKey>,
    jwks_url: String,
    client: reqwest::Client,
    anon_key: String,
}

impl JwksCache {
    pub fn new(supabase_url: &str, anon_key: &str) -> Self {
        Self {
            keys: Cache::builder()
                .time_to_live(Duration::from_secs(3600))
                .max_capacity(10)
                .build(),
            jwks_url: format!("{}{JWKS_PATH}", supabase_url.trim_end_matches('/')),
            client: reqwest::Client::new(),
            anon_key: anon_key.to_string(),
        }
    }

    async fn fetch(&self) -> Result<JwkSet, TokenError> {
        debug!("Fetching JWKS from {}", self.jwks_url);

        let response = self
            .client
            .get(&self.jwks_url)
            .header("apikey", &self.anon_key)
            .send()
            .await
            .map_err(|e| TokenError::Key(format!("Failed to fetch JWKS: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TokenError::Key(format!("Failed to fetch JWKS: HTTP {status}")));
        }

        response
            .json()
            .await
            .map_err(|e| TokenError::Key(format!("Failed to parse JWKS: {e}")))
    }

    async fn signing_key(&self, kid: &str) -> Result<SigningKey, TokenError> {
        if let Some(cached) = self.keys.get(kid).await {
            return Ok(cached);
        }

        let jwk = self
            .fetch()
            .await?
            .keys
            .into_iter()
            .find(|k| k.kid.as_deref() == Some(kid))
            .ok_or_else(|| TokenError::Key(format!("Key with kid={kid} not found in JWKS")))?;

        let key = SigningKey::try_from(jwk)?;
        self.keys.insert(kid.to_string(), key.clone()).await;
        Ok(key)
    }

    pub async fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        let header = decode_header(token).map_err(TokenError::Header)?;
        let kid = header.kid.ok_or(TokenError::MissingKid)?;
        let key = self.signing_key(&kid).await?;

        let decoding_key = DecodingKey::from_ec_components(&key.x, &key.y)
            .map_err(|e| TokenError::Key(format!("Failed to build decoding key: {e}")))?;

        let mut validation = Validation::new(key.algorithm);
        validation.validate_aud = false;

        Ok(decode::<Claims>(token, &decoding_key, &validation)?.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jwks_url_works_for_hosted_and_self_hosted_instances() {
        let hosted = JwksCache::new("https://abcd.supabase.co/", "anon");
        let local = JwksCache::new("http://localhost:54321", "anon");

        assert_eq!(hosted.jwks_url, format!("https://abcd.supabase.co{JWKS_PATH}"));
        assert_eq!(local.jwks_url, format!("http://localhost:54321{JWKS_PATH}"));
    }
}
