use jsonwebtoken::{Algorithm, DecodingKey, TokenData, Validation, decode, decode_header};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const JWKS_URL_TEMPLATE: &str = "https://{}.supabase.co/auth/v1/.well-known/jwks.json";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to fetch JWKS: {0}")]
    Fetch(String),

    #[error("Key with kid={0} not found in JWKS")]
    UnknownKey(String),

    #[error("Malformed JWK: {0}")]
    MalformedKey(&'static str),

    #[error("No 'kid' in token header")]
    MissingKid,

    #[error("Token validation failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid UUID in sub claim: {0}")]
    InvalidSubject(#[from] uuid::Error),
}

#[derive(Clone)]
struct SigningKey {
    x: String,
    y: String,
    algorithm: Algorithm,
}

/// Verifies Supabase access tokens against the project's published EC keys.
#[derive(Clone)]
pub struct JwksCache {
    keys: Arc<Cache<String, SigningKey>>,
    jwks_url: String,
    client: reqwest::Client,
    anon_key: String,
}

impl JwksCache {
    pub fn new(project_ref: &str, anon_key: &str, ttl: Duration) -> Self {
        let keys = Arc::new(Cache::builder().time_to_live(ttl).max_capacity(10).build());

        Self {
            keys,
            jwks_url: JWKS_URL_TEMPLATE.replace("{}", project_ref),
            client: reqwest::Client::new(),
            anon_key: anon_key.to_string(),
        }
    }

    async fn fetch_jwks(&self) -> Result<serde_json::Value, AuthError> {
        debug!(url = %self.jwks_url, "Fetching JWKS");

        let response = self
            .client
            .get(&self.jwks_url)
            .header("apikey", &self.anon_key)
            .send()
            .await
            .map_err(|e| AuthError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Fetch(format!("HTTP {status}")));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::Fetch(e.to_string()))
    }

    async fn signing_key(&self, kid: &str) -> Result<SigningKey, AuthError> {
        if let Some(cached) = self.keys.get(kid).await {
            return Ok(cached);
        }

        let jwks = self.fetch_jwks().await?;
        let jwk = jwks["keys"]
            .as_array()
            .ok_or(AuthError::MalformedKey("no keys in JWKS"))?
            .iter()
            .find(|k| k["kid"].as_str() == Some(kid))
            .ok_or_else(|| AuthError::UnknownKey(kid.to_string()))?;

        let x = jwk["x"].as_str().ok_or(AuthError::MalformedKey("missing 'x'"))?;
        let y = jwk["y"].as_str().ok_or(AuthError::MalformedKey("missing 'y'"))?;
        let algorithm = match jwk["alg"].as_str() {
            Some("ES384") => Algorithm::ES384,
            _ => Algorithm::ES256,
        };

        let key = SigningKey {
            x: x.to_string(),
            y: y.to_string(),
            algorithm,
        };
        self.keys.insert(kid.to_string(), key.clone()).await;
        Ok(key)
    }

    pub async fn validate_token(
        &self,
        token: &str,
    ) -> Result<TokenData<super::jwt::Claims>, AuthError> {
        let header = decode_header(token)?;
        let kid = header.kid.ok_or(AuthError::MissingKid)?;

        let key = self.signing_key(&kid).await?;
        let decoding_key = DecodingKey::from_ec_components(&key.x, &key.y)?;

        let mut validation = Validation::new(key.algorithm);
        validation.validate_aud = false;

        Ok(decode::<super::jwt::Claims>(token, &decoding_key, &validation)?)
    }
}
