use crate::auth::jwks::{AuthError, JwksCache};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims of a Supabase access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The Supabase auth user UUID.
    pub sub: String,
    pub exp: usize,
    pub iat: Option<usize>,
    pub iss: Option<String>,
    pub email: Option<String>,
    /// Supabase role (e.g. "authenticated"), not the club role.
    pub role: Option<String>,
    pub user_metadata: Option<UserMetadata>,
}

/// Profile data from the sign-in provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserMetadata {
    pub full_name: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub picture: Option<String>,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Ok(Uuid::parse_str(&self.sub)?)
    }

    pub fn display_name(&self) -> Option<String> {
        self.user_metadata
            .as_ref()
            .and_then(|m| m.full_name.clone().or_else(|| m.name.clone()))
    }

    pub fn avatar_url(&self) -> Option<String> {
        self.user_metadata
            .as_ref()
            .and_then(|m| m.avatar_url.clone().or_else(|| m.picture.clone()))
    }

    /// Prefer the top-level email, fall back to metadata.
    pub fn user_email(&self) -> Option<String> {
        self.email
            .clone()
            .or_else(|| self.user_metadata.as_ref().and_then(|m| m.email.clone()))
    }
}

pub async fn validate_token(token: &str, jwks_cache: &JwksCache) -> Result<Claims, AuthError> {
    jwks_cache.validate_token(token).await.map(|td| td.claims)
}
