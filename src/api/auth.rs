//! Bearer Token Authentication
//!
//! Verifies HS256 tokens issued by the login service and exposes the
//! authenticated user to handlers through the `AuthUser` extractor.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;

/// User section of the token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUser {
    pub id: String,
}

/// Token payload: `{ "user": { "id": ... }, "exp": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user: TokenUser,
    pub exp: usize,
}

// == Auth Config ==
/// Keys used to verify (and, for tooling and tests, issue) bearer tokens.
pub struct AuthConfig {
    decoding: DecodingKey,
    encoding: EncodingKey,
}

impl AuthConfig {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            encoding: EncodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Signs a token for `user_id` valid for `ttl_secs` seconds.
    pub fn issue_token(&self, user_id: &str, ttl_secs: i64) -> anyhow::Result<String> {
        let exp = (chrono::Utc::now().timestamp() + ttl_secs).max(0) as usize;
        let claims = Claims {
            user: TokenUser {
                id: user_id.to_string(),
            },
            exp,
        };
        self.sign(&Header::default(), &claims)
    }

    fn sign(&self, header: &Header, claims: &Claims) -> anyhow::Result<String> {
        encode(header, claims, &self.encoding)
            .with_context(|| format!("failed to sign token for '{}'", claims.user.id))
    }

    /// Validates signature and expiry, returning the token's claims.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|err| {
                debug!("Rejected bearer token: {}", err);
                ApiError::Unauthorized("Token is not valid".to_string())
            })
    }
}

// == Extractor ==
/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    Arc<AuthConfig>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::Unauthorized("No token, authorization denied".to_string()))?;

        let auth = Arc::<AuthConfig>::from_ref(state);
        let claims = auth.verify(token.trim())?;

        Ok(AuthUser {
            id: claims.user.id,
        })
    }
}
