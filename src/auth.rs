//! Password login and bearer-token verification.
//!
//! Tokens are HS256 JWTs carrying the user id and email. The route guard
//! accepts them from the `Authorization` header or, for plain download links,
//! from a `token` query parameter.

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::accounts::verify_password;
use crate::error::{AppError, AuthError};
use crate::store::UserStore;
use crate::AppState;

// ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub email: String,
    pub iat: u64,
    pub exp: u64,
}

/// Signing material and token lifetime.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn issue(&self, user_id: &str, email: &str) -> Result<String, AppError> {
        // ---
        let now = Utc::now().timestamp().max(0) as u64;
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now,
            exp: now + self.ttl_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to sign token: {e}")))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        // ---
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                AuthError::InvalidToken
            })
    }
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    keys: TokenKeys,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, keys: TokenKeys) -> Self {
        Self { users, keys }
    }

    /// Exchange email and password for a bearer token.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        // ---
        let Some(user) = self.users.find_user_by_email(email.trim()).await? else {
            tracing::warn!("Login failed: unknown email");
            return Err(AuthError::InvalidCredentials.into());
        };

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            tracing::warn!("Login failed for user {}", user.id);
            return Err(AuthError::InvalidCredentials.into());
        }

        tracing::info!("User {} logged in", user.id);
        self.keys.issue(&user.id.to_string(), &user.email)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.keys.verify(token)
    }
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Pull the token from `Authorization: Bearer ...` or the `token` query pair.
///
/// Empty values count as absent.
fn extract_token(req: &Request) -> Option<String> {
    // ---
    let from_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    from_header.or_else(|| {
        Query::<TokenQuery>::try_from_uri(req.uri())
            .ok()
            .and_then(|Query(q)| q.token)
            .filter(|t| !t.is_empty())
    })
}

/// Route guard: rejects requests without a valid token and stores the
/// verified [`Claims`] in the request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // ---
    let token = extract_token(&req).ok_or(AuthError::MissingToken)?;
    let claims = state.auth.verify(&token)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
