//! Login and token verification routes.

use axum::{extract::State, routing::post, Extension, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::Claims;
use crate::{AppError, AppState};

// ---

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    token: String,
}

#[derive(Serialize)]
struct VerifyResponse {
    valid: bool,
    email: String,
}

/// Open routes: credential exchange.
pub fn router() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

/// Routes that sit behind the token guard.
pub fn protected_router() -> Router<AppState> {
    Router::new().route("/auth/verify", post(verify))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    // ---
    info!("POST /auth/login");
    let token = state.auth.login(&req.email, &req.password).await?;
    Ok(Json(LoginResponse { token }))
}

/// The guard already verified the token; echo the result.
async fn verify(Extension(claims): Extension<Claims>) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        valid: true,
        email: claims.email,
    })
}
