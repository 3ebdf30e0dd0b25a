//! Dashboard user management routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::info;
use uuid::Uuid;

use crate::accounts::{CreateUser, UpdateUser};
use crate::models::User;
use crate::{AppError, AppState};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", put(update_user).delete(delete_user))
}

async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.users.list_users().await?))
}

async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    // ---
    info!("POST /users");
    let user = state.users.create_user(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUser>,
) -> Result<Json<User>, AppError> {
    // ---
    info!("PUT /users/{}", id);
    Ok(Json(state.users.update_user(id, req).await?))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    // ---
    info!("DELETE /users/{}", id);
    state.users.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
