use axum::{middleware, Router};

use crate::{auth, AppState};

mod health;
mod login;
mod users;
mod weather;

// ---

/// Build the full API router.
///
/// `/health` and `/auth/login` are open; everything else sits behind the
/// bearer-token guard.
pub fn router(state: AppState) -> Router {
    // ---
    let protected = Router::new()
        .merge(weather::router())
        .merge(users::router())
        .merge(login::protected_router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .merge(protected)
        .merge(login::router())
        .merge(health::router())
        .with_state(state)
}
