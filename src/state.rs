use std::sync::Arc;

use crate::accounts::UserService;
use crate::auth::{AuthService, TokenKeys};
use crate::store::{UserStore, WeatherStore};
use crate::weather::WeatherService;

// ---

/// Shared application state handed to every route.
#[derive(Clone)]
pub struct AppState {
    pub weather: WeatherService,
    pub users: UserService,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(
        weather_store: Arc<dyn WeatherStore>,
        user_store: Arc<dyn UserStore>,
        keys: TokenKeys,
    ) -> Self {
        // ---
        Self {
            weather: WeatherService::new(weather_store),
            users: UserService::new(user_store.clone()),
            auth: AuthService::new(user_store, keys),
        }
    }
}
