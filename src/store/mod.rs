//! Record store gateway.
//!
//! The services only see the [`WeatherStore`] and [`UserStore`] traits.
//! `PgStore` backs them with PostgreSQL; `MemoryStore` keeps everything in
//! process and is used when no database is configured and in tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StorageError;
use crate::models::{Insight, NewInsight, NewReading, NewUser, User, UserChanges, WeatherReading};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

// ---

#[async_trait]
pub trait WeatherStore: Send + Sync {
    /// Append a reading. The store assigns `id` and `created_at`.
    async fn insert_reading(&self, reading: &NewReading) -> Result<WeatherReading, StorageError>;

    /// Up to `limit` most recently created readings, newest first.
    async fn recent_readings(&self, limit: usize) -> Result<Vec<WeatherReading>, StorageError>;

    /// Current insight collection, newest first.
    async fn insights(&self) -> Result<Vec<Insight>, StorageError>;

    /// Delete every stored insight, then insert `insights`, as one unit where
    /// the backend allows it.
    async fn replace_insights(&self, insights: &[NewInsight]) -> Result<Vec<Insight>, StorageError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn count_users(&self) -> Result<i64, StorageError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    async fn list_users(&self) -> Result<Vec<User>, StorageError>;

    /// Fails with [`StorageError::Duplicate`] when the email is taken.
    async fn insert_user(&self, user: &NewUser) -> Result<User, StorageError>;

    /// Returns `None` when no user has this id.
    async fn update_user(
        &self,
        id: Uuid,
        changes: &UserChanges,
    ) -> Result<Option<User>, StorageError>;

    /// Returns `false` when no user has this id.
    async fn delete_user(&self, id: Uuid) -> Result<bool, StorageError>;
}
