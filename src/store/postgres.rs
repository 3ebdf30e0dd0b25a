//! PostgreSQL record store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{UserStore, WeatherStore};
use crate::error::StorageError;
use crate::models::{
    Insight, NewInsight, NewReading, NewUser, Severity, User, UserChanges, WeatherReading,
};

// ---

/// PostgreSQL-backed record store. Tables are created by `schema::create_schema`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct InsightRow {
    id: i64,
    kind: String,
    message: String,
    severity: String,
    created_at: DateTime<Utc>,
}

impl From<InsightRow> for Insight {
    fn from(row: InsightRow) -> Self {
        Insight {
            id: row.id,
            kind: row.kind,
            message: row.message,
            severity: Severity::from_label(&row.severity),
            created_at: row.created_at,
        }
    }
}

/// Map unique-key violations to `Duplicate`, everything else to `Database`.
fn map_write_error(e: sqlx::Error, what: &str) -> StorageError {
    // ---
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return StorageError::Duplicate(what.to_string());
        }
    }
    StorageError::Database(e)
}

#[async_trait]
impl WeatherStore for PgStore {
    async fn insert_reading(&self, reading: &NewReading) -> Result<WeatherReading, StorageError> {
        // ---
        let stored = sqlx::query_as::<_, WeatherReading>(
            r#"
            INSERT INTO weather_logs (
                temperature, humidity, wind_speed, condition, location,
                latitude, longitude, observed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, temperature, humidity, wind_speed, condition, location,
                      latitude, longitude, observed_at, created_at
            "#,
        )
        .bind(reading.temperature)
        .bind(reading.humidity)
        .bind(reading.wind_speed)
        .bind(&reading.condition)
        .bind(&reading.location)
        .bind(reading.latitude)
        .bind(reading.longitude)
        .bind(&reading.observed_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn recent_readings(&self, limit: usize) -> Result<Vec<WeatherReading>, StorageError> {
        // ---
        let rows = sqlx::query_as::<_, WeatherReading>(
            r#"
            SELECT id, temperature, humidity, wind_speed, condition, location,
                   latitude, longitude, observed_at, created_at
            FROM weather_logs
            ORDER BY id DESC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn insights(&self) -> Result<Vec<Insight>, StorageError> {
        // ---
        let rows = sqlx::query_as::<_, InsightRow>(
            r#"
            SELECT id, kind, message, severity, created_at
            FROM insights
            ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Insight::from).collect())
    }

    async fn replace_insights(
        &self,
        insights: &[NewInsight],
    ) -> Result<Vec<Insight>, StorageError> {
        // ---
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM insights").execute(&mut *tx).await?;

        let mut stored = Vec::with_capacity(insights.len());
        for insight in insights {
            let row = sqlx::query_as::<_, InsightRow>(
                r#"
                INSERT INTO insights (kind, message, severity)
                VALUES ($1, $2, $3)
                RETURNING id, kind, message, severity, created_at
                "#,
            )
            .bind(&insight.kind)
            .bind(&insight.message)
            .bind(insight.severity.as_str())
            .fetch_one(&mut *tx)
            .await?;
            stored.push(Insight::from(row));
        }

        tx.commit().await?;

        // Match `insights()`, which reads newest first.
        stored.reverse();
        Ok(stored)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn count_users(&self) -> Result<i64, StorageError> {
        // ---
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        // ---
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, StorageError> {
        // ---
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn insert_user(&self, user: &NewUser) -> Result<User, StorageError> {
        // ---
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &format!("email {}", user.email)))
    }

    async fn update_user(
        &self,
        id: Uuid,
        changes: &UserChanges,
    ) -> Result<Option<User>, StorageError> {
        // ---
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $2,
                email = $3,
                password_hash = COALESCE($4, password_hash),
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(&changes.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &format!("email {}", changes.email)))
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StorageError> {
        // ---
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
