//! Database schema management for the weather logging backend.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs` when a database is configured.

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create the database schema (idempotent).
///
/// Creates `weather_logs` for submitted readings, `insights` for the derived
/// alert cache and `users` for dashboard accounts. Safe to call on every
/// startup; no-op if objects already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    // Readings are append-only; `id` doubles as the insertion order.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS weather_logs (
            id          BIGSERIAL PRIMARY KEY,
            temperature DOUBLE PRECISION NOT NULL,
            humidity    DOUBLE PRECISION NOT NULL,
            wind_speed  DOUBLE PRECISION NOT NULL,
            condition   TEXT             NOT NULL,
            location    TEXT             NOT NULL,
            latitude    DOUBLE PRECISION,
            longitude   DOUBLE PRECISION,
            observed_at TEXT,
            created_at  TIMESTAMPTZ      NOT NULL DEFAULT now()
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Replaced wholesale on every recomputation
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS insights (
            id         BIGSERIAL PRIMARY KEY,
            kind       TEXT        NOT NULL,
            message    TEXT        NOT NULL,
            severity   TEXT        NOT NULL DEFAULT 'info'
                       CHECK (severity IN ('info', 'warning', 'danger')),
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id            UUID PRIMARY KEY,
            name          TEXT        NOT NULL,
            email         TEXT        NOT NULL UNIQUE,
            password_hash TEXT        NOT NULL,
            created_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at    TIMESTAMPTZ NOT NULL DEFAULT now()
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_weather_logs_created_at
            ON weather_logs (created_at DESC);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
