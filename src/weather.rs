//! Ingestion coordinator: validates and stores readings, keeps the insight
//! cache in step with the store, and serves history and exports.
//!
//! Concurrent submissions may race between reading the window and replacing
//! the insight collection. The last writer wins; the cache always holds the
//! output of one complete computation.

use std::sync::Arc;

use crate::error::AppError;
use crate::export::{export_table, ExportFormat};
use crate::insights::{compute_insights, INSIGHT_WINDOW};
use crate::models::{Insight, ReadingCandidate, WeatherReading};
use crate::store::WeatherStore;

// ---

/// Number of most recent readings surfaced to history reads and exports.
pub const HISTORY_LIMIT: usize = 100;

#[derive(Clone)]
pub struct WeatherService {
    store: Arc<dyn WeatherStore>,
}

impl WeatherService {
    pub fn new(store: Arc<dyn WeatherStore>) -> Self {
        Self { store }
    }

    /// Validate and persist a reading, then recompute insights.
    ///
    /// Invalid candidates never reach the store. A failed write aborts before
    /// recomputation.
    pub async fn submit_reading(
        &self,
        candidate: ReadingCandidate,
    ) -> Result<WeatherReading, AppError> {
        // ---
        let reading = candidate.validate().map_err(|e| {
            tracing::warn!("Rejected reading: {}", e);
            e
        })?;

        let stored = self.store.insert_reading(&reading).await?;
        tracing::info!(
            "Stored reading {} from {}: {}°C, {}% humidity",
            stored.id,
            stored.location,
            stored.temperature,
            stored.humidity
        );

        self.recompute_insights().await?;
        Ok(stored)
    }

    /// Up to [`HISTORY_LIMIT`] readings, newest first.
    pub async fn list_recent_readings(&self) -> Result<Vec<WeatherReading>, AppError> {
        Ok(self.store.recent_readings(HISTORY_LIMIT).await?)
    }

    /// The cached insight set from the latest recomputation, newest first.
    pub async fn get_insights(&self) -> Result<Vec<Insight>, AppError> {
        Ok(self.store.insights().await?)
    }

    /// Rebuild the insight cache from the latest [`INSIGHT_WINDOW`] readings.
    ///
    /// An empty result still clears whatever was cached before.
    pub async fn recompute_insights(&self) -> Result<Vec<Insight>, AppError> {
        // ---
        let window = self.store.recent_readings(INSIGHT_WINDOW).await?;
        let computed = compute_insights(&window);

        let stored = self.store.replace_insights(&computed).await?;
        tracing::debug!(
            "Recomputed insights over {} readings: {} active",
            window.len(),
            stored.len()
        );
        Ok(stored)
    }

    /// Render the same bounded history as [`Self::list_recent_readings`].
    pub async fn export_readings(&self, format: ExportFormat) -> Result<Vec<u8>, AppError> {
        // ---
        let readings = self.list_recent_readings().await?;
        Ok(export_table(&readings, format)?)
    }
}
