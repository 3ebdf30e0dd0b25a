//! Weather log routes: reading ingestion, history, insights and exports.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use tracing::{debug, info};

use crate::error::{FieldViolation, ValidationError};
use crate::export::ExportFormat;
use crate::models::{Insight, ReadingCandidate, WeatherReading};
use crate::{AppError, AppState};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/weather/logs", post(submit_reading).get(list_readings))
        .route("/weather/insights", get(get_insights))
        .route("/weather/insights/refresh", post(refresh_insights))
        .route("/weather/export.csv", get(export_csv))
        .route("/weather/export.xlsx", get(export_xlsx))
}

async fn submit_reading(
    State(state): State<AppState>,
    payload: Result<Json<ReadingCandidate>, JsonRejection>,
) -> Result<(StatusCode, Json<WeatherReading>), AppError> {
    // ---
    info!("POST /weather/logs");

    // Wrong-typed fields fail deserialization; report them as validation errors.
    let Json(candidate) = payload.map_err(|rejection| ValidationError {
        violations: vec![FieldViolation::new("body", rejection.body_text())],
    })?;

    let stored = state.weather.submit_reading(candidate).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn list_readings(
    State(state): State<AppState>,
) -> Result<Json<Vec<WeatherReading>>, AppError> {
    // ---
    let readings = state.weather.list_recent_readings().await?;
    debug!("GET /weather/logs - returning {} readings", readings.len());
    Ok(Json(readings))
}

async fn get_insights(State(state): State<AppState>) -> Result<Json<Vec<Insight>>, AppError> {
    Ok(Json(state.weather.get_insights().await?))
}

async fn refresh_insights(State(state): State<AppState>) -> Result<Json<Vec<Insight>>, AppError> {
    // ---
    info!("POST /weather/insights/refresh");
    Ok(Json(state.weather.recompute_insights().await?))
}

async fn export_csv(State(state): State<AppState>) -> Result<Response, AppError> {
    export(state, ExportFormat::Csv).await
}

async fn export_xlsx(State(state): State<AppState>) -> Result<Response, AppError> {
    export(state, ExportFormat::Xlsx).await
}

async fn export(state: AppState, format: ExportFormat) -> Result<Response, AppError> {
    // ---
    info!("GET /weather/export.{}", format.extension());

    let bytes = state.weather.export_readings(format).await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        format.file_name(Utc::now().date_naive())
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
