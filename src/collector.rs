//! Periodic weather collector.
//!
//! Fetches current conditions from the Open-Meteo forecast API and submits
//! them through [`WeatherService`], exactly like an external client would.

use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::task::JoinHandle;

use crate::config::CollectorConfig;
use crate::models::ReadingCandidate;
use crate::weather::WeatherService;

// ---

const HOURLY_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,wind_speed_10m,precipitation_probability";

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub current_weather: CurrentWeather,
    pub hourly: Hourly,
}

#[derive(Debug, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub windspeed: f64,
    pub weathercode: i64,
    pub time: String,
}

#[derive(Debug, Deserialize)]
pub struct Hourly {
    pub time: Vec<String>,
    pub relative_humidity_2m: Vec<Option<f64>>,
}

/// Coarse condition label for a WMO weather code.
pub fn condition_label(weathercode: i64) -> &'static str {
    match weathercode {
        c if c < 3 => "Clear",
        c if c < 50 => "Cloudy",
        _ => "Rain",
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Turn a forecast response into a reading candidate for `cfg`'s location.
pub fn to_candidate(
    resp: &ForecastResponse,
    cfg: &CollectorConfig,
) -> Result<ReadingCandidate> {
    // ---
    let hourly = &resp.hourly;

    // `current_weather.time` moves in 15-minute steps, hourly slots sit on the
    // hour. Both are `YYYY-MM-DDTHH:MM` in one zone and compare lexically.
    // Use the nearest non-null slot at or before now, else the earliest after.
    let now = resp.current_weather.time.as_str();
    let upto = hourly
        .time
        .iter()
        .take_while(|t| t.as_str() <= now)
        .count()
        .min(hourly.relative_humidity_2m.len());
    let (past, upcoming) = hourly.relative_humidity_2m.split_at(upto);
    let humidity = past
        .iter()
        .rev()
        .find_map(|h| *h)
        .or_else(|| upcoming.iter().find_map(|h| *h))
        .ok_or_else(|| anyhow!("forecast has no hourly humidity values"))?;

    Ok(ReadingCandidate {
        temperature: Some(round1(resp.current_weather.temperature)),
        humidity: Some(humidity),
        wind_speed: Some(round1(resp.current_weather.windspeed)),
        condition: Some(condition_label(resp.current_weather.weathercode).to_string()),
        location: Some(cfg.location.clone()),
        latitude: Some(cfg.latitude),
        longitude: Some(cfg.longitude),
        timestamp: Some(resp.current_weather.time.clone()),
    })
}

/// Fetch the current conditions for the configured coordinates.
pub async fn fetch_current(
    client: &reqwest::Client,
    cfg: &CollectorConfig,
) -> Result<ReadingCandidate> {
    // ---
    let latitude = cfg.latitude.to_string();
    let longitude = cfg.longitude.to_string();

    tracing::debug!("Fetching weather from: {}", cfg.api_url);

    let resp: ForecastResponse = client
        .get(&cfg.api_url)
        .query(&[
            ("latitude", latitude.as_str()),
            ("longitude", longitude.as_str()),
            ("current_weather", "true"),
            ("hourly", HOURLY_FIELDS),
            ("timezone", "auto"),
        ])
        .timeout(Duration::from_secs(10))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    to_candidate(&resp, cfg)
}

/// Spawn the collection loop. The first run happens immediately.
///
/// Failures are logged and the loop keeps going.
pub fn spawn(service: WeatherService, cfg: CollectorConfig) -> JoinHandle<()> {
    // ---
    tokio::spawn(async move {
        let client = reqwest::Client::new();
        let mut ticker = tokio::time::interval(Duration::from_secs(cfg.interval_minutes * 60));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        tracing::info!(
            "Collector started for {} every {} min",
            cfg.location,
            cfg.interval_minutes
        );

        loop {
            ticker.tick().await;

            let candidate = match fetch_current(&client, &cfg).await {
                Ok(c) => c,
                Err(e) => {
                    tracing::error!("Failed to fetch weather: {}", e);
                    continue;
                }
            };

            match service.submit_reading(candidate).await {
                Ok(r) => tracing::info!(
                    "Collected {}°C, {}% humidity for {}",
                    r.temperature,
                    r.humidity,
                    r.location
                ),
                Err(e) => tracing::error!("Failed to store collected reading: {}", e),
            }
        }
    })
}
