//! Threshold rules deriving alerts from the recent reading window.
//!
//! The engine is a pure function: it never touches the store. The caller
//! replaces the persisted insight collection with whatever it returns,
//! including an empty set.

use crate::models::{NewInsight, Severity, WeatherReading};

// ---

/// Number of most recent readings fed into the rules.
pub const INSIGHT_WINDOW: usize = 24;

pub const HEAT_THRESHOLD_C: f64 = 30.0;
pub const COLD_THRESHOLD_C: f64 = 15.0;
pub const HUMIDITY_THRESHOLD_PCT: f64 = 80.0;

/// Compute the insight set for a window of readings (newest first).
///
/// Boundaries are strict: a mean of exactly 30°C, 15°C or 80% emits nothing.
/// At most one temperature insight and one humidity insight are produced.
pub fn compute_insights(window: &[WeatherReading]) -> Vec<NewInsight> {
    // ---
    if window.is_empty() {
        return Vec::new();
    }

    let avg_temp = mean(window.iter().map(|r| r.temperature));
    let avg_humidity = mean(window.iter().map(|r| r.humidity));

    tracing::debug!(
        "Insight window: {} readings, avg temperature {:.2}, avg humidity {:.2}",
        window.len(),
        avg_temp,
        avg_humidity
    );

    let mut insights = Vec::with_capacity(2);

    if avg_temp > HEAT_THRESHOLD_C {
        insights.push(NewInsight {
            kind: "Heat Alert".to_string(),
            message: format!("Average temperature {avg_temp:.1}°C - Hot weather conditions"),
            severity: Severity::Danger,
        });
    } else if avg_temp < COLD_THRESHOLD_C {
        insights.push(NewInsight {
            kind: "Cold Alert".to_string(),
            message: format!("Average temperature {avg_temp:.1}°C - Cold weather conditions"),
            severity: Severity::Warning,
        });
    }

    if avg_humidity > HUMIDITY_THRESHOLD_PCT {
        insights.push(NewInsight {
            kind: "High Humidity".to_string(),
            message: format!("Average humidity {avg_humidity:.1}% - Humid conditions"),
            severity: Severity::Warning,
        });
    }

    insights
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let n = values.len();
    values.sum::<f64>() / n as f64
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::Utc;

    fn reading(temperature: f64, humidity: f64) -> WeatherReading {
        // ---
        WeatherReading {
            id: 0,
            temperature,
            humidity,
            wind_speed: 10.0,
            condition: "Clear".to_string(),
            location: "Test".to_string(),
            latitude: None,
            longitude: None,
            observed_at: None,
            created_at: Utc::now(),
        }
    }

    fn window(temps: &[f64], humidity: f64) -> Vec<WeatherReading> {
        temps.iter().map(|t| reading(*t, humidity)).collect()
    }

    #[test]
    fn test_empty_window() {
        assert!(compute_insights(&[]).is_empty());
    }

    #[test]
    fn test_heat_alert() {
        // ---
        let insights = compute_insights(&window(&[32.0, 34.0, 36.0], 50.0));

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, "Heat Alert");
        assert_eq!(insights[0].severity, Severity::Danger);
        assert!(insights[0].message.contains("34.0"));
        assert_eq!(
            insights[0].message,
            "Average temperature 34.0°C - Hot weather conditions"
        );
    }

    #[test]
    fn test_cold_alert() {
        // ---
        let insights = compute_insights(&window(&[10.0, 12.0, 14.5], 50.0));

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, "Cold Alert");
        assert_eq!(insights[0].severity, Severity::Warning);
        assert!(insights[0].message.contains("12.2"));
    }

    #[test]
    fn test_high_humidity_alone() {
        // ---
        let insights = compute_insights(&window(&[20.0, 22.0], 85.0));

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, "High Humidity");
        assert_eq!(insights[0].severity, Severity::Warning);
        assert_eq!(
            insights[0].message,
            "Average humidity 85.0% - Humid conditions"
        );
    }

    #[test]
    fn test_temperature_and_humidity_are_independent() {
        // ---
        let insights = compute_insights(&window(&[35.0, 37.0], 90.0));
        let kinds: Vec<_> = insights.iter().map(|i| i.kind.as_str()).collect();
        assert_eq!(kinds, vec!["Heat Alert", "High Humidity"]);

        let insights = compute_insights(&window(&[5.0], 95.0));
        let kinds: Vec<_> = insights.iter().map(|i| i.kind.as_str()).collect();
        assert_eq!(kinds, vec!["Cold Alert", "High Humidity"]);
    }

    #[test]
    fn test_strict_boundaries() {
        // ---
        assert!(compute_insights(&window(&[30.0, 30.0], 50.0)).is_empty());
        assert!(compute_insights(&window(&[15.0], 50.0)).is_empty());
        assert!(compute_insights(&window(&[29.0, 31.0], 80.0)).is_empty());
        assert!(compute_insights(&window(&[20.0], 79.0)).is_empty());
    }

    #[test]
    fn test_mild_window_yields_nothing() {
        assert!(compute_insights(&window(&[18.0, 22.0, 26.0], 55.0)).is_empty());
    }

    #[test]
    fn test_wind_has_no_rule() {
        // ---
        let mut readings = window(&[20.0], 50.0);
        readings[0].wind_speed = 199.0;
        assert!(compute_insights(&readings).is_empty());
    }

    #[test]
    fn test_at_most_one_insight_per_category() {
        // ---
        let cases: [&[f64]; 4] = [&[-40.0], &[59.0, 60.0], &[14.9, 30.1], &[0.0; 24]];
        for temps in cases {
            for humidity in [0.0, 50.0, 80.5, 100.0] {
                let insights = compute_insights(&window(temps, humidity));
                let temp_count = insights
                    .iter()
                    .filter(|i| i.kind.ends_with("Alert"))
                    .count();
                let humidity_count = insights
                    .iter()
                    .filter(|i| i.kind == "High Humidity")
                    .count();
                assert!(temp_count <= 1);
                assert!(humidity_count <= 1);
            }
        }
    }
}
