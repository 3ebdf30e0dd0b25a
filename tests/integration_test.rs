use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use weatherlog::{auth::TokenKeys, config::AdminSeed, routes, store::MemoryStore, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WeatherReading {
    id: i64,
    temperature: f64,
    humidity: f64,
    wind_speed: f64,
    condition: String,
    location: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct Insight {
    #[serde(rename = "type")]
    kind: String,
    message: String,
    severity: String,
}

const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "123456";

/// Start the router on an ephemeral port over a fresh in-memory store.
async fn spawn_app() -> Result<String> {
    // ---
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(
        store.clone(),
        store,
        TokenKeys::new("integration-secret", 3600),
    );
    state
        .users
        .ensure_default_admin(&AdminSeed {
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
            name: "Admin User".to_string(),
        })
        .await?;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, routes::router(state)).await;
    });

    Ok(format!("http://{}", addr))
}

async fn login(client: &Client, base: &str) -> Result<String> {
    // ---
    let body: Value = client
        .post(format!("{}/auth/login", base))
        .json(&json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(body["token"].as_str().unwrap_or_default().to_string())
}

fn reading(temperature: f64, humidity: f64) -> Value {
    json!({
        "temperature": temperature,
        "humidity": humidity,
        "windSpeed": 12.0,
        "condition": "Clear",
        "location": "Recife",
        "latitude": -8.05,
        "longitude": -34.88,
        "timestamp": "2025-03-26T15:00"
    })
}

#[tokio::test]
async fn health_is_open() -> Result<()> {
    // ---
    let base = spawn_app().await?;
    let body: Value = Client::new()
        .get(format!("{}/health", base))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn protected_routes_need_a_token() -> Result<()> {
    // ---
    let base = spawn_app().await?;
    let client = Client::new();

    let res = client.get(format!("{}/weather/logs", base)).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/users", base))
        .bearer_auth("not-a-token")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(format!("{}/auth/login", base))
        .json(&json!({ "email": ADMIN_EMAIL, "password": "wrong" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let token = login(&client, &base).await?;
    let res = client
        .post(format!("{}/auth/verify", base))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["valid"], true);

    Ok(())
}

#[tokio::test]
async fn readings_feed_insights() -> Result<()> {
    // ---
    let base = spawn_app().await?;
    let client = Client::new();
    let token = login(&client, &base).await?;

    for t in [32.0, 34.0, 36.0] {
        let res = client
            .post(format!("{}/weather/logs", base))
            .bearer_auth(&token)
            .json(&reading(t, 50.0))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let logs: Vec<WeatherReading> = client
        .get(format!("{}/weather/logs", base))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(logs.len(), 3);
    assert_eq!(logs[0].temperature, 36.0);
    assert_eq!(logs[2].temperature, 32.0);
    assert!(logs[0].id > logs[2].id);
    assert!(logs[0].created_at >= logs[2].created_at);
    assert_eq!(logs[0].humidity, 50.0);
    assert_eq!(logs[0].wind_speed, 12.0);
    assert_eq!(logs[0].condition, "Clear");
    assert_eq!(logs[0].location, "Recife");

    let insights: Vec<Insight> = client
        .get(format!("{}/weather/insights", base))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(insights.len(), 1);
    assert_eq!(insights[0].kind, "Heat Alert");
    assert_eq!(insights[0].severity, "danger");
    assert!(insights[0].message.contains("34.0"));

    Ok(())
}

#[tokio::test]
async fn out_of_range_reading_is_rejected() -> Result<()> {
    // ---
    let base = spawn_app().await?;
    let client = Client::new();
    let token = login(&client, &base).await?;

    let res = client
        .post(format!("{}/weather/logs", base))
        .bearer_auth(&token)
        .json(&reading(70.0, 50.0))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["fields"][0]["field"], "temperature");

    let res = client
        .post(format!("{}/weather/logs", base))
        .bearer_auth(&token)
        .json(&json!({ "temperature": "hot" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let logs: Vec<Value> = client
        .get(format!("{}/weather/logs", base))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert!(logs.is_empty());

    let insights: Vec<Value> = client
        .get(format!("{}/weather/insights", base))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert!(insights.is_empty());

    Ok(())
}

#[tokio::test]
async fn exports_carry_download_headers() -> Result<()> {
    // ---
    let base = spawn_app().await?;
    let client = Client::new();
    let token = login(&client, &base).await?;

    // Empty store: header-only CSV. Token passed the way download links do.
    let res = client
        .get(format!("{}/weather/export.csv?token={}", base, token))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let content_type = res.headers()[header::CONTENT_TYPE].to_str()?.to_string();
    let disposition = res.headers()[header::CONTENT_DISPOSITION].to_str()?.to_string();
    assert!(content_type.starts_with("text/csv"));
    assert!(disposition.contains("weather-data-"));
    assert!(disposition.ends_with(".csv\""));

    let text = res.text().await?;
    assert_eq!(
        text.trim_end(),
        "Timestamp,Temperature,Humidity,Wind Speed,Condition,Location"
    );

    client
        .post(format!("{}/weather/logs", base))
        .bearer_auth(&token)
        .json(&reading(21.5, 60.0))
        .send()
        .await?
        .error_for_status()?;

    let text = client
        .get(format!("{}/weather/export.csv", base))
        .bearer_auth(&token)
        .send()
        .await?
        .text()
        .await?;
    assert_eq!(text.lines().count(), 2);
    assert!(text.contains("21.5°C,60%,12 km/h,Clear,Recife"));

    let res = client
        .get(format!("{}/weather/export.xlsx", base))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers()[header::CONTENT_TYPE]
        .to_str()?
        .contains("spreadsheetml"));
    let bytes = res.bytes().await?;
    assert!(bytes.starts_with(b"PK"));

    Ok(())
}

#[tokio::test]
async fn user_management() -> Result<()> {
    // ---
    let base = spawn_app().await?;
    let client = Client::new();
    let token = login(&client, &base).await?;

    let res = client
        .post(format!("{}/users", base))
        .bearer_auth(&token)
        .json(&json!({ "name": "Ana", "email": "ana@example.com", "password": "pw" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await?;
    assert!(created.get("passwordHash").is_none());
    let id = created["id"].as_str().unwrap_or_default().to_string();

    let res = client
        .post(format!("{}/users", base))
        .bearer_auth(&token)
        .json(&json!({ "name": "Ana", "email": "ana@example.com", "password": "pw" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .put(format!("{}/users/{}", base, id))
        .bearer_auth(&token)
        .json(&json!({ "name": "Ana Maria", "email": "ana@example.com" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await?;
    assert_eq!(updated["name"], "Ana Maria");

    let users: Vec<Value> = client
        .get(format!("{}/users", base))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(users.len(), 2);

    let res = client
        .delete(format!("{}/users/{}", base, id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .delete(format!("{}/users/{}", base, id))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}
