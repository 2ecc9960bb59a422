use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use permitsy_lib::{http, seed, state::AppState};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

#[path = "util.rs"]
mod util;

async fn test_app() -> Result<(Router, TempDir)> {
    let pool = util::memory_pool().await;
    seed::seed_all(&pool).await?;

    // Stand-in SPA bundle for the static shim.
    let static_dir = TempDir::new()?;
    std::fs::write(
        static_dir.path().join("index.html"),
        "<!doctype html><title>Permitsy</title>",
    )?;

    let app = http::router(AppState::new(pool), static_dir.path());
    Ok((app, static_dir))
}

async fn get_json(app: &Router, uri: &str) -> Result<(StatusCode, Value)> {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty())?)
        .await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let value: Value = serde_json::from_slice(&bytes)?;
    Ok((status, value))
}

#[tokio::test]
async fn health_reports_ok() -> Result<()> {
    let (app, _dir) = test_app().await?;
    let (status, body) = get_json(&app, "/api/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("status").and_then(Value::as_str), Some("ok"));
    Ok(())
}

#[tokio::test]
async fn public_reads_serve_seeded_content() -> Result<()> {
    let (app, _dir) = test_app().await?;

    let (status, countries) = get_json(&app, "/api/countries").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(countries.as_array().map(Vec::len), Some(3));

    let (status, page) = get_json(&app, "/api/legal/privacy-policy").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        page.get("slug").and_then(Value::as_str),
        Some("privacy-policy")
    );

    let (status, testimonials) = get_json(&app, "/api/testimonials").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(testimonials
        .as_array()
        .unwrap()
        .iter()
        .all(|t| t.get("approved") == Some(&Value::Bool(true))));
    Ok(())
}

#[tokio::test]
async fn missing_slug_is_a_json_404() -> Result<()> {
    let (app, _dir) = test_app().await?;
    let (status, body) = get_json(&app, "/api/legal/imprint").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body.get("code").and_then(Value::as_str),
        Some("LEGAL_PAGE/NOT_FOUND")
    );
    Ok(())
}

#[tokio::test]
async fn admin_save_validates_before_writing() -> Result<()> {
    let (app, _dir) = test_app().await?;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/visa_packages/save")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"government_fee": 100, "service_fee": 50}"#))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await?.to_bytes();
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(
        body.get("code").and_then(Value::as_str),
        Some("VISA_PACKAGE/COUNTRY_REQUIRED")
    );
    Ok(())
}

#[tokio::test]
async fn unmatched_paths_fall_back_to_the_spa_entry() -> Result<()> {
    let (app, _dir) = test_app().await?;
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/countries/japan").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await?.to_bytes();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("Permitsy"), "history-API fallback must serve index.html");
    Ok(())
}
