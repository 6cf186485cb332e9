mod common;

use anyhow::Result;
use axum::http::StatusCode;

#[tokio::test]
async fn root_lists_endpoints() -> Result<()> {
    let app = common::TestApp::seeded().await?;
    let (status, body) = app.get("/").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "orgchart-api");
    assert!(body["endpoints"]["employee"].is_string(), "missing endpoints: {}", body);
    Ok(())
}

#[tokio::test]
async fn health_reports_store() -> Result<()> {
    let app = common::TestApp::seeded().await?;
    let (status, body) = app.get("/health").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "ok");
    Ok(())
}
