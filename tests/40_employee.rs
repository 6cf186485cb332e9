mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn show_embeds_departments() -> Result<()> {
    let app = common::TestApp::seeded().await?;

    let (status, body) = app.get("/employee/107").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["firstName"], "Pedro");
    assert_eq!(body["department1"]["name"], "Finance");
    assert_eq!(body["department2"]["name"], "Auditing");
    assert_eq!(body["department3"]["name"], "Legal");
    assert!(body["createdAt"].is_string());

    let (status, _) = app.get("/employee/abc").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn create_with_missing_department_writes_nothing() -> Result<()> {
    let app = common::TestApp::seeded().await?;
    let new = json!({
        "firstName": "Nora",
        "lastName": "Ibarra",
        "age": 31,
        "gender": "Female",
        "department1": 5,
        "department2": 99
    });

    let (status, body) = app.post("/employee", new.clone()).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(common::error_message(&body, "BAD_REQUEST").contains("99"));
    let (_, all) = app.get("/employee").await?;
    assert_eq!(all.as_array().map(Vec::len), Some(15));

    let mut valid = new;
    valid["department2"] = json!(null);
    let (status, body) = app.post("/employee", valid).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["employeeNumber"], 116);
    assert_eq!(body["department1"], 5);
    Ok(())
}

#[tokio::test]
async fn invalid_gender_is_rejected() -> Result<()> {
    let app = common::TestApp::seeded().await?;

    let (status, _) = app.patch("/employee/101", json!({"gender": "Other"})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.patch("/employee/101", json!({"gender": "Female"})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gender"], "Female");
    Ok(())
}

#[tokio::test]
async fn department_slot_patch_needs_override() -> Result<()> {
    let app = common::TestApp::seeded().await?;

    let (status, _) = app.patch("/employee/104", json!({"department3": 14})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.patch("/employee/104", json!({"department3": 14, "override": true})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["department3"], 14);

    let (status, body) = app.patch("/employee/104", json!({"department3": null, "override": true})).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["department3"].is_null());
    Ok(())
}

#[tokio::test]
async fn search_by_number_or_name() -> Result<()> {
    let app = common::TestApp::seeded().await?;

    let (status, hits) = app.get("/employee/search/103").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits.as_array().map(Vec::len), Some(1));
    assert_eq!(hits[0]["id"], 103);

    let (_, hits) = app.get("/employee/search/perez").await?;
    assert_eq!(hits.as_array().map(Vec::len), Some(1));
    assert_eq!(hits[0]["name"], "Juan Perez");
    assert_eq!(hits[0]["departments"], json!(["IT", "Development", "Testing"]));

    let (_, hits) = app.get("/employee/search/nobody").await?;
    assert_eq!(hits, json!([]));

    let (status, hits) = app.get("/employee/search/%20%20").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits, json!([]));
    Ok(())
}

#[tokio::test]
async fn delete_ignores_force_and_is_not_repeatable() -> Result<()> {
    let app = common::TestApp::seeded().await?;

    let (status, body) = app.delete("/employee/110?force=true").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["key"], 110);
    assert_eq!(body["detached"], 0);

    let (status, body) = app.delete("/employee/110").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    common::error_message(&body, "NOT_FOUND");
    Ok(())
}
