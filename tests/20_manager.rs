mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn list_and_show() -> Result<()> {
    let app = common::TestApp::seeded().await?;

    let (status, body) = app.get("/manager").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(16));

    let (status, body) = app.get("/manager/6").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Santiago Alvarez");
    assert_eq!(body["shift"], "Morning");

    let (status, body) = app.get("/manager/600").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    common::error_message(&body, "NOT_FOUND");

    let (status, body) = app.get("/manager/six").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    common::error_message(&body, "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn create_assigns_next_id_and_rejects_duplicates() -> Result<()> {
    let app = common::TestApp::seeded().await?;

    let new = json!({"name": "Sara Molina", "education": "Statistics", "shift": "Night"});
    let (status, body) = app.post("/manager", new).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["managerId"], 17);

    let dup = json!({"managerId": 4, "name": "Copy", "education": "None", "shift": "Morning"});
    let (status, body) = app.post("/manager", dup).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    common::error_message(&body, "CONFLICT");
    Ok(())
}

#[tokio::test]
async fn numbering_stops_at_the_largest_id() -> Result<()> {
    let app = common::TestApp::seeded().await?;

    let last = json!({"managerId": i64::MAX, "name": "Last", "education": "None", "shift": "Night"});
    let (status, _) = app.post("/manager", last).await?;
    assert_eq!(status, StatusCode::CREATED);

    let next = json!({"name": "Overflow", "education": "None", "shift": "Night"});
    let (status, body) = app.post("/manager", next).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    common::error_message(&body, "CONFLICT");

    let (_, managers) = app.get("/manager").await?;
    assert_eq!(managers.as_array().map(Vec::len), Some(17));
    Ok(())
}

#[tokio::test]
async fn rename_shows_up_in_departments() -> Result<()> {
    let app = common::TestApp::seeded().await?;

    let (status, body) = app.patch("/manager/1", json!({"name": "Roberto S."})).await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["name"], "Roberto S.");

    let (_, departments) = app.get("/department").await?;
    let names: Vec<&str> = departments
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|d| d["manager"]["name"].as_str())
        .collect();
    assert!(names.contains(&"Roberto S."));
    assert!(!names.contains(&"Roberto Sanchez"));

    let (_, hits) = app.get("/department/search/IT").await?;
    assert_eq!(hits[0]["manager"], "Roberto S.");
    Ok(())
}

#[tokio::test]
async fn replace_takes_exactly_one_field() -> Result<()> {
    let app = common::TestApp::seeded().await?;

    let (status, body) = app.patch("/manager/1", json!({"name": "X", "education": "Y"})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = common::error_message(&body, "BAD_REQUEST");
    assert!(message.contains("Only one field"), "{}", message);

    let (status, body) = app.patch("/manager/1", json!({})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(common::error_message(&body, "BAD_REQUEST"), "No fields provided for update");

    let (status, _) = app.patch("/manager/1", json!({"education": "PhD", "override": false})).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn delete_guards_departments() -> Result<()> {
    let app = common::TestApp::seeded().await?;

    let (status, body) = app.delete("/manager/3").await?;
    assert_eq!(status, StatusCode::CONFLICT);
    common::error_message(&body, "CONFLICT");
    let (status, _) = app.get("/manager/3").await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.delete("/manager/3?force=true").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detached"], 2);
    assert_eq!(body["message"], "Manager 3 has been successfully deleted.");

    for number in [3, 16] {
        let (_, department) = app.get(&format!("/department/{}", number)).await?;
        assert!(department["manager"].is_null(), "{}", department);
    }

    let (status, _) = app.delete("/manager/3?force=true").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn search_by_id_and_name() -> Result<()> {
    let app = common::TestApp::seeded().await?;

    let (status, hits) = app.get("/manager/search/12").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits.as_array().map(Vec::len), Some(1));
    assert_eq!(hits[0]["name"], "Marcela Cruz");

    let (_, hits) = app.get("/manager/search/marcos").await?;
    assert_eq!(hits.as_array().map(Vec::len), Some(2));

    let (status, hits) = app.get("/manager/search/zzz").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits, json!([]));
    Ok(())
}
