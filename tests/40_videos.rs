mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use portfolio_admin::types::{Operation, Table};
use serde_json::json;
use uuid::Uuid;

use common::{body_json, signed_in_app, Multipart, TestApp};

async fn seeded_folder(app: &TestApp) -> Uuid {
    app.backend
        .seed(Table::Folders, json!({ "name": "Events", "order": 0, "logo_url": null }))
        .await
}

#[tokio::test]
async fn missing_title_shows_required_fields_message() -> Result<()> {
    let app = signed_in_app().await?;
    let folder = seeded_folder(&app).await;

    let form = Multipart::new().text("video_url", "https://v.example/1");
    let res = app
        .multipart(Method::POST, &format!("/admin/videos/{}", folder), form)
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await?["error"], "Please fill in all required fields");
    assert_eq!(app.backend.call_count(Table::Videos, Operation::Create).await, 0);
    Ok(())
}

#[tokio::test]
async fn create_with_thumbnail_then_update_keeps_it() -> Result<()> {
    let app = signed_in_app().await?;
    let folder = seeded_folder(&app).await;
    let uri = format!("/admin/videos/{}", folder);

    let form = Multipart::new()
        .text("title", "Reel")
        .text("video_url", "https://drive.google.com/file/d/abc123/view")
        .file("thumbnail", "cover.jpg", "image/jpeg", &[0xff, 0xd8]);
    let res = app.multipart(Method::POST, &uri, form).await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body = body_json(res).await?;
    let video = &body["data"]["videos"][0];
    assert_eq!(video["order"], 0);
    assert_eq!(video["playback"]["kind"], "embed");
    assert_eq!(video["playback"]["url"], "https://drive.google.com/file/d/abc123/preview");
    let thumbnail = video["thumbnail_url"].clone();
    assert!(thumbnail.as_str().is_some_and(|u| u.starts_with("memory://thumbnails/thumbnails/")));
    let id = video["id"].as_str().unwrap_or_default().to_string();

    let form = Multipart::new()
        .text("title", "Reel (2024)")
        .text("video_url", "https://cdn.example.com/reel.mp4");
    let res = app
        .multipart(Method::PUT, &format!("{}/{}", uri, id), form)
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await?;
    let video = &body["data"]["videos"][0];
    assert_eq!(video["title"], "Reel (2024)");
    assert_eq!(video["thumbnail_url"], thumbnail);
    assert_eq!(video["playback"]["kind"], "direct");
    Ok(())
}

#[tokio::test]
async fn delete_without_confirm_keeps_video() -> Result<()> {
    let app = signed_in_app().await?;
    let folder = seeded_folder(&app).await;
    let video = app
        .backend
        .seed(Table::Videos, json!({ "folder_id": folder, "title": "a", "video_url": "u", "order": 0 }))
        .await;
    let uri = format!("/admin/videos/{}/{}", folder, video);

    let body = body_json(app.delete(&uri).await?).await?;
    assert_eq!(body["data"]["deleted"], false);
    assert_eq!(body["data"]["confirm"], "Are you sure you want to delete this video?");
    assert_eq!(app.backend.call_count(Table::Videos, Operation::Delete).await, 0);

    let body = body_json(app.delete(&format!("{}?confirm=true", uri)).await?).await?;
    assert_eq!(body["data"]["deleted"], true);
    assert!(app.backend.rows(Table::Videos).await.is_empty());
    Ok(())
}

#[tokio::test]
async fn unknown_folder_is_not_found() -> Result<()> {
    let app = signed_in_app().await?;

    let res = app.get(&format!("/admin/videos/{}", Uuid::new_v4())).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(res).await?["error"], "This folder no longer exists.");
    Ok(())
}

#[tokio::test]
async fn deleting_folder_leaves_its_videos() -> Result<()> {
    let app = signed_in_app().await?;
    let folder = seeded_folder(&app).await;
    app.backend
        .seed(Table::Videos, json!({ "folder_id": folder, "title": "a", "video_url": "u", "order": 0 }))
        .await;

    app.get("/admin/folders").await?;
    app.post(&format!("/admin/folders/{}/delete", folder)).await?;
    let res = app.post(&format!("/admin/folders/{}/delete/confirm", folder)).await?;
    assert_eq!(res.status(), StatusCode::OK);

    assert!(app.backend.rows(Table::Folders).await.is_empty());
    assert_eq!(app.backend.rows(Table::Videos).await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn deleting_one_of_two_videos_keeps_the_other_in_place() -> Result<()> {
    let app = signed_in_app().await?;
    let folder = seeded_folder(&app).await;
    let first = app
        .backend
        .seed(Table::Videos, json!({ "folder_id": folder, "title": "a", "video_url": "u", "order": 0 }))
        .await;
    app.backend
        .seed(Table::Videos, json!({ "folder_id": folder, "title": "b", "video_url": "u", "order": 1 }))
        .await;

    let body = body_json(app.get("/admin/folders").await?).await?;
    assert_eq!(body["data"]["folders"][0]["video_count"], 2);

    let uri = format!("/admin/videos/{}/{}?confirm=true", folder, first);
    let body = body_json(app.delete(&uri).await?).await?;
    assert_eq!(body["data"]["deleted"], true);
    let videos = body["data"]["videos"].as_array().cloned().unwrap_or_default();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0]["title"], "b");
    assert_eq!(videos[0]["order"], 1);

    let body = body_json(app.get("/admin/folders").await?).await?;
    assert_eq!(body["data"]["folders"][0]["video_count"], 1);
    Ok(())
}

#[tokio::test]
async fn video_of_another_folder_is_not_found() -> Result<()> {
    let app = signed_in_app().await?;
    let folder = seeded_folder(&app).await;
    let other = app
        .backend
        .seed(Table::Folders, json!({ "name": "Other", "order": 1, "logo_url": null }))
        .await;
    let video = app
        .backend
        .seed(Table::Videos, json!({ "folder_id": other, "title": "theirs", "video_url": "u", "order": 0 }))
        .await;
    let uri = format!("/admin/videos/{}/{}", folder, video);

    let form = Multipart::new().text("title", "mine").text("video_url", "https://v.example/1");
    let res = app.multipart(Method::PUT, &uri, form).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app.delete(&format!("{}?confirm=true", uri)).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let rows = app.backend.rows(Table::Videos).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], "theirs");
    Ok(())
}

#[tokio::test]
async fn thumbnail_upload_failure_adds_nothing() -> Result<()> {
    let app = signed_in_app().await?;
    let folder = seeded_folder(&app).await;
    app.backend.fail_uploads(true);

    let form = Multipart::new()
        .text("title", "Reel")
        .text("video_url", "https://v.example/1")
        .file("thumbnail", "cover.jpg", "image/jpeg", &[0xff, 0xd8]);
    let res = app
        .multipart(Method::POST, &format!("/admin/videos/{}", folder), form)
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(res).await?["error"], "Failed to upload thumbnail. Please try again.");
    assert_eq!(app.backend.call_count(Table::Videos, Operation::Create).await, 0);
    Ok(())
}

#[tokio::test]
async fn store_write_failure_surfaces_error_envelope() -> Result<()> {
    let app = signed_in_app().await?;
    let folder = seeded_folder(&app).await;
    app.backend.fail_writes(true);

    let form = Multipart::new().text("title", "Reel").text("video_url", "https://v.example/1");
    let res = app
        .multipart(Method::POST, &format!("/admin/videos/{}", folder), form)
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

    let body = body_json(res).await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Could not add video. Please try again.");
    assert!(app.backend.rows(Table::Videos).await.is_empty());
    Ok(())
}
