mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{body_json, location, signed_in_app, signed_out_app, EMAIL};

#[tokio::test]
async fn wrong_password_is_rejected_with_message() -> Result<()> {
    let app = signed_out_app().await;

    let res = app
        .post_json("/admin/login", json!({ "email": EMAIL, "password": "nope" }))
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(res).await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to log in. Please check your credentials.");

    let session = body_json(app.get("/admin/session").await?).await?;
    assert_eq!(session["data"]["status"], "unauthenticated");
    Ok(())
}

#[tokio::test]
async fn logout_lands_on_login_and_locks_console() -> Result<()> {
    let app = signed_in_app().await?;
    assert_eq!(app.get("/admin/dashboard").await?.status(), StatusCode::OK);

    let res = app.post("/admin/logout").await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await?["data"]["redirect"], "/admin/login");

    // the revoked token no longer opens the console
    let res = app.get("/admin/dashboard").await?;
    assert_eq!(location(&res), Some("/admin/login"));

    app.forget_token();
    let res = app.post("/admin/logout").await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn session_endpoint_reports_user() -> Result<()> {
    let app = signed_in_app().await?;

    let body = body_json(app.get("/admin/session").await?).await?;
    assert_eq!(body["data"]["status"], "authenticated");
    assert_eq!(body["data"]["user"]["email"], EMAIL);
    Ok(())
}
