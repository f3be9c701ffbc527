#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, Response},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use portfolio_admin::app::app;
use portfolio_admin::config::AppConfig;
use portfolio_admin::session::SessionProvider;
use portfolio_admin::state::AppState;
use portfolio_admin::testing::MemoryBackend;

pub const EMAIL: &str = "admin@example.com";
pub const PASSWORD: &str = "correct horse";

const BOUNDARY: &str = "portfolio-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub backend: Arc<MemoryBackend>,
    pub state: AppState,
    /// Bearer token sent with every request once `login` succeeded
    token: Mutex<Option<String>>,
}

/// Router over an in-memory backend; the session is left unresolved
pub fn build_test_app() -> TestApp {
    let backend = Arc::new(MemoryBackend::new().with_user(EMAIL, PASSWORD));
    let session = Arc::new(SessionProvider::new(backend.clone()));
    let state = AppState::new(session, backend.clone(), backend.clone(), Default::default());
    let router = app(state.clone(), &AppConfig::development());

    TestApp {
        router,
        backend,
        state,
        token: Mutex::new(None),
    }
}

/// Session resolved with nobody signed in
pub async fn signed_out_app() -> TestApp {
    let app = build_test_app();
    app.state.session.init(None).await;
    app
}

pub async fn signed_in_app() -> Result<TestApp> {
    let app = signed_out_app().await;
    app.login().await?;
    Ok(app)
}

impl TestApp {
    /// Send with the stored bearer token, if any
    pub async fn send(&self, mut request: Request<Body>) -> Result<Response<Body>> {
        if let Some(token) = self.token() {
            request
                .headers_mut()
                .insert(header::AUTHORIZATION, format!("Bearer {}", token).parse()?);
        }
        self.send_anonymous(request).await
    }

    /// Send exactly as built, as a client that never logged in would
    pub async fn send_anonymous(&self, request: Request<Body>) -> Result<Response<Body>> {
        Ok(self.router.clone().oneshot(request).await?)
    }

    pub fn token(&self) -> Option<String> {
        self.token.lock().ok().and_then(|t| t.clone())
    }

    pub fn forget_token(&self) {
        if let Ok(mut token) = self.token.lock() {
            token.take();
        }
    }

    pub async fn get(&self, uri: &str) -> Result<Response<Body>> {
        self.send(Request::builder().uri(uri).body(Body::empty())?).await
    }

    pub async fn get_anonymous(&self, uri: &str) -> Result<Response<Body>> {
        self.send_anonymous(Request::builder().uri(uri).body(Body::empty())?).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Result<Response<Body>> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?;
        self.send(request).await
    }

    pub async fn post(&self, uri: &str) -> Result<Response<Body>> {
        self.send(Request::builder().method(Method::POST).uri(uri).body(Body::empty())?)
            .await
    }

    pub async fn delete(&self, uri: &str) -> Result<Response<Body>> {
        self.send(Request::builder().method(Method::DELETE).uri(uri).body(Body::empty())?)
            .await
    }

    pub async fn multipart(&self, method: Method, uri: &str, form: Multipart) -> Result<Response<Body>> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(Body::from(form.finish()))?;
        self.send(request).await
    }

    /// Log in over HTTP and keep the returned access token for later requests
    pub async fn login(&self) -> Result<Value> {
        let res = self
            .post_json("/admin/login", json!({ "email": EMAIL, "password": PASSWORD }))
            .await?;
        anyhow::ensure!(res.status().is_success(), "login failed: {}", res.status());

        let body = body_json(res).await?;
        let token = body["data"]["access_token"].as_str().map(str::to_string);
        anyhow::ensure!(token.is_some(), "login returned no access token: {}", body);
        if let Ok(mut slot) = self.token.lock() {
            *slot = token;
        }
        Ok(body)
    }
}

pub async fn body_json(response: Response<Body>) -> Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok())
}

/// Hand-built multipart body
#[derive(Default)]
pub struct Multipart {
    body: Vec<u8>,
}

impl Multipart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.body
    }
}
