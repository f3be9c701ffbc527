use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::handlers;
use crate::middleware::session_guard;
use crate::state::AppState;

/// Full admin console router
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .fallback(handlers::pages::fallback)
        .layer(DefaultBodyLimit::max(config.api.max_upload_bytes))
        .with_state(state);

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn public_routes() -> Router<AppState> {
    use handlers::{auth, pages};

    Router::new()
        .route("/", get(pages::root))
        .route("/admin/login", get(pages::login_page).post(auth::login))
        .route("/admin/logout", post(auth::logout))
        .route("/admin/session", get(pages::session_state))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::{dashboard, folders, pages, videos};

    Router::new()
        .route("/admin", get(pages::admin_index))
        .route("/admin/dashboard", get(dashboard::get))
        .route("/admin/folders", get(folders::list).post(folders::create))
        .route("/admin/folders/:id", put(folders::update))
        .route(
            "/admin/folders/:id/delete",
            post(folders::request_delete).delete(folders::cancel_delete),
        )
        .route("/admin/folders/:id/delete/confirm", post(folders::confirm_delete))
        .route("/admin/videos/:folder_id", get(videos::list).post(videos::create))
        .route(
            "/admin/videos/:folder_id/:video_id",
            put(videos::update).delete(videos::delete),
        )
        .route_layer(from_fn_with_state(state, session_guard))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any)
    }
}
