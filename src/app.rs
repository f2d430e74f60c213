//! Router assembly.

use axum::{routing::get, routing::post, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{auth, handlers, paths};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/login", get(auth::login_page).post(auth::login_submit))
        .route("/register", get(auth::register_page).post(auth::register_submit))
        .route("/logout", post(auth::logout))
        .route("/chapters/{id}/start", post(handlers::start_session))
        .route("/sessions/{id}", get(handlers::session_page))
        .route("/sessions/{id}/verses/{index}", post(handlers::submit_verse))
        .route("/sessions/{id}/report", get(handlers::report_page))
        .route("/api/sessions/{id}/verses/{index}", post(handlers::submit_verse_json))
        .route("/api/sessions/{id}/report", get(handlers::session_report_json))
        .nest_service("/static", ServeDir::new(paths::STATIC_DIR))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
