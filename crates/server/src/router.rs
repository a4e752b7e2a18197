use super::{handlers, state::AppState};
use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/api/auth/register", post(handlers::register_handler))
        .route("/api/auth/login", post(handlers::login_handler))
        .route("/api/chat/ask", post(handlers::ask_handler))
        .route("/api/chat/history", get(handlers::history_handler))
        .route("/api/chat/quiz", post(handlers::quiz_handler))
        .route(
            "/api/upload",
            post(handlers::upload_handler).layer(DefaultBodyLimit::max(10 * 1024 * 1024)),
        )
        .route("/api/upload/my-files", get(handlers::list_documents_handler))
        .route(
            "/api/upload/{file_id}",
            get(handlers::get_document_handler).delete(handlers::delete_document_handler),
        )
        .route(
            "/api/voice/download/{filename}",
            get(handlers::download_audio_handler),
        )
        .route("/api/voice/voices", get(handlers::list_voices_handler))
        .route(
            "/api/voice/test-connection",
            get(handlers::voice_test_connection_handler),
        )
        .route("/api/voice/health", get(handlers::voice_health_handler))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}
