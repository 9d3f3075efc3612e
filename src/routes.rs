// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, certificate, health, quiz, results},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Everything except the health check requires a bearer token.
/// * Admin routes additionally require the 'admin' role.
/// * Trace and CORS layers wrap the whole tree.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let quiz_routes = Router::new()
        .route("/submit", post(quiz::submit_quiz))
        .route("/results/user", get(quiz::get_my_results))
        .route("/lessons/{lesson_id}", get(quiz::get_lesson_questions))
        .route("/lessons/{lesson_id}/best", get(quiz::get_best_attempt))
        .route("/lessons/{lesson_id}/latest", get(quiz::get_latest_attempt))
        .layer(auth.clone());

    let results_routes = Router::new()
        .route("/{user_id}", get(results::get_user_results))
        .layer(auth.clone());

    let certificate_routes = Router::new()
        .route("/{user_id}/{course_id}", get(certificate::get_certificate))
        .layer(auth.clone());

    let admin_routes = Router::new()
        .route("/questions", post(admin::create_question))
        .route(
            "/questions/{id}",
            get(admin::get_question)
                .put(admin::update_question)
                .delete(admin::delete_question),
        )
        // Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(auth);

    Router::new()
        .route("/api/health", get(health::health_check))
        .nest("/api/quiz", quiz_routes)
        .nest("/api/results", results_routes)
        .nest("/api/certificate", certificate_routes)
        .nest("/api/admin", admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
