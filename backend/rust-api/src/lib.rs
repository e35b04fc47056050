use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use services::AppState;

pub fn create_router(app_state: std::sync::Arc<services::AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any); // TODO: restrict to specific origins in production

    Router::new()
        // Public endpoints (no auth required)
        .route("/health", get(handlers::health_check))
        // Metrics endpoint with Basic Auth protection
        .route(
            "/metrics",
            get(handlers::metrics_handler)
                .layer(middleware::from_fn(handlers::metrics_auth_middleware)),
        )
        .route("/quizzes", get(handlers::quizzes::list_quizzes))
        .route("/quizzes/{id}", get(handlers::quizzes::get_quiz))
        // Protected endpoints (require JWT)
        .merge(protected_routes(app_state.clone()))
        .with_state(app_state)
        .layer(cors)
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}

fn protected_routes(
    app_state: std::sync::Arc<services::AppState>,
) -> Router<std::sync::Arc<services::AppState>> {
    Router::new()
        .route("/quizzes/{id}/start", post(handlers::quizzes::start_quiz))
        .route(
            "/quizzes/{id}/questions/random/{difficulty}",
            get(handlers::quizzes::session_questions),
        )
        .route("/quizzes/{id}/submit", post(handlers::quizzes::submit_quiz))
        .route(
            "/users/{id}/attempts",
            get(handlers::analytics::user_attempts),
        )
        .route("/predict", get(handlers::analytics::predict))
        .route(
            "/leaderboard/weekly",
            get(handlers::analytics::weekly_leaderboard),
        )
        .route(
            "/users/{id}/insights",
            get(handlers::analytics::user_insights),
        )
        .route_layer(middleware::from_fn_with_state(
            app_state,
            middlewares::auth::auth_middleware,
        ))
}
