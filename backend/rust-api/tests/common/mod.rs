#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use chrono::{Duration, Utc};
use quizmaster_api::middlewares::auth::{JwtClaims, JwtService};
use quizmaster_api::models::attempt::Attempt;
use quizmaster_api::models::{Difficulty, Question, Quiz};
use quizmaster_api::services::catalog::CatalogStore;
use quizmaster_api::{config::Config, create_router, services::AppState};

pub const TEST_SECRET: &str = "test-secret";

/// Builds the app around an in-memory catalog; no filesystem, no network.
/// Returns the state too so tests can seed attempt history directly.
pub fn create_test_app() -> (Router, Arc<AppState>) {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let config = Config {
        http_port: 0,
        jwt_secret: TEST_SECRET.to_string(),
        catalog_path: "unused-in-tests".to_string(),
        sample_size: 3,
        session_ttl_seconds: 3600,
        leaderboard_cache_seconds: 0, // rebuild on every read
    };

    let catalog = CatalogStore::new(test_quizzes()).expect("test catalog is valid");
    let app_state = Arc::new(AppState::with_catalog(config, catalog));
    (create_router(app_state.clone()), app_state)
}

/// Two quizzes; every question's correct answer is option index 1, so a
/// fully correct submission is always all-ones regardless of sampling.
fn test_quizzes() -> Vec<Quiz> {
    let easy: Vec<Question> = (1..=4)
        .map(|id| question(id, 1, Difficulty::Easy))
        .collect();
    let medium: Vec<Question> = (5..=7)
        .map(|id| question(id, 1, Difficulty::Medium))
        .collect();

    vec![
        Quiz {
            id: 1,
            title: "Rust Fundamentals".to_string(),
            description: "Test quiz one".to_string(),
            questions: easy.into_iter().chain(medium).collect(),
        },
        Quiz {
            id: 2,
            title: "HTTP and REST".to_string(),
            description: "Test quiz two".to_string(),
            questions: (8..=10)
                .map(|id| question(id, 2, Difficulty::Medium))
                .collect(),
        },
    ]
}

fn question(id: i64, quiz_id: i64, difficulty: Difficulty) -> Question {
    Question {
        id,
        quiz_id,
        question: format!("Question {}", id),
        options: vec!["wrong".into(), "right".into(), "also wrong".into()],
        correct_option: 1,
        difficulty,
    }
}

pub fn token_for(user_id: i64) -> String {
    signed_token(user_id, true)
}

pub fn unverified_token_for(user_id: i64) -> String {
    signed_token(user_id, false)
}

fn signed_token(user_id: i64, verified: bool) -> String {
    let now = Utc::now().timestamp();
    let claims = JwtClaims {
        sub: user_id.to_string(),
        verified,
        exp: (now + 3600) as usize,
        iat: now as usize,
    };
    JwtService::new(TEST_SECRET)
        .generate_token(claims)
        .expect("token generation")
}

/// Fabricated history record for seeding the ledger in analytics tests.
pub fn attempt(
    user_id: i64,
    quiz_id: i64,
    percentage: f64,
    days_ago: i64,
    difficulty: Difficulty,
) -> Attempt {
    let total = 10u32;
    Attempt {
        id: format!("seed-{}-{}-{}", user_id, quiz_id, days_ago),
        user_id,
        quiz_id,
        difficulty,
        score: ((percentage / 100.0) * total as f64).round() as u32,
        total,
        percentage,
        duration_seconds: 120,
        completed_at: Utc::now() - Duration::days(days_ago),
        answers: vec![],
    }
}
