use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppError;
use crate::middlewares::auth::JwtClaims;
use crate::models::attempt::AttemptSummary;
use crate::models::insights::InsightsResponse;
use crate::models::leaderboard::WeeklyLeaderboard;
use crate::models::prediction::PredictionResponse;
use crate::models::{QuizId, UserId};
use crate::services::{insights_service, prediction_service, streak_service, AppState};
use crate::utils::time::week_bounds;

/// GET /users/{id}/attempts - the caller's own attempt history, oldest
/// first. Reading another user's history is forbidden.
pub async fn user_attempts(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
    Extension(claims): Extension<JwtClaims>,
) -> Result<Json<Vec<AttemptSummary>>, AppError> {
    require_self(&claims, user_id)?;

    let attempts = state.history.for_user(user_id).await;
    Ok(Json(attempts.iter().map(AttemptSummary::from).collect()))
}

#[derive(Debug, Deserialize, Validate)]
pub struct PredictQuery {
    pub user_id: UserId,
    pub quiz_id: QuizId,
    /// Optional target percentage for the goal estimator.
    #[validate(range(min = 0.0, max = 100.0))]
    pub goal: Option<f64>,
}

/// GET /predict?user_id=&quiz_id=&goal= - score prediction for one
/// (user, quiz) pair, gated until enough attempts exist.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PredictQuery>,
    Extension(claims): Extension<JwtClaims>,
) -> Result<Json<PredictionResponse>, AppError> {
    query
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    require_self(&claims, query.user_id)?;

    let pair_history = state
        .history
        .for_user_quiz(query.user_id, query.quiz_id)
        .await;

    // The streak spans every quiz, not just the predicted one.
    let all_attempts = state.history.for_user(query.user_id).await;
    let streak = streak_service::compute_streak(&all_attempts, Utc::now().date_naive());

    Ok(Json(prediction_service::predict(
        query.user_id,
        query.quiz_id,
        &pair_history,
        query.goal,
        streak,
    )))
}

/// GET /leaderboard/weekly - current ISO week ranking, served from the
/// short-lived snapshot cache.
pub async fn weekly_leaderboard(
    State(state): State<Arc<AppState>>,
) -> Json<WeeklyLeaderboard> {
    let now = Utc::now();
    let (week_start, week_end) = week_bounds(now);
    let attempts = state.history.in_range(week_start, week_end).await;
    Json(state.leaderboard_cache.get_or_build(&attempts, now).await)
}

/// GET /users/{id}/insights - cross-quiz dashboard for the caller.
pub async fn user_insights(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
    Extension(claims): Extension<JwtClaims>,
) -> Result<Json<InsightsResponse>, AppError> {
    require_self(&claims, user_id)?;

    let attempts = state.history.for_user(user_id).await;
    Ok(Json(insights_service::build_insights(
        user_id,
        &attempts,
        &state.catalog,
        Utc::now().date_naive(),
    )))
}

fn require_self(claims: &JwtClaims, user_id: UserId) -> Result<(), AppError> {
    if claims.user_id()? != user_id {
        return Err(AppError::Forbidden(
            "Cannot access another user's data".to_string(),
        ));
    }
    Ok(())
}
