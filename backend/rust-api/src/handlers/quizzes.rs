use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;

use crate::error::AppError;
use crate::metrics::ATTEMPTS_SUBMITTED_TOTAL;
use crate::middlewares::auth::JwtClaims;
use crate::models::{
    Difficulty, QuestionId, QuestionSetResponse, QuestionView, QuizDetail, QuizId,
    QuizSummary, StartQuizRequest, StartQuizResponse, SubmitQuizRequest, SubmitQuizResponse,
};
use crate::services::{sampler, scoring_service, AppState};

/// GET /quizzes - public catalog listing, no question bodies.
pub async fn list_quizzes(State(state): State<Arc<AppState>>) -> Json<Vec<QuizSummary>> {
    Json(state.catalog.list())
}

/// GET /quizzes/{id} - quiz detail with client-safe question views.
pub async fn get_quiz(
    State(state): State<Arc<AppState>>,
    Path(quiz_id): Path<QuizId>,
) -> Result<Json<QuizDetail>, AppError> {
    let quiz = state
        .catalog
        .get(quiz_id)
        .ok_or_else(|| AppError::not_found(format!("Quiz {} not found", quiz_id)))?;

    Ok(Json(QuizDetail {
        id: quiz.id,
        title: quiz.title.clone(),
        description: quiz.description.clone(),
        questions: quiz.questions.iter().map(QuestionView::from).collect(),
    }))
}

/// POST /quizzes/{id}/start - samples a question set and opens a session.
/// Starting again for the same quiz discards the previous open session.
pub async fn start_quiz(
    State(state): State<Arc<AppState>>,
    Path(quiz_id): Path<QuizId>,
    Extension(claims): Extension<JwtClaims>,
    body: Option<Json<StartQuizRequest>>,
) -> Result<Json<StartQuizResponse>, AppError> {
    let user_id = claims.user_id()?;
    let quiz = state
        .catalog
        .get(quiz_id)
        .ok_or_else(|| AppError::not_found(format!("Quiz {} not found", quiz_id)))?;

    let req = body.map(|Json(b)| b).unwrap_or_default();
    let difficulty = Difficulty::parse_or_default(req.difficulty.as_deref());

    let question_ids: Vec<QuestionId> = {
        let mut rng = rand::rng();
        sampler::sample_questions(quiz, difficulty, state.config.sample_size, &mut rng)?
            .iter()
            .map(|q| q.id)
            .collect()
    };

    let session = state
        .sessions
        .start(user_id, quiz_id, difficulty, question_ids)
        .await;

    Ok(Json(StartQuizResponse {
        difficulty: session.difficulty,
        total_questions: session.question_ids.len(),
        expires_at: session.expires_at,
    }))
}

/// GET /quizzes/{id}/questions/random/{difficulty} - the question set of the
/// open session, in sampled order. The set is fixed at start time; this
/// endpoint replays it rather than drawing again.
pub async fn session_questions(
    State(state): State<Arc<AppState>>,
    Path((quiz_id, difficulty)): Path<(QuizId, String)>,
    Extension(claims): Extension<JwtClaims>,
) -> Result<Json<QuestionSetResponse>, AppError> {
    let user_id = claims.user_id()?;
    let quiz = state
        .catalog
        .get(quiz_id)
        .ok_or_else(|| AppError::not_found(format!("Quiz {} not found", quiz_id)))?;

    let session = state
        .sessions
        .open_session(user_id, quiz_id)
        .await
        .ok_or_else(|| AppError::NoOpenSession("Quiz not started".to_string()))?;

    let requested = Difficulty::parse_or_default(Some(&difficulty));
    if requested != session.difficulty {
        return Err(AppError::validation(format!(
            "Open session is for difficulty {}; start again to switch",
            session.difficulty
        )));
    }

    let by_id: HashMap<QuestionId, QuestionView> = quiz
        .questions
        .iter()
        .map(|q| (q.id, QuestionView::from(q)))
        .collect();

    let questions = session
        .question_ids
        .iter()
        .filter_map(|id| by_id.get(id).cloned())
        .collect();

    Ok(Json(QuestionSetResponse { questions }))
}

/// POST /quizzes/{id}/submit - grades the full answer set against the open
/// session, consumes the session and appends the attempt to the ledger.
pub async fn submit_quiz(
    State(state): State<Arc<AppState>>,
    Path(quiz_id): Path<QuizId>,
    Extension(claims): Extension<JwtClaims>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<Json<SubmitQuizResponse>, AppError> {
    let user_id = claims.user_id()?;
    let quiz = state
        .catalog
        .get(quiz_id)
        .ok_or_else(|| AppError::not_found(format!("Quiz {} not found", quiz_id)))?;

    let session = state
        .sessions
        .take_for_submit(user_id, quiz_id, req.answers.len())
        .await?;

    let attempt = scoring_service::grade(&session, quiz, &req, Utc::now())?;

    ATTEMPTS_SUBMITTED_TOTAL
        .with_label_values(&[attempt.difficulty.as_str()])
        .inc();
    tracing::info!(
        "Attempt scored: user={}, quiz={}, score={}/{}",
        user_id,
        quiz_id,
        attempt.score,
        attempt.total
    );

    let response = SubmitQuizResponse {
        attempt_id: attempt.id.clone(),
        user_id,
        quiz_id,
        score: attempt.score,
        total: attempt.total,
    };
    state.history.append(attempt).await;

    Ok(Json(response))
}
