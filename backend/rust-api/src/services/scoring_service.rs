use std::collections::HashMap;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::attempt::{AnswerDetail, Attempt};
use crate::models::{Question, QuestionId, Quiz, Session, SubmitQuizRequest};

/// Grades a full answer set against the session's sampled question order
/// and produces the immutable attempt record.
///
/// Unanswered (`null`) and out-of-range entries count as incorrect; they
/// never reject the submission. The answer count itself must match the
/// sampled set exactly.
pub fn grade(
    session: &Session,
    quiz: &Quiz,
    req: &SubmitQuizRequest,
    now: DateTime<Utc>,
) -> Result<Attempt, AppError> {
    if req.answers.len() != session.question_ids.len() {
        return Err(AppError::validation(format!(
            "Expected {} answers, got {}",
            session.question_ids.len(),
            req.answers.len()
        )));
    }

    let question_map: HashMap<QuestionId, &Question> =
        quiz.questions.iter().map(|q| (q.id, q)).collect();

    let mut score = 0u32;
    let mut details = Vec::with_capacity(session.question_ids.len());

    for (question_id, selected) in session.question_ids.iter().zip(req.answers.iter()) {
        let question = question_map.get(question_id).ok_or_else(|| {
            AppError::Internal(anyhow!(
                "Sampled question {} missing from quiz {}",
                question_id,
                quiz.id
            ))
        })?;

        let is_correct = matches!(
            selected,
            Some(idx) if *idx < question.options.len() && *idx == question.correct_option
        );
        if is_correct {
            score += 1;
        }

        details.push(AnswerDetail {
            question_id: *question_id,
            selected_option: *selected,
            correct_option: question.correct_option,
            is_correct,
        });
    }

    let total = session.question_ids.len() as u32;
    let percentage = if total > 0 {
        (score as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    // The session start timestamp is authoritative for duration; the
    // client-reported value is advisory and only used when the server
    // difference is unusable.
    let server_duration = (now - session.started_at).num_seconds();
    let duration_seconds = if server_duration >= 0 {
        server_duration
    } else {
        req.duration_seconds.unwrap_or(0).max(0)
    };

    Ok(Attempt {
        id: Uuid::new_v4().to_string(),
        user_id: session.user_id,
        quiz_id: session.quiz_id,
        difficulty: session.difficulty,
        score,
        total,
        percentage,
        duration_seconds,
        completed_at: now,
        answers: details,
    })
}
