use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Difficulty, QuestionId, QuizId, UserId};

/// One completed, scored quiz run. Immutable once appended to the history
/// ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    pub id: String,
    pub user_id: UserId,
    pub quiz_id: QuizId,
    pub difficulty: Difficulty,
    pub score: u32,
    pub total: u32,
    pub percentage: f64,
    pub duration_seconds: i64,
    pub completed_at: DateTime<Utc>,
    pub answers: Vec<AnswerDetail>,
}

/// Per-question review row kept on the attempt for the history endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerDetail {
    pub question_id: QuestionId,
    pub selected_option: Option<usize>,
    pub correct_option: usize,
    pub is_correct: bool,
}

#[derive(Debug, Serialize)]
pub struct AttemptSummary {
    pub quiz_id: QuizId,
    pub score: u32,
    pub total: u32,
    pub percentage: f64,
    pub difficulty: Difficulty,
    pub timestamp: DateTime<Utc>,
    pub duration_seconds: i64,
}

impl From<&Attempt> for AttemptSummary {
    fn from(a: &Attempt) -> Self {
        Self {
            quiz_id: a.quiz_id,
            score: a.score,
            total: a.total,
            percentage: a.percentage,
            difficulty: a.difficulty,
            timestamp: a.completed_at,
            duration_seconds: a.duration_seconds,
        }
    }
}
