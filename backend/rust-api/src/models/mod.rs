use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod attempt;
pub mod insights;
pub mod leaderboard;
pub mod prediction;

pub type UserId = i64;
pub type QuizId = i64;
pub type QuestionId = i64;

/// Fixed, ordered difficulty tiers. The derived `Ord` follows declaration
/// order, which the recommendation stepping relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(rename = "Very Easy")]
    VeryEasy,
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::VeryEasy,
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::VeryEasy => "Very Easy",
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Case-insensitive parse. Unknown or absent values fall back to Medium,
    /// the default tier for new attempts.
    pub fn parse_or_default(input: Option<&str>) -> Difficulty {
        let Some(raw) = input else {
            return Difficulty::Medium;
        };
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "very easy" | "very_easy" => Difficulty::VeryEasy,
            "easy" => Difficulty::Easy,
            "medium" => Difficulty::Medium,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }

    /// One tier harder, saturating at Hard.
    pub fn step_up(&self) -> Difficulty {
        let idx = Self::ALL.iter().position(|d| d == self).unwrap_or(2);
        Self::ALL[(idx + 1).min(Self::ALL.len() - 1)]
    }

    /// One tier easier, saturating at Very Easy.
    pub fn step_down(&self) -> Difficulty {
        let idx = Self::ALL.iter().position(|d| d == self).unwrap_or(2);
        Self::ALL[idx.saturating_sub(1)]
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub quiz_id: QuizId,
    pub question: String,
    pub options: Vec<String>,
    pub correct_option: usize,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: QuizId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Serialize)]
pub struct QuizSummary {
    pub id: QuizId,
    pub title: String,
    pub description: String,
    pub total_questions: usize,
}

/// Client-facing question. The correct option index is intentionally not
/// part of this struct so it can never leak through a response body.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: QuestionId,
    pub question: String,
    pub options: Vec<String>,
}

impl From<&Question> for QuestionView {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            question: q.question.clone(),
            options: q.options.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuizDetail {
    pub id: QuizId,
    pub title: String,
    pub description: String,
    pub questions: Vec<QuestionView>,
}

/// Ephemeral record of an in-progress attempt. Never persisted; destroyed
/// by the matching submit or dropped once past `expires_at`.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: UserId,
    pub quiz_id: QuizId,
    pub difficulty: Difficulty,
    pub question_ids: Vec<QuestionId>,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Default)]
pub struct StartQuizRequest {
    pub difficulty: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StartQuizResponse {
    pub difficulty: Difficulty,
    pub total_questions: usize,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct QuestionSetResponse {
    pub questions: Vec<QuestionView>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    /// One entry per sampled question, in session order. `null` marks a
    /// question left unanswered; it is graded as incorrect.
    pub answers: Vec<Option<usize>>,
    /// Advisory client-side timer value. The server-side session timestamp
    /// is authoritative for duration.
    pub duration_seconds: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SubmitQuizResponse {
    pub attempt_id: String,
    pub user_id: UserId,
    pub quiz_id: QuizId,
    pub score: u32,
    pub total: u32,
}
