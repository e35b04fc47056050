use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Difficulty, QuizId, UserId};

/// Either the gated progress payload or the full prediction, depending on
/// how many attempts exist for the (user, quiz) pair.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PredictionResponse {
    Gated(GatedPrediction),
    Ready(Box<FullPrediction>),
}

/// Returned while the attempt gate is closed. Carries no prediction
/// numbers, only how far the user is from unlocking them.
#[derive(Debug, Serialize)]
pub struct GatedPrediction {
    pub gated: bool,
    pub message: String,
    pub user_id: UserId,
    pub quiz_id: QuizId,
    pub attempts_found: usize,
    pub attempts_required: usize,
    /// round(100 * attempts_found / attempts_required)
    pub progress: u32,
}

#[derive(Debug, Serialize)]
pub struct FullPrediction {
    pub gated: bool,
    pub user_id: UserId,
    pub quiz_id: QuizId,
    pub history: Vec<HistoryPoint>,
    pub summary: HistorySummary,
    pub confidence: Confidence,
    pub insight: TrendInsight,
    pub streak: u32,
    pub prediction: PredictedScore,
    pub recommendation: Recommendation,
    pub goal: GoalEstimate,
    pub attempt_gate: AttemptGate,
}

#[derive(Debug, Serialize)]
pub struct HistoryPoint {
    pub attempt_index: usize,
    pub percentage: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct HistorySummary {
    pub attempts: usize,
    pub best_percentage: f64,
    pub average_percentage: f64,
    pub last_percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfidenceLabel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Serialize)]
pub struct Confidence {
    pub label: ConfidenceLabel,
    pub score: f64,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct TrendInsight {
    pub label: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct PredictedScore {
    pub next_attempt_index: usize,
    pub predicted_percentage: f64,
    pub predicted_score: u32,
    pub total_questions: u32,
}

#[derive(Debug, Serialize)]
pub struct Recommendation {
    pub next_quiz_difficulty: Difficulty,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct GoalEstimate {
    pub target_percentage: Option<f64>,
    pub estimated_attempts_needed: Option<u32>,
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AttemptGate {
    pub attempts_found: usize,
    pub attempts_required: usize,
}
