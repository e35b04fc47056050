use serde::Serialize;

use super::{Difficulty, UserId};

/// Aggregate dashboard payload: prediction, streak, weak-topic breakdown
/// and per-category performance in one response.
#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub user_id: UserId,
    pub total_attempts: usize,
    /// Recency-weighted average percentage across all quizzes; absent until
    /// the user has at least one attempt.
    pub predicted_percentage: Option<f64>,
    pub recommended_difficulty: Difficulty,
    pub learning_style: String,
    pub weak_topics: Vec<TopicPerformance>,
    pub category_performance: Vec<TopicPerformance>,
    pub study_tips: Vec<String>,
    pub anomaly: Option<String>,
    pub streak: u32,
}

/// "Topic" is the quiz title; attempts reference quizzes, not free-form
/// topic tags.
#[derive(Debug, Clone, Serialize)]
pub struct TopicPerformance {
    pub topic: String,
    pub average_percentage: f64,
    pub attempts: usize,
}
