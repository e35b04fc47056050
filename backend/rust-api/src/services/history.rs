use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::models::attempt::Attempt;
use crate::models::{QuizId, UserId};

/// Append-only ledger of completed attempts. Records are immutable once
/// appended; every analytics view reads from here.
#[derive(Default)]
pub struct HistoryStore {
    attempts: RwLock<Vec<Attempt>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, attempt: Attempt) {
        let mut attempts = self.attempts.write().await;
        attempts.push(attempt);
    }

    /// All attempts for a user across quizzes, oldest first.
    pub async fn for_user(&self, user_id: UserId) -> Vec<Attempt> {
        let attempts = self.attempts.read().await;
        let mut found: Vec<Attempt> = attempts
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by_key(|a| a.completed_at);
        found
    }

    /// Attempts for one (user, quiz) pair, oldest first. This is the
    /// prediction engine's input ordering.
    pub async fn for_user_quiz(&self, user_id: UserId, quiz_id: QuizId) -> Vec<Attempt> {
        let attempts = self.attempts.read().await;
        let mut found: Vec<Attempt> = attempts
            .iter()
            .filter(|a| a.user_id == user_id && a.quiz_id == quiz_id)
            .cloned()
            .collect();
        found.sort_by_key(|a| a.completed_at);
        found
    }

    /// Attempts completed inside [start, end), any user.
    pub async fn in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Attempt> {
        let attempts = self.attempts.read().await;
        attempts
            .iter()
            .filter(|a| a.completed_at >= start && a.completed_at < end)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Difficulty;
    use chrono::Duration;

    fn attempt(user_id: i64, quiz_id: i64, days_ago: i64) -> Attempt {
        Attempt {
            id: format!("a-{}-{}-{}", user_id, quiz_id, days_ago),
            user_id,
            quiz_id,
            difficulty: Difficulty::Medium,
            score: 3,
            total: 5,
            percentage: 60.0,
            duration_seconds: 120,
            completed_at: Utc::now() - Duration::days(days_ago),
            answers: vec![],
        }
    }

    #[tokio::test]
    async fn reads_are_chronological() {
        let store = HistoryStore::new();
        store.append(attempt(1, 10, 0)).await;
        store.append(attempt(1, 10, 5)).await;
        store.append(attempt(1, 10, 2)).await;

        let history = store.for_user_quiz(1, 10).await;
        assert_eq!(history.len(), 3);
        assert!(history.windows(2).all(|w| w[0].completed_at <= w[1].completed_at));
    }

    #[tokio::test]
    async fn queries_filter_by_user_and_quiz() {
        let store = HistoryStore::new();
        store.append(attempt(1, 10, 0)).await;
        store.append(attempt(1, 11, 0)).await;
        store.append(attempt(2, 10, 0)).await;

        assert_eq!(store.for_user(1).await.len(), 2);
        assert_eq!(store.for_user_quiz(1, 10).await.len(), 1);
        assert_eq!(store.for_user_quiz(2, 11).await.len(), 0);
    }

    #[tokio::test]
    async fn range_is_half_open() {
        let store = HistoryStore::new();
        store.append(attempt(1, 10, 0)).await;
        store.append(attempt(1, 10, 10)).await;

        let start = Utc::now() - Duration::days(3);
        let end = Utc::now() + Duration::days(1);
        assert_eq!(store.in_range(start, end).await.len(), 1);
    }
}
