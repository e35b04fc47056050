use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::metrics::{SESSIONS_ACTIVE, SESSIONS_TOTAL};
use crate::models::{Difficulty, QuestionId, QuizId, Session, UserId};

/// In-process session registry keyed by (user, quiz). At most one open
/// session per pair: starting again replaces the previous one (latest start
/// wins). Expired sessions are dropped lazily whenever the pair is touched.
///
/// All operations are single critical sections under one async mutex and
/// never await while holding it, which serializes a submit against a
/// concurrent start on the same pair.
pub struct SessionStore {
    sessions: Mutex<HashMap<(UserId, QuizId), Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    /// Opens a session for (user, quiz), replacing any existing one.
    pub async fn start(
        &self,
        user_id: UserId,
        quiz_id: QuizId,
        difficulty: Difficulty,
        question_ids: Vec<QuestionId>,
    ) -> Session {
        let now = Utc::now();
        let session = Session {
            user_id,
            quiz_id,
            difficulty,
            question_ids,
            started_at: now,
            expires_at: now + self.ttl,
        };

        let mut sessions = self.sessions.lock().await;
        let replaced = sessions
            .insert((user_id, quiz_id), session.clone())
            .is_some();
        drop(sessions);

        if replaced {
            SESSIONS_TOTAL.with_label_values(&["replaced"]).inc();
        } else {
            SESSIONS_TOTAL.with_label_values(&["created"]).inc();
            SESSIONS_ACTIVE.inc();
        }

        tracing::info!(
            "Session started: user={}, quiz={}, difficulty={}, questions={}",
            user_id,
            quiz_id,
            session.difficulty,
            session.question_ids.len()
        );

        session
    }

    /// Returns the open session for (user, quiz) without consuming it.
    /// An expired session is removed and reported as absent.
    pub async fn open_session(&self, user_id: UserId, quiz_id: QuizId) -> Option<Session> {
        let mut sessions = self.sessions.lock().await;
        match self.fresh_entry(&mut sessions, user_id, quiz_id, Utc::now()) {
            Some(session) => Some(session.clone()),
            None => None,
        }
    }

    /// Consumes the open session for submit, but only when the submitted
    /// answer count matches the sampled set. On a mismatch the session
    /// stays open so the client can resubmit a complete answer set.
    pub async fn take_for_submit(
        &self,
        user_id: UserId,
        quiz_id: QuizId,
        answer_count: usize,
    ) -> Result<Session, crate::error::AppError> {
        use crate::error::AppError;

        let mut sessions = self.sessions.lock().await;
        let expected = match self.fresh_entry(&mut sessions, user_id, quiz_id, Utc::now()) {
            Some(session) => session.question_ids.len(),
            None => {
                return Err(AppError::NoOpenSession(
                    "Quiz not started".to_string(),
                ))
            }
        };

        if answer_count != expected {
            return Err(AppError::validation(format!(
                "Expected {} answers, got {}",
                expected, answer_count
            )));
        }

        let session = sessions
            .remove(&(user_id, quiz_id))
            .expect("entry checked above");
        drop(sessions);

        SESSIONS_TOTAL.with_label_values(&["completed"]).inc();
        SESSIONS_ACTIVE.dec();
        Ok(session)
    }

    /// Drops every expired session. Exposed for periodic sweeps; the lazy
    /// per-pair expiry above does not depend on it.
    pub async fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        let dropped = before - sessions.len();
        drop(sessions);

        if dropped > 0 {
            SESSIONS_TOTAL
                .with_label_values(&["expired"])
                .inc_by(dropped as u64);
            SESSIONS_ACTIVE.sub(dropped as i64);
            tracing::info!("Swept {} expired sessions", dropped);
        }
        dropped
    }

    fn fresh_entry<'a>(
        &self,
        sessions: &'a mut HashMap<(UserId, QuizId), Session>,
        user_id: UserId,
        quiz_id: QuizId,
        now: DateTime<Utc>,
    ) -> Option<&'a Session> {
        let expired = sessions
            .get(&(user_id, quiz_id))
            .is_some_and(|s| s.expires_at <= now);
        if expired {
            sessions.remove(&(user_id, quiz_id));
            SESSIONS_TOTAL.with_label_values(&["expired"]).inc();
            SESSIONS_ACTIVE.dec();
            tracing::warn!("Session expired: user={}, quiz={}", user_id, quiz_id);
            return None;
        }
        sessions.get(&(user_id, quiz_id))
    }
}
