use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::models::{Quiz, QuizId, QuizSummary};

/// Read-only quiz/question catalog. Loaded and validated once at startup;
/// quiz content never changes while the service is running, so reads need
/// no locking.
pub struct CatalogStore {
    quizzes: HashMap<QuizId, Quiz>,
}

impl CatalogStore {
    pub fn new(quizzes: Vec<Quiz>) -> Result<Self> {
        let mut map = HashMap::with_capacity(quizzes.len());
        let mut seen_questions = HashSet::new();

        for quiz in quizzes {
            for question in &quiz.questions {
                if question.options.len() < 2 {
                    bail!(
                        "Question {} in quiz {} has fewer than 2 options",
                        question.id,
                        quiz.id
                    );
                }
                if question.correct_option >= question.options.len() {
                    bail!(
                        "Question {} in quiz {} has an out-of-range correct option",
                        question.id,
                        quiz.id
                    );
                }
                if !seen_questions.insert(question.id) {
                    bail!("Duplicate question id {} in catalog", question.id);
                }
            }
            if map.insert(quiz.id, quiz).is_some() {
                bail!("Duplicate quiz id in catalog");
            }
        }

        Ok(Self { quizzes: map })
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
        let quizzes: Vec<Quiz> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse catalog file {}", path.display()))?;
        Self::new(quizzes)
    }

    pub fn get(&self, quiz_id: QuizId) -> Option<&Quiz> {
        self.quizzes.get(&quiz_id)
    }

    pub fn quiz_count(&self) -> usize {
        self.quizzes.len()
    }

    /// Listing for the catalog index. Quizzes without questions are omitted,
    /// matching the public listing behavior clients rely on.
    pub fn list(&self) -> Vec<QuizSummary> {
        let mut summaries: Vec<QuizSummary> = self
            .quizzes
            .values()
            .filter(|quiz| !quiz.questions.is_empty())
            .map(|quiz| QuizSummary {
                id: quiz.id,
                title: quiz.title.clone(),
                description: quiz.description.clone(),
                total_questions: quiz.questions.len(),
            })
            .collect();
        summaries.sort_by_key(|s| s.id);
        summaries
    }

    pub fn quiz_title(&self, quiz_id: QuizId) -> String {
        self.quizzes
            .get(&quiz_id)
            .map(|q| q.title.clone())
            .unwrap_or_else(|| format!("Quiz #{}", quiz_id))
    }
}
