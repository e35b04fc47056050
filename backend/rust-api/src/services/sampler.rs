use rand::Rng;

use crate::error::AppError;
use crate::models::{Difficulty, Question, Quiz};

/// Draws up to `count` questions of the requested difficulty, uniformly at
/// random and without replacement. The draw shuffles an index list over the
/// filtered pool rather than the question values themselves; when the pool
/// is smaller than `count` the whole pool is returned.
///
/// Generic over the RNG so tests can pass a seeded `StdRng`.
pub fn sample_questions<'a, R: Rng + ?Sized>(
    quiz: &'a Quiz,
    difficulty: Difficulty,
    count: usize,
    rng: &mut R,
) -> Result<Vec<&'a Question>, AppError> {
    let pool: Vec<&Question> = quiz
        .questions
        .iter()
        .filter(|q| q.difficulty == difficulty)
        .collect();

    if pool.is_empty() {
        return Err(AppError::EmptyPool(format!(
            "No questions available for difficulty {}",
            difficulty
        )));
    }

    let amount = count.min(pool.len());
    let picked = rand::seq::index::sample(rng, pool.len(), amount);

    Ok(picked.into_iter().map(|i| pool[i]).collect())
}
