use crate::models::attempt::Attempt;
use crate::models::prediction::{
    AttemptGate, Confidence, ConfidenceLabel, FullPrediction, GatedPrediction, GoalEstimate,
    HistoryPoint, HistorySummary, PredictedScore, PredictionResponse, Recommendation,
    TrendInsight,
};
use crate::models::{QuizId, UserId};

/// Minimum completed attempts on a quiz before any prediction is exposed.
pub const ATTEMPTS_REQUIRED: usize = 2;

/// Goal estimates further out than this many attempts are not worth
/// reporting; the engine returns `null` plus a note instead.
pub const GOAL_ATTEMPTS_CAP: u32 = 50;

const STEP_UP_THRESHOLD: f64 = 85.0;
const STEP_DOWN_THRESHOLD: f64 = 50.0;

/// Computes the prediction payload for one (user, quiz) history.
///
/// Pure given the same inputs: no randomness, no clock reads. `attempts`
/// must be in chronological order (the history store guarantees this) and
/// already filtered to the pair.
pub fn predict(
    user_id: UserId,
    quiz_id: QuizId,
    attempts: &[Attempt],
    goal: Option<f64>,
    streak: u32,
) -> PredictionResponse {
    if attempts.len() < ATTEMPTS_REQUIRED {
        let progress =
            ((attempts.len() as f64 / ATTEMPTS_REQUIRED as f64) * 100.0).round() as u32;
        return PredictionResponse::Gated(GatedPrediction {
            gated: true,
            message: format!(
                "At least {} quiz attempts are required for prediction",
                ATTEMPTS_REQUIRED
            ),
            user_id,
            quiz_id,
            attempts_found: attempts.len(),
            attempts_required: ATTEMPTS_REQUIRED,
            progress,
        });
    }

    let percentages: Vec<f64> = attempts.iter().map(|a| a.percentage).collect();

    let history = attempts
        .iter()
        .enumerate()
        .map(|(i, a)| HistoryPoint {
            attempt_index: i + 1,
            percentage: round2(a.percentage),
            timestamp: a.completed_at,
        })
        .collect();

    let best = percentages.iter().cloned().fold(f64::MIN, f64::max);
    let average = percentages.iter().sum::<f64>() / percentages.len() as f64;
    let last = percentages[percentages.len() - 1];

    let summary = HistorySummary {
        attempts: attempts.len(),
        best_percentage: round2(best),
        average_percentage: round2(average),
        last_percentage: round2(last),
    };

    // Recency-weighted average, clamped to the valid percentage range.
    let predicted_percentage = weighted_average(&percentages).clamp(0.0, 100.0);

    let total_questions = attempts[attempts.len() - 1].total;
    let predicted_score =
        ((predicted_percentage / 100.0) * total_questions as f64).round() as u32;

    let prediction = PredictedScore {
        next_attempt_index: attempts.len() + 1,
        predicted_percentage: round2(predicted_percentage),
        predicted_score,
        total_questions,
    };

    PredictionResponse::Ready(Box::new(FullPrediction {
        gated: false,
        user_id,
        quiz_id,
        history,
        summary,
        confidence: confidence(&percentages),
        insight: trend_insight(&percentages),
        streak,
        prediction,
        recommendation: recommend(attempts),
        goal: goal_estimate(predicted_percentage, goal, &percentages),
        attempt_gate: AttemptGate {
            attempts_found: attempts.len(),
            attempts_required: ATTEMPTS_REQUIRED,
        },
    }))
}

/// Average with linear weights 1..n, so the most recent attempt counts the
/// most. Callers guarantee a non-empty slice.
fn weighted_average(values: &[f64]) -> f64 {
    let weight_sum: f64 = (1..=values.len()).map(|w| w as f64).sum();
    let weighted: f64 = values
        .iter()
        .enumerate()
        .map(|(i, v)| v * (i + 1) as f64)
        .sum();
    weighted / weight_sum
}

/// Least-squares fit of `values` against x = 1..n. Returns (slope,
/// intercept), or None with fewer than two points.
fn linear_fit(values: &[f64]) -> Option<(f64, f64)> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let n_f = n as f64;
    let sum_x: f64 = (1..=n).map(|x| x as f64).sum();
    let sum_y: f64 = values.iter().sum();
    let sum_xy: f64 = values
        .iter()
        .enumerate()
        .map(|(i, y)| (i + 1) as f64 * y)
        .sum();
    let sum_x2: f64 = (1..=n).map(|x| (x as f64) * (x as f64)).sum();

    let denom = n_f * sum_x2 - sum_x * sum_x;
    if denom == 0.0 {
        return None;
    }

    let slope = (n_f * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n_f;
    Some((slope, intercept))
}

fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance =
        values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Confidence grows with attempt count and shrinks with score variability.
fn confidence(percentages: &[f64]) -> Confidence {
    let n = percentages.len();
    let std = std_dev(percentages);

    // Base rises with attempts (caps at 0.85); instability penalty caps at 0.5.
    let base = (0.35 + 0.10 * n as f64).min(0.85);
    let penalty = (std / 30.0).min(0.50);
    let score = (base - penalty).clamp(0.10, 0.95);

    let label = if score >= 0.75 {
        ConfidenceLabel::High
    } else if score >= 0.45 {
        ConfidenceLabel::Medium
    } else {
        ConfidenceLabel::Low
    };

    Confidence {
        label,
        score: round2(score),
        reason: format!("{} attempts, variability (std) ~ {:.2}", n, std),
    }
}

/// Short "what this means" label based on the last change.
fn trend_insight(percentages: &[f64]) -> TrendInsight {
    let last = percentages[percentages.len() - 1];
    let prev = percentages[percentages.len() - 2];
    let delta = last - prev;

    if delta >= 5.0 {
        TrendInsight {
            label: "Improving".to_string(),
            reason: format!("Up by {:.2}% from last attempt", delta),
        }
    } else if delta <= -5.0 {
        TrendInsight {
            label: "Dropping".to_string(),
            reason: format!("Down by {:.2}% from last attempt", delta.abs()),
        }
    } else {
        TrendInsight {
            label: "Stable".to_string(),
            reason: "Small change recently".to_string(),
        }
    }
}

/// Steps the difficulty one tier up or down when the last two attempts
/// agree strongly, otherwise keeps the last used tier. Never leaves the
/// fixed tier ordering.
fn recommend(attempts: &[Attempt]) -> Recommendation {
    let last = &attempts[attempts.len() - 1];
    let prev = &attempts[attempts.len() - 2];
    let current = last.difficulty;

    if last.percentage > STEP_UP_THRESHOLD && prev.percentage > STEP_UP_THRESHOLD {
        let next = current.step_up();
        let reason = if next == current {
            "Already at the hardest tier".to_string()
        } else {
            format!("Last two attempts above {:.0}%", STEP_UP_THRESHOLD)
        };
        return Recommendation {
            next_quiz_difficulty: next,
            reason,
        };
    }

    if last.percentage < STEP_DOWN_THRESHOLD && prev.percentage < STEP_DOWN_THRESHOLD {
        let next = current.step_down();
        let reason = if next == current {
            "Already at the easiest tier".to_string()
        } else {
            format!("Last two attempts below {:.0}%", STEP_DOWN_THRESHOLD)
        };
        return Recommendation {
            next_quiz_difficulty: next,
            reason,
        };
    }

    Recommendation {
        next_quiz_difficulty: current,
        reason: "Recent results are mixed; keep the current tier".to_string(),
    }
}

/// Estimates how many more attempts the improvement trend needs to reach
/// `goal`. Returns 0 when the prediction already meets it, and `null` plus
/// a note when the trend is flat/negative or the estimate is implausibly
/// far out.
fn goal_estimate(
    predicted_percentage: f64,
    goal: Option<f64>,
    percentages: &[f64],
) -> GoalEstimate {
    let Some(raw_goal) = goal else {
        return GoalEstimate {
            target_percentage: None,
            estimated_attempts_needed: None,
            note: None,
        };
    };

    let goal_pct = raw_goal.clamp(0.0, 100.0);

    if predicted_percentage >= goal_pct {
        return GoalEstimate {
            target_percentage: Some(round2(goal_pct)),
            estimated_attempts_needed: Some(0),
            note: Some("You are already on/above your goal based on the prediction.".to_string()),
        };
    }

    let slope_fit = linear_fit(percentages).filter(|(slope, _)| *slope > 0.0);
    let Some((slope, intercept)) = slope_fit else {
        return GoalEstimate {
            target_percentage: Some(round2(goal_pct)),
            estimated_attempts_needed: None,
            note: Some(
                "Your recent trend is not increasing yet. More practice will improve the estimate."
                    .to_string(),
            ),
        };
    };

    // Smallest k >= 1 with intercept + slope * (n + k) >= goal.
    let n = percentages.len() as f64;
    let x_goal = (goal_pct - intercept) / slope;
    let needed = (x_goal - n).ceil().max(1.0) as u32;

    if needed > GOAL_ATTEMPTS_CAP {
        return GoalEstimate {
            target_percentage: Some(round2(goal_pct)),
            estimated_attempts_needed: None,
            note: Some(format!(
                "The estimate exceeds {} attempts; more attempts are needed for a usable trend.",
                GOAL_ATTEMPTS_CAP
            )),
        };
    }

    GoalEstimate {
        target_percentage: Some(round2(goal_pct)),
        estimated_attempts_needed: Some(needed),
        note: Some("Estimated using your current improvement trend.".to_string()),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
