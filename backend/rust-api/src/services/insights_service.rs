use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::attempt::Attempt;
use crate::models::insights::{InsightsResponse, TopicPerformance};
use crate::models::{Difficulty, QuizId, UserId};
use crate::services::catalog::CatalogStore;
use crate::services::streak_service::compute_streak;

const WEAK_TOPIC_THRESHOLD: f64 = 60.0;
const ANOMALY_DELTA: f64 = 20.0;

/// Assembles the cross-quiz dashboard for one user from their full attempt
/// history. `attempts` must be in chronological order.
pub fn build_insights(
    user_id: UserId,
    attempts: &[Attempt],
    catalog: &CatalogStore,
    today: NaiveDate,
) -> InsightsResponse {
    let percentages: Vec<f64> = attempts.iter().map(|a| a.percentage).collect();

    let predicted_percentage = if percentages.is_empty() {
        None
    } else {
        Some(round2(weighted_average(&percentages).clamp(0.0, 100.0)))
    };

    let recommended_difficulty = recommend_difficulty(predicted_percentage);
    let learning_style = learning_style(attempts).to_string();

    let category_performance = per_topic(attempts, catalog);
    let weak_topics: Vec<TopicPerformance> = category_performance
        .iter()
        .filter(|t| t.average_percentage < WEAK_TOPIC_THRESHOLD)
        .cloned()
        .collect();

    let streak = compute_streak(attempts, today);
    let anomaly = detect_anomaly(&percentages);
    let study_tips = study_tips(predicted_percentage, &weak_topics, streak);

    InsightsResponse {
        user_id,
        total_attempts: attempts.len(),
        predicted_percentage,
        recommended_difficulty,
        learning_style,
        weak_topics,
        category_performance,
        study_tips,
        anomaly,
        streak,
    }
}

fn weighted_average(values: &[f64]) -> f64 {
    let weight_sum: f64 = (1..=values.len()).map(|w| w as f64).sum();
    let weighted: f64 = values
        .iter()
        .enumerate()
        .map(|(i, v)| v * (i + 1) as f64)
        .sum();
    weighted / weight_sum
}

/// Maps the overall predicted percentage onto an absolute tier, unlike the
/// per-quiz recommendation which steps relative to the last used tier.
fn recommend_difficulty(predicted: Option<f64>) -> Difficulty {
    match predicted {
        Some(p) if p >= 85.0 => Difficulty::Hard,
        Some(p) if p >= 65.0 => Difficulty::Medium,
        Some(p) if p >= 40.0 => Difficulty::Easy,
        Some(_) => Difficulty::VeryEasy,
        None => Difficulty::Medium,
    }
}

fn learning_style(attempts: &[Attempt]) -> &'static str {
    if attempts.is_empty() {
        return "Not enough data yet";
    }

    let avg_pct =
        attempts.iter().map(|a| a.percentage).sum::<f64>() / attempts.len() as f64;
    let avg_secs_per_question = attempts
        .iter()
        .filter(|a| a.total > 0)
        .map(|a| a.duration_seconds as f64 / a.total as f64)
        .sum::<f64>()
        / attempts.len() as f64;

    match (avg_pct >= 75.0, avg_secs_per_question <= 30.0) {
        (true, true) => "Fast and accurate",
        (true, false) => "Deliberate and accurate",
        (false, true) => "Quick but error-prone",
        (false, false) => "Steady, still building fundamentals",
    }
}

fn per_topic(attempts: &[Attempt], catalog: &CatalogStore) -> Vec<TopicPerformance> {
    let mut grouped: HashMap<QuizId, Vec<f64>> = HashMap::new();
    for attempt in attempts {
        grouped
            .entry(attempt.quiz_id)
            .or_default()
            .push(attempt.percentage);
    }

    let mut topics: Vec<TopicPerformance> = grouped
        .into_iter()
        .map(|(quiz_id, pcts)| TopicPerformance {
            topic: catalog.quiz_title(quiz_id),
            average_percentage: round2(pcts.iter().sum::<f64>() / pcts.len() as f64),
            attempts: pcts.len(),
        })
        .collect();

    // Weakest first; name as the final tiebreak keeps the output stable.
    topics.sort_by(|a, b| {
        a.average_percentage
            .partial_cmp(&b.average_percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.topic.cmp(&b.topic))
    });
    topics
}

/// Flags the latest attempt when it lands far outside the running average
/// of everything before it.
fn detect_anomaly(percentages: &[f64]) -> Option<String> {
    if percentages.len() < 2 {
        return None;
    }

    let last = percentages[percentages.len() - 1];
    let prior = &percentages[..percentages.len() - 1];
    let prior_avg = prior.iter().sum::<f64>() / prior.len() as f64;
    let delta = last - prior_avg;

    if delta >= ANOMALY_DELTA {
        Some(format!(
            "Latest attempt ({:.1}%) is well above your prior average ({:.1}%).",
            last, prior_avg
        ))
    } else if delta <= -ANOMALY_DELTA {
        Some(format!(
            "Latest attempt ({:.1}%) is well below your prior average ({:.1}%).",
            last, prior_avg
        ))
    } else {
        None
    }
}

fn study_tips(
    predicted: Option<f64>,
    weak_topics: &[TopicPerformance],
    streak: u32,
) -> Vec<String> {
    let mut tips = Vec::new();

    match predicted {
        None => tips.push("Take a quiz to start building your performance profile.".to_string()),
        Some(p) if p < 50.0 => {
            tips.push("Revisit the basics before moving up a difficulty tier.".to_string())
        }
        Some(p) if p >= 85.0 => {
            tips.push("You are scoring consistently high; try harder questions.".to_string())
        }
        Some(_) => tips.push("Keep practicing regularly to push your average up.".to_string()),
    }

    if let Some(weakest) = weak_topics.first() {
        tips.push(format!(
            "Focus on \"{}\" where you average {:.1}%.",
            weakest.topic, weakest.average_percentage
        ));
    }

    if streak == 0 {
        tips.push("Practice today to start a new streak.".to_string());
    } else {
        tips.push(format!(
            "You are on a {}-day streak; a quiz today keeps it alive.",
            streak
        ));
    }

    tips
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Question, Quiz};
    use chrono::{Duration, TimeZone, Utc};

    fn catalog() -> CatalogStore {
        let quizzes = vec![
            Quiz {
                id: 1,
                title: "Rust Basics".into(),
                description: String::new(),
                questions: vec![Question {
                    id: 1,
                    quiz_id: 1,
                    question: "q".into(),
                    options: vec!["a".into(), "b".into()],
                    correct_option: 0,
                    difficulty: Difficulty::Easy,
                }],
            },
            Quiz {
                id: 2,
                title: "Networking".into(),
                description: String::new(),
                questions: vec![Question {
                    id: 2,
                    quiz_id: 2,
                    question: "q".into(),
                    options: vec!["a".into(), "b".into()],
                    correct_option: 0,
                    difficulty: Difficulty::Easy,
                }],
            },
        ];
        CatalogStore::new(quizzes).unwrap()
    }

    fn attempt(quiz_id: i64, percentage: f64, days_ago: i64, duration: i64) -> Attempt {
        Attempt {
            id: format!("a-{}-{}", quiz_id, days_ago),
            user_id: 1,
            quiz_id,
            difficulty: Difficulty::Medium,
            score: 0,
            total: 10,
            percentage,
            duration_seconds: duration,
            completed_at: Utc.with_ymd_and_hms(2024, 6, 12, 10, 0, 0).unwrap()
                - Duration::days(days_ago),
            answers: vec![],
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 12).unwrap()
    }

    #[test]
    fn empty_history_has_no_prediction_and_a_starter_tip() {
        let insights = build_insights(1, &[], &catalog(), today());
        assert_eq!(insights.total_attempts, 0);
        assert!(insights.predicted_percentage.is_none());
        assert_eq!(insights.recommended_difficulty, Difficulty::Medium);
        assert!(insights.study_tips[0].contains("Take a quiz"));
        assert_eq!(insights.streak, 0);
    }

    #[test]
    fn weak_topics_are_those_below_sixty_percent() {
        let attempts = vec![
            attempt(1, 40.0, 2, 300),
            attempt(1, 50.0, 1, 300),
            attempt(2, 90.0, 0, 300),
        ];
        let insights = build_insights(1, &attempts, &catalog(), today());

        assert_eq!(insights.weak_topics.len(), 1);
        assert_eq!(insights.weak_topics[0].topic, "Rust Basics");
        assert_eq!(insights.weak_topics[0].average_percentage, 45.0);
        assert_eq!(insights.category_performance.len(), 2);
    }

    #[test]
    fn recommended_tier_tracks_the_overall_prediction() {
        let strong = vec![attempt(1, 95.0, 1, 100), attempt(1, 95.0, 0, 100)];
        assert_eq!(
            build_insights(1, &strong, &catalog(), today()).recommended_difficulty,
            Difficulty::Hard
        );

        let weak = vec![attempt(1, 20.0, 1, 100), attempt(1, 30.0, 0, 100)];
        assert_eq!(
            build_insights(1, &weak, &catalog(), today()).recommended_difficulty,
            Difficulty::VeryEasy
        );
    }

    #[test]
    fn anomaly_flags_a_sudden_drop() {
        let attempts = vec![
            attempt(1, 80.0, 3, 100),
            attempt(1, 85.0, 2, 100),
            attempt(1, 40.0, 0, 100),
        ];
        let insights = build_insights(1, &attempts, &catalog(), today());
        assert!(insights.anomaly.unwrap().contains("below"));
    }

    #[test]
    fn steady_results_raise_no_anomaly() {
        let attempts = vec![attempt(1, 70.0, 1, 100), attempt(1, 75.0, 0, 100)];
        let insights = build_insights(1, &attempts, &catalog(), today());
        assert!(insights.anomaly.is_none());
    }

    #[test]
    fn fast_accurate_style_is_detected() {
        let attempts = vec![attempt(1, 90.0, 1, 100), attempt(1, 95.0, 0, 100)];
        let insights = build_insights(1, &attempts, &catalog(), today());
        assert_eq!(insights.learning_style, "Fast and accurate");
    }

    #[test]
    fn streak_feeds_the_tips() {
        let attempts = vec![attempt(1, 70.0, 1, 100), attempt(1, 70.0, 0, 100)];
        let insights = build_insights(1, &attempts, &catalog(), today());
        assert_eq!(insights.streak, 2);
        assert!(insights
            .study_tips
            .iter()
            .any(|t| t.contains("2-day streak")));
    }
}
