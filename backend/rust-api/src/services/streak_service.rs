use std::collections::HashSet;

use chrono::NaiveDate;

use crate::models::attempt::Attempt;

/// Counts consecutive UTC calendar days with at least one attempt, anchored
/// at `today` or `yesterday`. Multiple attempts on one day count once; a
/// streak whose most recent day is older than yesterday is 0.
pub fn compute_streak(attempts: &[Attempt], today: NaiveDate) -> u32 {
    let days: HashSet<NaiveDate> = attempts
        .iter()
        .map(|a| a.completed_at.date_naive())
        .collect();

    let anchor = if days.contains(&today) {
        today
    } else if let Some(yesterday) = today.pred_opt().filter(|d| days.contains(d)) {
        yesterday
    } else {
        return 0;
    };

    let mut streak = 0u32;
    let mut day = anchor;
    while days.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}
