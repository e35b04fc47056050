use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::models::attempt::Attempt;
use crate::models::leaderboard::{Badge, LeaderboardEntry, WeeklyLeaderboard};
use crate::models::UserId;
use crate::utils::time::week_bounds;

const MAX_LEADERS: usize = 10;
const MIN_WEEKLY_ATTEMPTS: usize = 3;

/// Builds the weekly ranking from the attempts completed inside the current
/// ISO week window.
///
/// A user qualifies with at least 3 attempts in the window, at least one of
/// them Medium or harder. Ranking is by average percentage, ties broken by
/// lower average duration, then by user id so the order is deterministic.
pub fn build_leaderboard(attempts: &[Attempt], now: DateTime<Utc>) -> WeeklyLeaderboard {
    let (week_start, week_end) = week_bounds(now);

    let mut per_user: HashMap<UserId, Vec<&Attempt>> = HashMap::new();
    for attempt in attempts {
        if attempt.completed_at >= week_start && attempt.completed_at < week_end {
            per_user.entry(attempt.user_id).or_default().push(attempt);
        }
    }

    let mut leaders: Vec<LeaderboardEntry> = per_user
        .into_iter()
        .filter(|(_, user_attempts)| {
            user_attempts.len() >= MIN_WEEKLY_ATTEMPTS
                && user_attempts
                    .iter()
                    .any(|a| a.difficulty >= crate::models::Difficulty::Medium)
        })
        .map(|(user_id, user_attempts)| {
            let count = user_attempts.len();
            let avg_pct =
                user_attempts.iter().map(|a| a.percentage).sum::<f64>() / count as f64;
            let avg_duration = user_attempts
                .iter()
                .map(|a| a.duration_seconds)
                .sum::<i64>()
                / count as i64;
            LeaderboardEntry {
                rank: 0,
                user_id,
                average_percentage: (avg_pct * 100.0).round() / 100.0,
                average_duration_seconds: avg_duration,
                attempts_count: count,
                badge: None,
            }
        })
        .collect();

    leaders.sort_by(|a, b| {
        b.average_percentage
            .partial_cmp(&a.average_percentage)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.average_duration_seconds.cmp(&b.average_duration_seconds))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    leaders.truncate(MAX_LEADERS);

    for (i, entry) in leaders.iter_mut().enumerate() {
        entry.rank = i + 1;
        entry.badge = Badge::for_rank(entry.rank);
    }

    WeeklyLeaderboard {
        week_start,
        week_end,
        leaders,
    }
}

/// Short-lived snapshot cache so a burst of leaderboard reads does not
/// rebuild the ranking on every request.
pub struct LeaderboardCache {
    ttl: Duration,
    snapshot: RwLock<Option<(Instant, WeeklyLeaderboard)>>,
}

impl LeaderboardCache {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            ttl: Duration::from_secs(ttl_seconds),
            snapshot: RwLock::new(None),
        }
    }

    /// Returns the cached snapshot if still fresh, otherwise rebuilds it
    /// from `attempts` and stores the result.
    pub async fn get_or_build(
        &self,
        attempts: &[Attempt],
        now: DateTime<Utc>,
    ) -> WeeklyLeaderboard {
        {
            let cached = self.snapshot.read().await;
            if let Some((built_at, board)) = cached.as_ref() {
                if built_at.elapsed() < self.ttl {
                    return board.clone();
                }
            }
        }

        let board = build_leaderboard(attempts, now);
        let mut cached = self.snapshot.write().await;
        *cached = Some((Instant::now(), board.clone()));
        board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Difficulty;
    use chrono::TimeZone;

    fn attempt(
        user_id: i64,
        percentage: f64,
        duration: i64,
        difficulty: Difficulty,
        completed_at: DateTime<Utc>,
    ) -> Attempt {
        Attempt {
            id: format!("a-{}-{}", user_id, duration),
            user_id,
            quiz_id: 1,
            difficulty,
            score: 0,
            total: 10,
            percentage,
            duration_seconds: duration,
            completed_at,
            answers: vec![],
        }
    }

    fn midweek() -> DateTime<Utc> {
        // Wednesday.
        Utc.with_ymd_and_hms(2024, 6, 12, 12, 0, 0).unwrap()
    }

    fn qualifying(user_id: i64, percentage: f64, duration: i64) -> Vec<Attempt> {
        (0..3)
            .map(|i| {
                attempt(
                    user_id,
                    percentage,
                    duration,
                    if i == 0 {
                        Difficulty::Medium
                    } else {
                        Difficulty::Easy
                    },
                    midweek(),
                )
            })
            .collect()
    }

    #[test]
    fn under_three_attempts_is_excluded() {
        let mut attempts = qualifying(1, 90.0, 100);
        attempts.push(attempt(2, 99.0, 10, Difficulty::Hard, midweek()));
        attempts.push(attempt(2, 99.0, 10, Difficulty::Hard, midweek()));

        let board = build_leaderboard(&attempts, midweek());
        assert_eq!(board.leaders.len(), 1);
        assert_eq!(board.leaders[0].user_id, 1);
    }

    #[test]
    fn only_easy_attempts_are_excluded() {
        let attempts: Vec<Attempt> = (0..4)
            .map(|_| attempt(1, 95.0, 60, Difficulty::Easy, midweek()))
            .collect();
        let board = build_leaderboard(&attempts, midweek());
        assert!(board.leaders.is_empty());
    }

    #[test]
    fn attempts_outside_the_week_do_not_count() {
        let last_week = Utc.with_ymd_and_hms(2024, 6, 5, 12, 0, 0).unwrap();
        let attempts: Vec<Attempt> = (0..5)
            .map(|_| attempt(1, 95.0, 60, Difficulty::Hard, last_week))
            .collect();
        let board = build_leaderboard(&attempts, midweek());
        assert!(board.leaders.is_empty());
    }

    #[test]
    fn higher_average_ranks_first() {
        let mut attempts = qualifying(1, 70.0, 100);
        attempts.extend(qualifying(2, 90.0, 100));

        let board = build_leaderboard(&attempts, midweek());
        assert_eq!(board.leaders[0].user_id, 2);
        assert_eq!(board.leaders[0].rank, 1);
        assert_eq!(board.leaders[1].user_id, 1);
    }

    #[test]
    fn percentage_tie_breaks_on_duration_then_user_id() {
        let mut attempts = qualifying(3, 80.0, 50);
        attempts.extend(qualifying(1, 80.0, 200));
        attempts.extend(qualifying(2, 80.0, 200));

        let board = build_leaderboard(&attempts, midweek());
        let order: Vec<i64> = board.leaders.iter().map(|e| e.user_id).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn top_three_get_badges_and_list_caps_at_ten() {
        let mut attempts = Vec::new();
        for user in 1..=12 {
            attempts.extend(qualifying(user, 100.0 - user as f64, 60));
        }

        let board = build_leaderboard(&attempts, midweek());
        assert_eq!(board.leaders.len(), 10);
        assert_eq!(board.leaders[0].badge, Some(Badge::Gold));
        assert_eq!(board.leaders[1].badge, Some(Badge::Silver));
        assert_eq!(board.leaders[2].badge, Some(Badge::Bronze));
        assert!(board.leaders[3..].iter().all(|e| e.badge.is_none()));
    }

    #[test]
    fn empty_history_yields_an_empty_board_with_bounds() {
        let board = build_leaderboard(&[], midweek());
        assert!(board.leaders.is_empty());
        assert_eq!(board.week_end - board.week_start, chrono::Duration::days(7));
    }

    #[tokio::test]
    async fn cache_serves_the_stored_snapshot_within_ttl() {
        let cache = LeaderboardCache::new(3600);
        let attempts = qualifying(1, 90.0, 60);

        let first = cache.get_or_build(&attempts, midweek()).await;
        assert_eq!(first.leaders.len(), 1);

        // New attempts are invisible until the snapshot expires.
        let mut more = attempts.clone();
        more.extend(qualifying(2, 95.0, 60));
        let second = cache.get_or_build(&more, midweek()).await;
        assert_eq!(second.leaders.len(), 1);
    }

    #[tokio::test]
    async fn zero_ttl_cache_always_rebuilds() {
        let cache = LeaderboardCache::new(0);
        let attempts = qualifying(1, 90.0, 60);
        cache.get_or_build(&attempts, midweek()).await;

        let mut more = attempts.clone();
        more.extend(qualifying(2, 95.0, 60));
        let board = cache.get_or_build(&more, midweek()).await;
        assert_eq!(board.leaders.len(), 2);
    }
}
