use chrono::{DateTime, Utc};
use serde::Serialize;

use super::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Gold,
    Silver,
    Bronze,
}

impl Badge {
    pub fn for_rank(rank: usize) -> Option<Badge> {
        match rank {
            1 => Some(Badge::Gold),
            2 => Some(Badge::Silver),
            3 => Some(Badge::Bronze),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: UserId,
    pub average_percentage: f64,
    pub average_duration_seconds: i64,
    pub attempts_count: usize,
    pub badge: Option<Badge>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyLeaderboard {
    pub week_start: DateTime<Utc>,
    pub week_end: DateTime<Utc>,
    pub leaders: Vec<LeaderboardEntry>,
}
