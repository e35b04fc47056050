use anyhow::Result;

use crate::config::Config;

pub mod catalog;
pub mod history;
pub mod insights_service;
pub mod leaderboard_service;
pub mod prediction_service;
pub mod sampler;
pub mod scoring_service;
pub mod session_service;
pub mod streak_service;

use catalog::CatalogStore;
use history::HistoryStore;
use leaderboard_service::LeaderboardCache;
use session_service::SessionStore;

/// Shared application state handed to every handler behind an `Arc`.
pub struct AppState {
    pub config: Config,
    pub catalog: CatalogStore,
    pub sessions: SessionStore,
    pub history: HistoryStore,
    pub leaderboard_cache: LeaderboardCache,
}

impl AppState {
    /// Builds the state for the running service, loading the quiz catalog
    /// from the configured file.
    pub fn new(config: Config) -> Result<Self> {
        let catalog = CatalogStore::load_from_file(&config.catalog_path)?;
        tracing::info!(
            "Catalog loaded: {} quizzes from {}",
            catalog.quiz_count(),
            config.catalog_path
        );
        Ok(Self::with_catalog(config, catalog))
    }

    /// Builds the state around an in-memory catalog. Used by tests, which
    /// never touch the filesystem.
    pub fn with_catalog(config: Config, catalog: CatalogStore) -> Self {
        let sessions = SessionStore::new(config.session_ttl_seconds);
        let leaderboard_cache = LeaderboardCache::new(config.leaderboard_cache_seconds);
        Self {
            config,
            catalog,
            sessions,
            history: HistoryStore::new(),
            leaderboard_cache,
        }
    }
}
