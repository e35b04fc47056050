use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub http_port: u16,
    pub jwt_secret: String,
    pub catalog_path: String,
    /// Upper bound on questions sampled per attempt.
    pub sample_size: usize,
    /// Open sessions are garbage-collected after this many seconds.
    pub session_ttl_seconds: i64,
    /// Weekly leaderboard snapshot lifetime.
    pub leaderboard_cache_seconds: u64,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let config_builder = config::Config::builder()
            .add_source(
                config::File::with_name(&format!("config/{}", env)).required(false), // Allow missing config file, fallback to ENV
            )
            // Override with environment variables (prefix: APP_)
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let settings = config_builder.build()?;

        let http_port = settings
            .get_string("server.http_port")
            .or_else(|_| env::var("HTTP_PORT"))
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8081);

        let jwt_secret = settings
            .get_string("auth.jwt_secret")
            .or_else(|_| env::var("JWT_SECRET"))
            .unwrap_or_else(|_| {
                if env == "prod" {
                    panic!("FATAL: JWT_SECRET must be set in production!");
                }
                eprintln!("WARNING: Using default JWT_SECRET (dev mode only!)");
                "dev-secret-only-for-local-testing".to_string()
            });

        let catalog_path = settings
            .get_string("catalog.path")
            .or_else(|_| env::var("CATALOG_PATH"))
            .unwrap_or_else(|_| "data/catalog.json".to_string());

        let sample_size = settings
            .get_string("quiz.sample_size")
            .or_else(|_| env::var("SAMPLE_SIZE"))
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(20);

        let session_ttl_seconds = settings
            .get_string("quiz.session_ttl_seconds")
            .or_else(|_| env::var("SESSION_TTL_SECONDS"))
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(7200);

        let leaderboard_cache_seconds = settings
            .get_string("quiz.leaderboard_cache_seconds")
            .or_else(|_| env::var("LEADERBOARD_CACHE_SECONDS"))
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        Ok(Config {
            http_port,
            jwt_secret,
            catalog_path,
            sample_size,
            session_ttl_seconds,
            leaderboard_cache_seconds,
        })
    }
}
