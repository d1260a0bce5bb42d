//! Environment-driven configuration

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Default points for a question when none is given
pub const DEFAULT_QUESTION_POINTS: i64 = 2;
/// Default double-round multiplier
pub const DEFAULT_DOUBLE_MULTIPLIER: i64 = 2;

/// Read a trimmed, non-empty env var and parse it, warning and falling back on garbage
fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return default;
            }
            match trimmed.parse() {
                Ok(value) => value,
                Err(_) => {
                    tracing::warn!("Ignoring unparseable {}={:?}, using default", key, trimmed);
                    default
                }
            }
        }
        Err(_) => default,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
    /// CSV game to load before accepting connections
    pub import_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            import_file: None,
        }
    }
}

impl ServerConfig {
    /// TRIVIA_BIND, TRIVIA_PORT and TRIVIA_IMPORT
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind: env_parse("TRIVIA_BIND", defaults.bind),
            port: env_parse("TRIVIA_PORT", defaults.port),
            import_file: std::env::var("TRIVIA_IMPORT")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub default_points: i64,
    pub double_multiplier: i64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            default_points: DEFAULT_QUESTION_POINTS,
            double_multiplier: DEFAULT_DOUBLE_MULTIPLIER,
        }
    }
}

impl ScoringConfig {
    /// TRIVIA_DEFAULT_POINTS and TRIVIA_DOUBLE_MULTIPLIER
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let mut config = Self {
            default_points: env_parse("TRIVIA_DEFAULT_POINTS", defaults.default_points),
            double_multiplier: env_parse("TRIVIA_DOUBLE_MULTIPLIER", defaults.double_multiplier),
        };
        if config.default_points < 0 {
            tracing::warn!(
                "Ignoring negative TRIVIA_DEFAULT_POINTS={}, using {}",
                config.default_points,
                defaults.default_points
            );
            config.default_points = defaults.default_points;
        }
        if config.double_multiplier < 1 {
            tracing::warn!(
                "TRIVIA_DOUBLE_MULTIPLIER must be at least 1, got {}; using {}",
                config.double_multiplier,
                defaults.double_multiplier
            );
            config.double_multiplier = defaults.double_multiplier;
        }
        tracing::info!(
            default_points = config.default_points,
            double_multiplier = config.double_multiplier,
            "Scoring config loaded"
        );
        config
    }
}
