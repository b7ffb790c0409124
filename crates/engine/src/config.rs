//! Engine configuration
//!
//! A leaderboard is configured once at construction; there is no runtime
//! reconfiguration. The backend choice selects which index implementation
//! serves the three operations.

use podium_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default snapshot rebuild interval in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;

/// Which index implementation backs the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexBackend {
    /// Fine-grained bucket locking; reads observe every completed update.
    Bucketed,
    /// Queued writes applied by a background rebuild tick; reads are
    /// eventually consistent within one tick interval.
    Snapshot,
}

impl Default for IndexBackend {
    fn default() -> Self {
        IndexBackend::Bucketed
    }
}

/// Leaderboard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodiumConfig {
    /// Index implementation to construct.
    #[serde(default)]
    pub backend: IndexBackend,
    /// Snapshot rebuild interval in milliseconds. Ignored by the bucketed
    /// backend.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Seed for the skip-list level generators. `None` draws one from
    /// entropy; tests pin it for reproducible shapes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,
}

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

impl Default for PodiumConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::default(),
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            rng_seed: None,
        }
    }
}

impl PodiumConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` for a zero tick interval.
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "tick_interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The rebuild interval as a `Duration`.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// The configured seed, or one drawn from entropy.
    pub fn seed(&self) -> u64 {
        self.rng_seed.unwrap_or_else(rand::random)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = PodiumConfig::default();
        assert_eq!(cfg.backend, IndexBackend::Bucketed);
        assert_eq!(cfg.tick_interval_ms, 100);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let cfg = PodiumConfig {
            tick_interval_ms: 0,
            ..PodiumConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn backend_serializes_snake_case() {
        let cfg = PodiumConfig {
            backend: IndexBackend::Snapshot,
            ..PodiumConfig::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains(r#""backend":"snapshot""#));
        let back: PodiumConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.backend, IndexBackend::Snapshot);
    }
}
