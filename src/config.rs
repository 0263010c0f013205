//! Store configuration.
//!
//! ```
//! use pantry::{CommitPolicy, StoreConfig};
//!
//! let config = StoreConfig::from_json(r#"{ "commit_policy": "last_resolved" }"#).unwrap();
//! assert_eq!(config.commit_policy, CommitPolicy::LastResolved);
//! assert_eq!(config.fixture_latency_ms, StoreConfig::default().fixture_latency_ms);
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_FIXTURE_LATENCY_MS: u64 = 400;

/// What happens when fetches on the same store overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitPolicy {
    /// Only the most recently issued fetch may commit; older ones are discarded.
    #[default]
    LatestIssued,
    /// Every fetch commits, so whichever resolves last wins.
    LastResolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub commit_policy: CommitPolicy,
    /// Simulated latency of fixture-backed domain stores.
    pub fixture_latency_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            commit_policy: CommitPolicy::default(),
            fixture_latency_ms: DEFAULT_FIXTURE_LATENCY_MS,
        }
    }
}

impl StoreConfig {
    /// Parse a configuration document. Missing fields keep their defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] when the text is not valid JSON or a
    /// field has the wrong shape.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Simulated delay for fixture-backed sources.
    #[must_use]
    pub const fn fixture_latency(&self) -> Duration {
        Duration::from_millis(self.fixture_latency_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = StoreConfig::from_json("{}").unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.commit_policy, CommitPolicy::LatestIssued);
        assert_eq!(config.fixture_latency(), Duration::from_millis(400));
    }

    #[test]
    fn overrides_latency() {
        let config = StoreConfig::from_json(r#"{ "fixture_latency_ms": 0 }"#).unwrap();
        assert!(config.fixture_latency().is_zero());
    }

    #[test]
    fn rejects_unknown_policy() {
        let error = StoreConfig::from_json(r#"{ "commit_policy": "first_wins" }"#).unwrap_err();
        assert!(error.to_string().starts_with("Invalid store configuration"));
    }
}
