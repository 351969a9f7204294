//! Engine configuration
//!
//! The engine has a small amount of process-wide state: the comparison epsilon, the
//! capacity of the classification cache and the depth limit of curve subdivision.
//! [`RegionConfig`] groups them so they can be loaded from JSON and installed in one go.

use crate::cache;
use crate::tolerance;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Default number of classifications kept in the cache
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// Default depth limit for curve/curve subdivision
pub const DEFAULT_SUBDIVISION_DEPTH: usize = 48;

static SUBDIVISION_DEPTH: AtomicUsize = AtomicUsize::new(DEFAULT_SUBDIVISION_DEPTH);

/// Tunable parameters for the region engine
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Relative epsilon used by every approximate comparison
    pub epsilon: f64,

    /// Maximum number of component pair classifications kept in the cache
    pub cache_capacity: usize,

    /// Maximum recursion depth for curve/curve intersection
    pub subdivision_depth: usize,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            epsilon: tolerance::DEFAULT_EPSILON,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            subdivision_depth: DEFAULT_SUBDIVISION_DEPTH,
        }
    }
}

impl RegionConfig {
    /// Parse a configuration from JSON. Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: RegionConfig = serde_json::from_str(json)
            .map_err(|e| format!("Failed to parse region config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize this configuration to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize region config: {}", e))
    }

    /// Check that every field holds a usable value
    pub fn validate(&self) -> Result<(), String> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(format!("epsilon must be a positive number, got {}", self.epsilon));
        }
        if self.epsilon >= 1.0 {
            return Err(format!("epsilon must be smaller than 1, got {}", self.epsilon));
        }
        if self.cache_capacity == 0 {
            return Err("cache_capacity must be at least 1".to_string());
        }
        if self.subdivision_depth == 0 {
            return Err("subdivision_depth must be at least 1".to_string());
        }
        Ok(())
    }

    /// Make this configuration the active one for the whole process
    ///
    /// Changing the epsilon invalidates cached classifications, so the cache is
    /// cleared whenever the epsilon changes.
    pub fn install(&self) {
        let previous = Self::current();
        tolerance::set_epsilon(self.epsilon);
        SUBDIVISION_DEPTH.store(self.subdivision_depth.max(1), Ordering::Relaxed);

        let cache = cache::global();
        cache.resize(self.cache_capacity);
        if previous.epsilon != self.epsilon {
            cache.clear();
        }

        log::debug!(
            "Installed region config: epsilon={} cache_capacity={} subdivision_depth={}",
            self.epsilon,
            self.cache_capacity,
            self.subdivision_depth
        );
    }

    /// The configuration currently in effect
    pub fn current() -> Self {
        Self {
            epsilon: tolerance::epsilon(),
            cache_capacity: cache::global().capacity(),
            subdivision_depth: subdivision_depth(),
        }
    }
}

/// Active subdivision depth limit
pub(crate) fn subdivision_depth() -> usize {
    SUBDIVISION_DEPTH.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_fills_defaults() {
        let config = RegionConfig::from_json(r#"{ "cache_capacity": 16 }"#).unwrap();
        assert_eq!(config.cache_capacity, 16);
        assert_eq!(config.epsilon, tolerance::DEFAULT_EPSILON);
        assert_eq!(config.subdivision_depth, DEFAULT_SUBDIVISION_DEPTH);
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        assert!(RegionConfig::from_json(r#"{ "epsilon": -1.0 }"#).is_err());
        assert!(RegionConfig::from_json(r#"{ "cache_capacity": 0 }"#).is_err());
        assert!(RegionConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = RegionConfig {
            epsilon: 1e-7,
            cache_capacity: 10,
            subdivision_depth: 20,
        };
        let json = config.to_json().unwrap();
        assert_eq!(RegionConfig::from_json(&json).unwrap(), config);
    }
}
