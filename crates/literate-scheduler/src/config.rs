//! Configuration for the extraction scheduler

use literate_domain::DeletionPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the scheduler
///
/// # Examples
///
/// ```
/// use literate_scheduler::SchedulerConfig;
///
/// let config = SchedulerConfig::from_toml(r#"
///     debounce_ms = 1000
///     deletion_policy = { mode = "grace", misses = 1 }
/// "#).unwrap();
/// assert_eq!(config.debounce_ms, 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Quiet period after the last edit before a request is issued (ms)
    /// Default: 2500
    pub debounce_ms: u64,

    /// When objects missing from a result are deleted
    /// Default: immediately
    pub deletion_policy: DeletionPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 2500,
            deletion_policy: DeletionPolicy::Immediate,
        }
    }
}

impl SchedulerConfig {
    /// Get the quiet period as a Duration
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.debounce_ms == 0 {
            return Err("debounce_ms must be greater than 0".to_string());
        }
        if self.debounce_ms > 60_000 {
            return Err("debounce_ms must be at most 60000".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
