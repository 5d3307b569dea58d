//! Loader and search configuration.
//!
//! Read from a TOML file, e.g.:
//!
//! ```toml
//! workers = 4
//!
//! [throttle]
//! every = 100
//! pause_ms = 10
//!
//! [search]
//! case_insensitive = false
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Number of decode workers used unless configured otherwise
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Pause between decode batches so the load does not starve the host's own threads.
///
/// `every = 0` disables the pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottlePolicy {
    /// Pause after this many decoded records
    pub every: usize,
    pub pause_ms: u64,
}

impl ThrottlePolicy {
    pub const fn disabled() -> Self {
        Self {
            every: 0,
            pause_ms: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.every > 0 && self.pause_ms > 0
    }

    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }

    /// Whether to pause after the record at position `decoded` (0-based) in a partition
    pub fn should_pause(&self, decoded: usize) -> bool {
        self.is_enabled() && decoded % self.every == 0
    }
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self {
            every: 100,
            pause_ms: 10,
        }
    }
}

/// Regex matching options for searches.
///
/// Patterns are unanchored: a record matches when the pattern is found
/// anywhere in the field. Matching is case-sensitive unless
/// `case_insensitive` is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub workers: usize,
    pub throttle: ThrottlePolicy,
    pub search: MatchOptions,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKER_COUNT,
            throttle: ThrottlePolicy::default(),
            search: MatchOptions::default(),
        }
    }
}

impl LoaderConfig {
    pub fn builder() -> LoaderConfigBuilder {
        LoaderConfigBuilder::default()
    }

    /// Load a TOML config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let config = Self::from_toml(&content)?;
        debug!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::InvalidConfig(
                "workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoaderConfigBuilder {
    workers: Option<usize>,
    throttle: Option<ThrottlePolicy>,
    search: Option<MatchOptions>,
}

impl LoaderConfigBuilder {
    /// Set the number of decode workers
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn throttle(mut self, throttle: ThrottlePolicy) -> Self {
        self.throttle = Some(throttle);
        self
    }

    pub fn case_insensitive(mut self, enabled: bool) -> Self {
        self.search = Some(MatchOptions {
            case_insensitive: enabled,
        });
        self
    }

    pub fn build(self) -> LoaderConfig {
        let default = LoaderConfig::default();
        LoaderConfig {
            workers: self.workers.unwrap_or(default.workers),
            throttle: self.throttle.unwrap_or(default.throttle),
            search: self.search.unwrap_or(default.search),
        }
    }
}
