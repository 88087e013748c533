//! Driver configuration
//!
//! `levels`, `max_delta` and `run_baseline_bfs` belong to the bucket-queue and
//! breadth-first baselines that run next to the heaps in a benchmark. The heap
//! backends ignore them, but they are validated and carried so one config
//! describes a whole benchmark run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default number of bucket levels for the multi-level baseline
pub const DEFAULT_LEVELS: u32 = 2;

/// Priority-queue backend driving the search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Binomial,
    #[default]
    Fibonacci,
}

impl Backend {
    pub const ALL: [Backend; 2] = [Backend::Binomial, Backend::Fibonacci];

    pub fn name(self) -> &'static str {
        match self {
            Backend::Binomial => "binomial",
            Backend::Fibonacci => "fibonacci",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors in a [`SolverConfig`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown backend `{0}`, expected `binomial` or `fibonacci`")]
    UnknownBackend(String),
    #[error("bucket levels must be at least 1")]
    NoLevels,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binomial" | "binheap" => Ok(Backend::Binomial),
            "fibonacci" | "fibheap" => Ok(Backend::Fibonacci),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Everything needed to construct a solver besides the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub backend: Backend,
    /// Bucket levels of the multi-level baseline
    pub levels: u32,
    /// Bucket width parameter of the multi-level baseline
    pub max_delta: u64,
    /// Whether the harness times a breadth-first baseline as well
    pub run_baseline_bfs: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            backend: Backend::default(),
            levels: DEFAULT_LEVELS,
            max_delta: 1,
            run_baseline_bfs: false,
        }
    }
}

impl SolverConfig {
    pub fn with_backend(backend: Backend) -> Self {
        SolverConfig {
            backend,
            ..SolverConfig::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels == 0 {
            return Err(ConfigError::NoLevels);
        }
        Ok(())
    }
}
