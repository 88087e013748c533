//! Benchmark counters

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotone counters accumulated over every query a driver runs.
///
/// Counters are only reset by constructing a new driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Number of `run`/`run_to` calls
    pub queries_run: u64,
    /// Vertices extracted from the queue
    pub vertices_scanned: u64,
    /// Successful decrease-key calls
    pub keys_decreased: u64,
}

impl Stats {
    /// Average scans per query, 0 before the first query
    pub fn scans_per_query(&self) -> f64 {
        ratio(self.vertices_scanned, self.queries_run)
    }

    pub fn decreases_per_query(&self) -> f64 {
        ratio(self.keys_decreased, self.queries_run)
    }
}

fn ratio(total: u64, queries: u64) -> f64 {
    if queries == 0 {
        0.0
    } else {
        total as f64 / queries as f64
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "queries: {}  scans: {} ({:.2}/query)  updates: {} ({:.2}/query)",
            self.queries_run,
            self.vertices_scanned,
            self.scans_per_query(),
            self.keys_decreased,
            self.decreases_per_query()
        )
    }
}
