use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Summary statistics over one homogeneous batch of outcomes: one Load
/// Generator invocation against a single target.
///
/// Invariants: `successful_requests + failed_requests == total_requests`;
/// `error_rate_percent == 100 * failed / total` (0 when the batch is empty).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchStats {
    pub target: String,
    pub concurrency: u32,
    pub requests_per_actor: u32,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub avg_latency_ms: f64,
    pub min_latency_ms: f64,
    pub max_latency_ms: f64,
    pub requests_per_second: f64,
    pub error_rate_percent: f64,
    /// Status code (or error class) to occurrence count.
    pub code_distribution: HashMap<String, u64>,
    /// Raw latencies retained for percentile computation within this batch.
    /// Not part of the serialized result shape.
    #[serde(skip)]
    pub latencies_ms: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointResult {
    pub url: String,
    pub method: String,
    pub stats: BatchStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub sql: String,
    pub stats: BatchStats,
}

/// Tagged union over the two result shapes. The variant is fixed when the
/// batch is constructed; consumers match on it instead of sniffing fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BatchResult {
    Http(EndpointResult),
    Db(QueryResult),
}

impl BatchResult {
    pub fn stats(&self) -> &BatchStats {
        match self {
            Self::Http(r) => &r.stats,
            Self::Db(r) => &r.stats,
        }
    }

    pub fn target(&self) -> &str {
        &self.stats().target
    }

    pub fn is_db(&self) -> bool {
        matches!(self, Self::Db(_))
    }
}
