use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scenario::ScenarioRun;

/// Report-level roll-up across every result in every completed run.
///
/// Counts are summed; latency, error-rate, and throughput fields are the
/// unweighted arithmetic mean across per-target results rather than a
/// pooled recomputation. Error-heavy endpoints can be understated in the
/// averages — a known approximation, kept deliberately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedSummary {
    pub result_count: usize,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub avg_latency_ms: f64,
    pub avg_error_rate_percent: f64,
    pub avg_requests_per_second: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PercentileBreakdown {
    pub p50_ms: f64,
    pub p90_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grade {
    pub letter: char,
    pub score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessCriterion {
    pub name: String,
    pub threshold: f64,
    pub actual: f64,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessVerdict {
    pub production_ready: bool,
    pub criteria: Vec<ReadinessCriterion>,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationPriority {
    Low,
    Medium,
    High,
    Critical,
}

/// One structured recommendation per threshold breach. Breaches are not
/// deduplicated across results; every breaching target gets its own entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub priority: RecommendationPriority,
    pub message: String,
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceFlags {
    pub meets_latency_slo: bool,
    pub meets_error_rate_slo: bool,
    pub spike_resilient: Option<bool>,
    pub endurance_stable: Option<bool>,
}

/// Top-level aggregate handed to the persistence/rendering collaborator.
/// Built once from sealed runs; never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub run_id: Uuid,
    pub environment: String,
    pub generated_at: DateTime<Utc>,
    pub total_duration_ms: u64,
    pub summary: MergedSummary,
    pub percentiles: PercentileBreakdown,
    pub grade: Grade,
    pub readiness: ReadinessVerdict,
    pub recommendations: Vec<Recommendation>,
    pub compliance: ComplianceFlags,
    pub scenarios: Vec<ScenarioRun>,
    /// Human-readable notes for scenarios that were skipped or failed and
    /// are therefore absent from `scenarios`.
    pub warnings: Vec<String>,
}
