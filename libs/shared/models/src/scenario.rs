use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::batch::BatchResult;
use crate::error::HarnessError;

/// Direction of latency drift over a continuous monitoring window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityTrend {
    Stable,
    Degrading,
    Improving,
}

/// Derived measurements from a spike test, recorded whether or not the
/// test passed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpikeAnalysis {
    pub base_users: u32,
    pub spike_users: u32,
    pub spike_multiplier: f64,
    /// Spike-phase average latency over baseline average latency.
    pub degradation_ratio: f64,
    pub baseline_avg_ms: f64,
    pub spike_avg_ms: f64,
    pub recovery_avg_ms: f64,
    pub recovery_error_rate_percent: f64,
    pub passed: bool,
}

/// 0-100 heuristic health score from an endurance run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StabilityAnalysis {
    pub score: u32,
    pub stable: bool,
    pub error_rate_percent: f64,
    pub avg_latency_ms: f64,
    pub latency_spread_ms: f64,
}

/// One named, sealed test execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRun {
    pub scenario: String,
    pub environment: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: Vec<BatchResult>,
    pub spike: Option<SpikeAnalysis>,
    pub stability: Option<StabilityAnalysis>,
    pub trend: Option<StabilityTrend>,
}

impl ScenarioRun {
    pub fn total_requests(&self) -> u64 {
        self.results.iter().map(|r| r.stats().total_requests).sum()
    }
}

/// Accumulator for one in-flight scenario. Scoped to a single run so no
/// state leaks across scenarios; `seal` stamps the end time and hands back
/// the read-only [`ScenarioRun`].
#[derive(Debug)]
pub struct ScenarioRecorder {
    scenario: String,
    environment: String,
    started_at: DateTime<Utc>,
    results: Vec<BatchResult>,
    spike: Option<SpikeAnalysis>,
    stability: Option<StabilityAnalysis>,
    trend: Option<StabilityTrend>,
}

impl ScenarioRecorder {
    pub fn begin(scenario: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            environment: environment.into(),
            started_at: Utc::now(),
            results: Vec::new(),
            spike: None,
            stability: None,
            trend: None,
        }
    }

    pub fn push_result(&mut self, result: BatchResult) {
        self.results.push(result);
    }

    pub fn record_spike(&mut self, spike: SpikeAnalysis) {
        self.spike = Some(spike);
    }

    pub fn record_stability(&mut self, stability: StabilityAnalysis) {
        self.stability = Some(stability);
    }

    pub fn record_trend(&mut self, trend: StabilityTrend) {
        self.trend = Some(trend);
    }

    pub fn results(&self) -> &[BatchResult] {
        &self.results
    }

    pub fn seal(self) -> ScenarioRun {
        ScenarioRun {
            scenario: self.scenario,
            environment: self.environment,
            started_at: self.started_at,
            finished_at: Utc::now(),
            results: self.results,
            spike: self.spike,
            stability: self.stability,
            trend: self.trend,
        }
    }
}

/// Typed result of one scenario execution. The orchestrator matches on the
/// variant; a failed or skipped scenario never aborts the surrounding suite.
#[derive(Debug)]
pub enum ScenarioOutcome {
    Completed(ScenarioRun),
    Skipped {
        scenario: String,
        reason: String,
    },
    Failed {
        scenario: String,
        error: HarnessError,
    },
}

impl ScenarioOutcome {
    pub fn scenario(&self) -> &str {
        match self {
            Self::Completed(run) => &run.scenario,
            Self::Skipped { scenario, .. } | Self::Failed { scenario, .. } => scenario,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}
