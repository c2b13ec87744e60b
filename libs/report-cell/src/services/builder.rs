use std::time::Duration;

use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use metrics_cell::{merge_summaries, percentile_breakdown};
use shared_config::HarnessConfig;
use shared_models::{
    BatchResult, BatchStats, ComplianceFlags, Grade, MergedSummary, ReadinessCriterion,
    ReadinessVerdict, Recommendation, RecommendationPriority, Report, ScenarioOutcome,
    ScenarioRun,
};

const SLOW_RESULT_THRESHOLD_MS: f64 = 1_000.0;
const ERROR_RATE_THRESHOLD_PERCENT: f64 = 1.0;
const SLOW_QUERY_THRESHOLD_MS: f64 = 500.0;

/// Turns sealed scenario runs into the final structured report.
///
/// The report object is the harness's output boundary: persistence and
/// rendering are external collaborators consuming it.
pub struct ReportBuilder {
    environment: String,
    ready_max_avg_latency_ms: f64,
    ready_max_error_rate_percent: f64,
}

impl ReportBuilder {
    pub fn new(config: &HarnessConfig) -> Self {
        Self {
            environment: config.environment.clone(),
            ready_max_avg_latency_ms: config.ready_max_avg_latency_ms,
            ready_max_error_rate_percent: config.ready_max_error_rate_percent,
        }
    }

    /// Splits outcomes into sealed runs and warnings: skipped and failed
    /// scenarios are surfaced in the warning list and omitted from the
    /// report's scenario list.
    pub fn from_outcomes(&self, outcomes: Vec<ScenarioOutcome>, total_duration: Duration) -> Report {
        let mut runs = Vec::new();
        let mut warnings = Vec::new();

        for outcome in outcomes {
            match outcome {
                ScenarioOutcome::Completed(run) => runs.push(run),
                ScenarioOutcome::Skipped { scenario, reason } => {
                    warn!(%scenario, %reason, "Scenario skipped");
                    warnings.push(format!("{} skipped: {}", scenario, reason));
                }
                ScenarioOutcome::Failed { scenario, error } => {
                    warn!(%scenario, %error, "Scenario failed - omitted from report");
                    warnings.push(format!("{} failed: {}", scenario, error));
                }
            }
        }

        self.build(runs, warnings, total_duration)
    }

    #[instrument(skip(self, scenarios, warnings))]
    pub fn build(
        &self,
        scenarios: Vec<ScenarioRun>,
        warnings: Vec<String>,
        total_duration: Duration,
    ) -> Report {
        let all_stats: Vec<&BatchStats> = scenarios
            .iter()
            .flat_map(|run| run.results.iter())
            .map(BatchResult::stats)
            .collect();
        let summary = merge_summaries(&all_stats);

        let pooled_latencies: Vec<f64> = all_stats
            .iter()
            .flat_map(|stats| stats.latencies_ms.iter().copied())
            .collect();
        let percentiles = percentile_breakdown(&pooled_latencies);

        let grade = compute_grade(&summary);
        let readiness = self.readiness(&summary);
        let recommendations = scan_recommendations(&scenarios);

        let compliance = ComplianceFlags {
            meets_latency_slo: summary.avg_latency_ms < self.ready_max_avg_latency_ms,
            meets_error_rate_slo: summary.avg_error_rate_percent
                < self.ready_max_error_rate_percent,
            spike_resilient: scenarios
                .iter()
                .find_map(|run| run.spike.as_ref().map(|s| s.passed)),
            endurance_stable: scenarios
                .iter()
                .find_map(|run| run.stability.as_ref().map(|s| s.stable)),
        };

        info!(
            grade = %grade.letter,
            score = grade.score,
            production_ready = readiness.production_ready,
            "Report assembled"
        );

        Report {
            run_id: Uuid::new_v4(),
            environment: self.environment.clone(),
            generated_at: Utc::now(),
            total_duration_ms: total_duration.as_millis() as u64,
            summary,
            percentiles,
            grade,
            readiness,
            recommendations,
            compliance,
            scenarios,
            warnings,
        }
    }

    fn readiness(&self, summary: &MergedSummary) -> ReadinessVerdict {
        let latency_ok = summary.avg_latency_ms < self.ready_max_avg_latency_ms;
        let errors_ok = summary.avg_error_rate_percent < self.ready_max_error_rate_percent;
        let production_ready = latency_ok && errors_ok;

        let recommendation = if production_ready {
            "System meets production readiness thresholds; safe to proceed with rollout."
                .to_string()
        } else if !latency_ok && !errors_ok {
            "Address elevated latency and error rate before exposing production traffic."
                .to_string()
        } else if !latency_ok {
            "Average latency exceeds the readiness threshold; add caching or scale the slowest dependencies before rollout.".to_string()
        } else {
            "Error rate exceeds the readiness threshold; investigate failing responses before rollout.".to_string()
        };

        ReadinessVerdict {
            production_ready,
            criteria: vec![
                ReadinessCriterion {
                    name: "avg_latency_ms".to_string(),
                    threshold: self.ready_max_avg_latency_ms,
                    actual: summary.avg_latency_ms,
                    passed: latency_ok,
                },
                ReadinessCriterion {
                    name: "error_rate_percent".to_string(),
                    threshold: self.ready_max_error_rate_percent,
                    actual: summary.avg_error_rate_percent,
                    passed: errors_ok,
                },
            ],
            recommendation,
        }
    }
}

/// 100-point score with cumulative deductions on the merged summary,
/// banded into a letter grade.
fn compute_grade(summary: &MergedSummary) -> Grade {
    let mut score: i64 = 100;

    let avg = summary.avg_latency_ms;
    if avg > 2_000.0 {
        score -= 30;
    }
    if avg > 1_000.0 {
        score -= 20;
    }
    if avg > 500.0 {
        score -= 10;
    }

    let error_rate = summary.avg_error_rate_percent;
    if error_rate > 5.0 {
        score -= 25;
    }
    if error_rate > 1.0 {
        score -= 15;
    }
    if error_rate > 0.1 {
        score -= 5;
    }

    let score = score.max(0) as u32;
    let letter = match score {
        90..=100 => 'A',
        80..=89 => 'B',
        70..=79 => 'C',
        60..=69 => 'D',
        _ => 'F',
    };

    Grade { letter, score }
}

/// One structured recommendation per threshold breach. Every breaching
/// result gets its own entry; nothing is deduplicated across results.
fn scan_recommendations(scenarios: &[ScenarioRun]) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    for run in scenarios {
        for result in &run.results {
            let stats = result.stats();

            if stats.avg_latency_ms > SLOW_RESULT_THRESHOLD_MS {
                recommendations.push(Recommendation {
                    category: "latency".to_string(),
                    priority: RecommendationPriority::High,
                    message: format!(
                        "{} averaged {:.0}ms during {}",
                        stats.target, stats.avg_latency_ms, run.scenario
                    ),
                    action: "Profile the endpoint and add caching or horizontal capacity."
                        .to_string(),
                });
            }

            if stats.error_rate_percent > ERROR_RATE_THRESHOLD_PERCENT {
                let priority = if stats.error_rate_percent > 5.0 {
                    RecommendationPriority::Critical
                } else {
                    RecommendationPriority::High
                };
                recommendations.push(Recommendation {
                    category: "errors".to_string(),
                    priority,
                    message: format!(
                        "{} failed {:.1}% of requests during {}",
                        stats.target, stats.error_rate_percent, run.scenario
                    ),
                    action: "Inspect failing responses and upstream dependency logs."
                        .to_string(),
                });
            }

            if result.is_db() && stats.avg_latency_ms > SLOW_QUERY_THRESHOLD_MS {
                recommendations.push(Recommendation {
                    category: "database".to_string(),
                    priority: RecommendationPriority::Medium,
                    message: format!(
                        "query {} averaged {:.0}ms during {}",
                        stats.target, stats.avg_latency_ms, run.scenario
                    ),
                    action: "Review the query plan and index coverage.".to_string(),
                });
            }
        }
    }

    recommendations
}
