use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use loadgen_cell::LoadGenerator;
use shared_config::EnduranceSpec;
use shared_models::{
    BatchStats, HarnessError, ScenarioOutcome, ScenarioRecorder, StabilityAnalysis, Target,
};

/// Assumed round-trip cost when sizing the run; the think delay plus this
/// approximates one actor iteration.
const NOMINAL_ROUND_TRIP_MS: u64 = 50;

/// One sustained Load Generator invocation sized to the caller's duration,
/// followed by a stability scoring pass.
pub struct EnduranceRunner {
    generator: Arc<LoadGenerator>,
    environment: String,
}

impl EnduranceRunner {
    pub fn new(generator: Arc<LoadGenerator>, environment: &str) -> Self {
        Self {
            generator,
            environment: environment.to_string(),
        }
    }

    #[instrument(skip(self, spec), fields(duration_secs = duration.as_secs()))]
    pub async fn run(&self, spec: &EnduranceSpec, duration: Duration) -> ScenarioOutcome {
        let scenario = "enduranceTest".to_string();
        if spec.concurrency == 0 {
            return ScenarioOutcome::Failed {
                scenario,
                error: HarnessError::InvalidScenario(
                    "endurance test requires non-zero concurrency".to_string(),
                ),
            };
        }

        let duration_ms = duration.as_millis() as u64;
        let per_iteration_ms = (spec.delay_ms + NOMINAL_ROUND_TRIP_MS).max(1);
        let requests_per_actor = (duration_ms / per_iteration_ms).max(1) as u32;

        info!(
            concurrency = spec.concurrency,
            requests_per_actor, "Starting endurance run"
        );

        let target = Target::Endpoint {
            name: spec.endpoint.name.clone(),
            url: spec.endpoint.path.clone(),
            method: spec.endpoint.method.clone(),
        };
        let mut recorder = ScenarioRecorder::begin(&scenario, &self.environment);

        let result = self
            .generator
            .run(&target, spec.concurrency, requests_per_actor, spec.delay_ms)
            .await;

        let stability = stability_analysis(result.stats());
        if stability.stable {
            info!(score = stability.score, "System stable under sustained load");
        } else {
            warn!(score = stability.score, "System unstable under sustained load");
        }

        recorder.push_result(result);
        recorder.record_stability(stability);
        ScenarioOutcome::Completed(recorder.seal())
    }
}

/// 0-100 health score for a sustained run. Starts at 100; every exceeded
/// threshold deducts, floored at 0. The system is judged stable above 80.
pub fn stability_analysis(stats: &BatchStats) -> StabilityAnalysis {
    let error_rate = stats.error_rate_percent;
    let avg_latency = stats.avg_latency_ms;
    let spread = stats.max_latency_ms - stats.min_latency_ms;

    let mut score: i64 = 100;

    if error_rate > 1.0 {
        score -= 20;
    }
    if error_rate > 0.1 {
        score -= 10;
    }

    if avg_latency > 1_000.0 {
        score -= 30;
    }
    if avg_latency > 500.0 {
        score -= 15;
    }
    if avg_latency > 200.0 {
        score -= 5;
    }

    if spread > 3_000.0 {
        score -= 20;
    }
    if spread > 1_000.0 {
        score -= 10;
    }

    let score = score.max(0) as u32;
    StabilityAnalysis {
        score,
        stable: score > 80,
        error_rate_percent: error_rate,
        avg_latency_ms: avg_latency,
        latency_spread_ms: spread,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn stats(error_rate_percent: f64, avg: f64, min: f64, max: f64) -> BatchStats {
        BatchStats {
            target: "assets".to_string(),
            concurrency: 10,
            requests_per_actor: 10,
            total_requests: 100,
            successful_requests: 100,
            failed_requests: 0,
            avg_latency_ms: avg,
            min_latency_ms: min,
            max_latency_ms: max,
            requests_per_second: 50.0,
            error_rate_percent,
            code_distribution: HashMap::new(),
            latencies_ms: Vec::new(),
        }
    }

    #[test]
    fn clean_run_scores_a_perfect_hundred() {
        let analysis = stability_analysis(&stats(0.0, 100.0, 80.0, 130.0));
        assert_eq!(analysis.score, 100);
        assert!(analysis.stable);
    }

    #[test]
    fn errors_and_slow_latency_push_the_score_down() {
        // 2% errors at 1500ms average: -20 -10 -30 -15 -5 leaves 20.
        let analysis = stability_analysis(&stats(2.0, 1_500.0, 1_400.0, 1_600.0));
        assert!(analysis.score <= 30);
        assert!(!analysis.stable);
    }

    #[test]
    fn wide_latency_spread_alone_breaks_stability() {
        let analysis = stability_analysis(&stats(0.0, 150.0, 10.0, 3_500.0));
        // -20 and -10 for the spread thresholds.
        assert_eq!(analysis.score, 70);
        assert!(!analysis.stable);
    }

    #[test]
    fn score_is_floored_at_zero() {
        let analysis = stability_analysis(&stats(50.0, 5_000.0, 10.0, 9_000.0));
        assert_eq!(analysis.score, 0);
    }

    #[test]
    fn boundary_values_do_not_deduct() {
        // Exactly at the thresholds, not beyond them.
        let analysis = stability_analysis(&stats(0.1, 200.0, 100.0, 1_100.0));
        assert_eq!(analysis.score, 100);
    }
}
