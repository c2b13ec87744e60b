use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument};

use loadgen_cell::LoadGenerator;
use shared_config::MonitorSpec;
use shared_models::{ScenarioOutcome, ScenarioRecorder, StabilityTrend, Target};

/// Relative latency change below this is considered noise.
const TREND_THRESHOLD: f64 = 0.10;

/// Periodic small probes over a long window, classified into an overall
/// latency trend at the end.
pub struct ContinuousMonitor {
    generator: Arc<LoadGenerator>,
    environment: String,
}

impl ContinuousMonitor {
    pub fn new(generator: Arc<LoadGenerator>, environment: &str) -> Self {
        Self {
            generator,
            environment: environment.to_string(),
        }
    }

    /// Clock-driven sampling loop: one probe per iteration, an explicit
    /// deadline check after each, sleeping the sampling interval (clamped
    /// to the remaining window) in between.
    #[instrument(skip(self, spec), fields(duration_secs = total.as_secs()))]
    pub async fn run(
        &self,
        spec: &MonitorSpec,
        total: Duration,
        interval: Duration,
    ) -> ScenarioOutcome {
        let target = Target::Endpoint {
            name: spec.endpoint.name.clone(),
            url: spec.endpoint.path.clone(),
            method: spec.endpoint.method.clone(),
        };
        let mut recorder = ScenarioRecorder::begin("continuousMonitoring", &self.environment);
        let deadline = Instant::now() + total;
        let mut sample_averages = Vec::new();

        loop {
            let sample = self
                .generator
                .run(&target, spec.probe_concurrency, spec.probe_requests, 0)
                .await;
            sample_averages.push(sample.stats().avg_latency_ms);
            debug!(
                sample = sample_averages.len(),
                avg_latency_ms = sample.stats().avg_latency_ms,
                "Probe sample collected"
            );
            recorder.push_result(sample);

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            tokio::time::sleep(interval.min(deadline - now)).await;
            if Instant::now() >= deadline {
                break;
            }
        }

        let trend = classify_trend(&sample_averages);
        info!(samples = sample_averages.len(), ?trend, "Monitoring window closed");
        recorder.record_trend(trend);
        ScenarioOutcome::Completed(recorder.seal())
    }
}

/// Compares the average latency of the first half of samples against the
/// second half. Fewer than two samples cannot drift.
pub fn classify_trend(sample_averages: &[f64]) -> StabilityTrend {
    if sample_averages.len() < 2 {
        return StabilityTrend::Stable;
    }

    let mid = sample_averages.len() / 2;
    let first = mean(&sample_averages[..mid]);
    let second = mean(&sample_averages[mid..]);

    if first <= f64::EPSILON {
        return StabilityTrend::Stable;
    }

    let change = (second - first) / first;
    if change.abs() < TREND_THRESHOLD {
        StabilityTrend::Stable
    } else if change > 0.0 {
        StabilityTrend::Degrading
    } else {
        StabilityTrend::Improving
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
