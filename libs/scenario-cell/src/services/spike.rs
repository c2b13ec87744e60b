use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use loadgen_cell::LoadGenerator;
use shared_config::SpikeSpec;
use shared_models::{
    HarnessError, ScenarioOutcome, ScenarioRecorder, SpikeAnalysis, Target,
};

/// Post-spike error rate above this fails the test.
const MAX_RECOVERY_ERROR_RATE: f64 = 5.0;
/// Spike-phase latency degradation beyond this multiple of baseline fails
/// the test.
const MAX_DEGRADATION_RATIO: f64 = 3.0;

/// Baseline → spike → recovery measurement, in strict sequence.
pub struct SpikeRunner {
    generator: Arc<LoadGenerator>,
    environment: String,
    recovery_pause: Duration,
}

impl SpikeRunner {
    pub fn new(generator: Arc<LoadGenerator>, environment: &str, recovery_pause: Duration) -> Self {
        Self {
            generator,
            environment: environment.to_string(),
            recovery_pause,
        }
    }

    #[instrument(skip(self, spec))]
    pub async fn run(&self, spec: &SpikeSpec) -> ScenarioOutcome {
        let scenario = "spikeTest".to_string();
        if spec.base_users == 0 || spec.spike_users == 0 {
            return ScenarioOutcome::Failed {
                scenario,
                error: HarnessError::InvalidScenario(
                    "spike test requires non-zero base and spike users".to_string(),
                ),
            };
        }

        let target = Target::Endpoint {
            name: spec.endpoint.name.clone(),
            url: spec.endpoint.path.clone(),
            method: spec.endpoint.method.clone(),
        };
        let mut recorder = ScenarioRecorder::begin(&scenario, &self.environment);

        info!(users = spec.base_users, "Spike phase 1: baseline");
        let baseline = self
            .generator
            .run(&target, spec.base_users, spec.requests_per_actor, spec.delay_ms)
            .await;

        info!(users = spec.spike_users, "Spike phase 2: spike");
        let spike = self
            .generator
            .run(&target, spec.spike_users, spec.requests_per_actor, spec.delay_ms)
            .await;

        if !self.recovery_pause.is_zero() {
            info!(
                pause_secs = self.recovery_pause.as_secs(),
                "Spike phase 3: recovery pause"
            );
            tokio::time::sleep(self.recovery_pause).await;
        }

        info!(users = spec.base_users, "Spike phase 4: post-spike measurement");
        let recovery = self
            .generator
            .run(&target, spec.base_users, spec.requests_per_actor, spec.delay_ms)
            .await;

        let baseline_avg_ms = baseline.stats().avg_latency_ms;
        let spike_avg_ms = spike.stats().avg_latency_ms;
        let recovery_avg_ms = recovery.stats().avg_latency_ms;
        let recovery_error_rate_percent = recovery.stats().error_rate_percent;

        // A ~0 baseline means degradation cannot be measured meaningfully;
        // report the ratio as 0 instead of dividing to infinity.
        let degradation_ratio = if baseline_avg_ms > f64::EPSILON {
            spike_avg_ms / baseline_avg_ms
        } else {
            0.0
        };
        let spike_multiplier = f64::from(spec.spike_users) / f64::from(spec.base_users);
        let passed = recovery_error_rate_percent < MAX_RECOVERY_ERROR_RATE
            && degradation_ratio < MAX_DEGRADATION_RATIO;

        if passed {
            info!(degradation_ratio, "Spike test passed");
        } else {
            warn!(
                degradation_ratio,
                recovery_error_rate_percent, "Spike test failed"
            );
        }

        recorder.push_result(baseline);
        recorder.push_result(spike);
        recorder.push_result(recovery);
        recorder.record_spike(SpikeAnalysis {
            base_users: spec.base_users,
            spike_users: spec.spike_users,
            spike_multiplier,
            degradation_ratio,
            baseline_avg_ms,
            spike_avg_ms,
            recovery_avg_ms,
            recovery_error_rate_percent,
            passed,
        });

        ScenarioOutcome::Completed(recorder.seal())
    }
}
