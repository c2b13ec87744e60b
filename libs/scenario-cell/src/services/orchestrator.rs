use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use loadgen_cell::LoadGenerator;
use shared_config::{HarnessConfig, ScenarioCatalog, ScenarioSpec};
use shared_models::{HarnessError, ScenarioOutcome, ScenarioRecorder, Target};

use crate::services::endurance::EnduranceRunner;
use crate::services::monitor::ContinuousMonitor;
use crate::services::spike::SpikeRunner;

/// Sequences Load Generator invocations into higher-level test patterns.
///
/// The orchestrator is the only component aware of scenario semantics.
/// Every phase and scenario transition is a hard synchronization point: a
/// new phase starts only after the previous one's batches have fully
/// returned.
pub struct ScenarioOrchestrator {
    generator: Arc<LoadGenerator>,
    catalog: ScenarioCatalog,
    environment: String,
    recovery_pause: Duration,
    database_available: bool,
    spike_runner: SpikeRunner,
    endurance_runner: EnduranceRunner,
    monitor: ContinuousMonitor,
}

impl ScenarioOrchestrator {
    pub fn new(
        generator: Arc<LoadGenerator>,
        catalog: ScenarioCatalog,
        config: &HarnessConfig,
        database_available: bool,
    ) -> Self {
        let recovery_pause = Duration::from_secs(config.recovery_pause_secs);
        Self {
            spike_runner: SpikeRunner::new(
                Arc::clone(&generator),
                &config.environment,
                recovery_pause,
            ),
            endurance_runner: EnduranceRunner::new(Arc::clone(&generator), &config.environment),
            monitor: ContinuousMonitor::new(Arc::clone(&generator), &config.environment),
            generator,
            catalog,
            environment: config.environment.clone(),
            recovery_pause,
            database_available,
        }
    }

    pub fn catalog(&self) -> &ScenarioCatalog {
        &self.catalog
    }

    /// Runs one catalog scenario by name. An unknown name is a fatal
    /// configuration error, not a scenario-level failure.
    pub async fn run_named(&self, name: &str) -> Result<ScenarioOutcome, HarnessError> {
        let spec = self
            .catalog
            .named(name)
            .ok_or_else(|| HarnessError::UnknownScenario(name.to_string()))?
            .clone();
        Ok(self.run_fixed(&spec).await)
    }

    /// Runs one fixed scenario: every endpoint once through the Load
    /// Generator, then the declared queries when the database is available.
    /// An unavailable database downgrades the query sub-tests to a warning,
    /// never a failure.
    #[instrument(skip(self, spec), fields(scenario = %spec.name))]
    pub async fn run_fixed(&self, spec: &ScenarioSpec) -> ScenarioOutcome {
        if let Err(error) = validate_spec(spec) {
            return ScenarioOutcome::Failed {
                scenario: spec.name.clone(),
                error,
            };
        }

        // A scenario made up entirely of query sub-tests has nothing to run
        // without the pool: skipped, not failed.
        if spec.endpoints.is_empty() && !self.database_available {
            warn!(scenario = %spec.name, "Database unavailable - scenario skipped");
            return ScenarioOutcome::Skipped {
                scenario: spec.name.clone(),
                reason: "database unavailable".to_string(),
            };
        }

        info!(
            concurrency = spec.concurrency,
            requests_per_actor = spec.requests_per_actor,
            "Starting scenario"
        );
        let mut recorder = ScenarioRecorder::begin(&spec.name, &self.environment);

        for endpoint in &spec.endpoints {
            let target = Target::Endpoint {
                name: endpoint.name.clone(),
                url: endpoint.path.clone(),
                method: endpoint.method.clone(),
            };
            let result = self
                .generator
                .run(
                    &target,
                    spec.concurrency,
                    spec.requests_per_actor,
                    spec.delay_ms,
                )
                .await;
            recorder.push_result(result);
        }

        if !spec.queries.is_empty() {
            if self.database_available {
                for query in &spec.queries {
                    let target = Target::query(&query.name, &query.sql);
                    let result = self
                        .generator
                        .run(
                            &target,
                            spec.concurrency,
                            spec.requests_per_actor,
                            spec.delay_ms,
                        )
                        .await;
                    recorder.push_result(result);
                }
            } else {
                warn!(
                    scenario = %spec.name,
                    "Database unavailable - skipping {} query sub-tests",
                    spec.queries.len()
                );
            }
        }

        let run = recorder.seal();
        info!(
            total_requests = run.total_requests(),
            "Scenario complete"
        );
        ScenarioOutcome::Completed(run)
    }

    /// Comprehensive suite: the full catalog lightest to heaviest with a
    /// recovery pause between scenarios, then a spike test and a shortened
    /// endurance test. Failures never abort the remaining scenarios; spike
    /// and endurance failures are downgraded to warnings.
    #[instrument(skip(self))]
    pub async fn run_suite(&self) -> Vec<ScenarioOutcome> {
        info!(
            scenarios = self.catalog.scenarios.len(),
            "Starting comprehensive suite"
        );
        let mut outcomes = Vec::new();

        for (index, spec) in self.catalog.scenarios.iter().enumerate() {
            let outcome = self.run_fixed(spec).await;
            if let ScenarioOutcome::Failed { scenario, error } = &outcome {
                warn!(%scenario, %error, "Scenario failed - continuing with remaining scenarios");
            }
            outcomes.push(outcome);

            if index + 1 < self.catalog.scenarios.len() {
                self.recovery_sleep().await;
            }
        }

        self.recovery_sleep().await;
        let spike = self.run_spike().await;
        if !spike.is_completed() {
            warn!("Spike test did not complete - recorded as warning");
        }
        outcomes.push(spike);

        self.recovery_sleep().await;
        let shortened = Duration::from_secs(self.catalog.endurance.duration_secs / 5);
        let endurance = self.run_endurance(shortened).await;
        if !endurance.is_completed() {
            warn!("Endurance test did not complete - recorded as warning");
        }
        outcomes.push(endurance);

        info!(
            completed = outcomes.iter().filter(|o| o.is_completed()).count(),
            total = outcomes.len(),
            "Comprehensive suite finished"
        );
        outcomes
    }

    pub async fn run_spike(&self) -> ScenarioOutcome {
        self.spike_runner.run(&self.catalog.spike).await
    }

    pub async fn run_endurance(&self, duration: Duration) -> ScenarioOutcome {
        self.endurance_runner
            .run(&self.catalog.endurance, duration)
            .await
    }

    pub async fn run_monitoring(&self, total: Duration, interval: Duration) -> ScenarioOutcome {
        self.monitor.run(&self.catalog.monitor, total, interval).await
    }

    async fn recovery_sleep(&self) {
        if !self.recovery_pause.is_zero() {
            debug!(
                pause_secs = self.recovery_pause.as_secs(),
                "Recovery pause between scenarios"
            );
            tokio::time::sleep(self.recovery_pause).await;
        }
    }
}

fn validate_spec(spec: &ScenarioSpec) -> Result<(), HarnessError> {
    if spec.concurrency == 0 {
        return Err(HarnessError::InvalidScenario(format!(
            "{}: concurrency must be greater than zero",
            spec.name
        )));
    }
    if spec.requests_per_actor == 0 {
        return Err(HarnessError::InvalidScenario(format!(
            "{}: requests per actor must be at least one",
            spec.name
        )));
    }
    if spec.endpoints.is_empty() && spec.queries.is_empty() {
        return Err(HarnessError::InvalidScenario(format!(
            "{}: scenario declares no targets",
            spec.name
        )));
    }
    Ok(())
}
