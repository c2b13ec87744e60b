// =====================================================================================
// SCENARIO ORCHESTRATOR INTEGRATION TESTS
// =====================================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;

use executor_cell::RequestExecutor;
use loadgen_cell::LoadGenerator;
use scenario_cell::ScenarioOrchestrator;
use shared_config::{
    EndpointSpec, EnduranceSpec, HarnessConfig, MonitorSpec, QuerySpec, ScenarioCatalog,
    ScenarioSpec, SpikeSpec,
};
use shared_models::{HarnessError, ScenarioOutcome, StabilityTrend, Target};

fn test_config() -> HarnessConfig {
    HarnessConfig {
        base_url: "http://localhost:3000".to_string(),
        database_url: None,
        environment: "test".to_string(),
        request_timeout_ms: 5_000,
        db_pool_max_connections: 5,
        db_acquire_timeout_ms: 1_000,
        recovery_pause_secs: 0,
        ready_max_avg_latency_ms: 500.0,
        ready_max_error_rate_percent: 1.0,
    }
}

fn spec(name: &str, concurrency: u32, queries: Vec<QuerySpec>) -> ScenarioSpec {
    ScenarioSpec {
        name: name.to_string(),
        concurrency,
        requests_per_actor: 2,
        delay_ms: 0,
        endpoints: vec![EndpointSpec::get("health", "/api/health")],
        queries,
    }
}

fn test_catalog() -> ScenarioCatalog {
    ScenarioCatalog {
        scenarios: vec![
            spec("first", 2, Vec::new()),
            spec("broken", 0, Vec::new()),
            spec("third", 2, Vec::new()),
        ],
        spike: SpikeSpec {
            base_users: 2,
            spike_users: 4,
            requests_per_actor: 1,
            delay_ms: 0,
            endpoint: EndpointSpec::get("health", "/api/health"),
        },
        endurance: EnduranceSpec {
            concurrency: 2,
            delay_ms: 0,
            duration_secs: 0,
            endpoint: EndpointSpec::get("health", "/api/health"),
        },
        monitor: MonitorSpec {
            probe_concurrency: 5,
            probe_requests: 2,
            interval_secs: 1,
            duration_secs: 1,
            endpoint: EndpointSpec::get("health", "/api/health"),
        },
    }
}

/// Always succeeds at a fixed simulated latency.
struct FixedLatencyExecutor {
    latency_ms: f64,
}

#[async_trait]
impl RequestExecutor for FixedLatencyExecutor {
    async fn execute(&self, target: &Target) -> shared_models::RequestOutcome {
        let code = if target.is_query() { "OK" } else { "200" };
        shared_models::RequestOutcome::succeeded(self.latency_ms, code, Some(1))
    }
}

/// Latency depends on how many calls are currently in flight, modeling a
/// backend that saturates under the spike phase.
struct LoadSensitiveExecutor {
    in_flight: AtomicU64,
    saturation_point: u64,
    fast_ms: f64,
    slow_ms: f64,
}

#[async_trait]
impl RequestExecutor for LoadSensitiveExecutor {
    async fn execute(&self, _target: &Target) -> shared_models::RequestOutcome {
        let concurrent = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let latency_ms = if concurrent > self.saturation_point {
            self.slow_ms
        } else {
            self.fast_ms
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        shared_models::RequestOutcome::succeeded(latency_ms, "200", None)
    }
}

/// Latency grows with every call, producing a degrading trend.
struct RampingExecutor {
    calls: AtomicU64,
}

#[async_trait]
impl RequestExecutor for RampingExecutor {
    async fn execute(&self, _target: &Target) -> shared_models::RequestOutcome {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        shared_models::RequestOutcome::succeeded(call as f64 * 10.0, "200", None)
    }
}

fn orchestrator_with(
    executor: Arc<dyn RequestExecutor>,
    database_available: bool,
) -> ScenarioOrchestrator {
    let generator = Arc::new(LoadGenerator::new(executor));
    ScenarioOrchestrator::new(generator, test_catalog(), &test_config(), database_available)
}

#[tokio::test]
async fn unknown_scenario_name_is_a_fatal_config_error() {
    let orchestrator = orchestrator_with(Arc::new(FixedLatencyExecutor { latency_ms: 5.0 }), false);
    let result = orchestrator.run_named("doesNotExist").await;
    assert_matches!(result, Err(HarnessError::UnknownScenario(_)));
}

#[tokio::test]
async fn fixed_scenario_collects_one_result_per_endpoint() {
    let orchestrator = orchestrator_with(Arc::new(FixedLatencyExecutor { latency_ms: 5.0 }), false);
    let outcome = orchestrator.run_named("first").await.unwrap();

    let run = match outcome {
        ScenarioOutcome::Completed(run) => run,
        other => panic!("expected completed run, got {:?}", other),
    };
    assert_eq!(run.scenario, "first");
    assert_eq!(run.results.len(), 1);
    assert_eq!(run.results[0].stats().total_requests, 4); // 2 actors x 2 requests
    assert!(run.finished_at >= run.started_at);
}

#[tokio::test]
async fn query_subtests_are_skipped_without_a_database() {
    let catalog_spec = spec(
        "withQueries",
        2,
        vec![QuerySpec::new("db_ping", "SELECT 1")],
    );
    let orchestrator = orchestrator_with(Arc::new(FixedLatencyExecutor { latency_ms: 5.0 }), false);

    let outcome = orchestrator.run_fixed(&catalog_spec).await;
    let run = match outcome {
        ScenarioOutcome::Completed(run) => run,
        other => panic!("expected completed run, got {:?}", other),
    };
    // Endpoint batch is present, query batch was skipped with a warning.
    assert_eq!(run.results.len(), 1);
    assert!(!run.results[0].is_db());
}

#[tokio::test]
async fn query_only_scenario_without_database_is_skipped_not_failed() {
    let mut query_only = spec("dbOnly", 2, vec![QuerySpec::new("db_ping", "SELECT 1")]);
    query_only.endpoints.clear();
    let orchestrator = orchestrator_with(Arc::new(FixedLatencyExecutor { latency_ms: 5.0 }), false);

    let outcome = orchestrator.run_fixed(&query_only).await;
    assert_matches!(
        outcome,
        ScenarioOutcome::Skipped { scenario, reason }
            if scenario == "dbOnly" && reason.contains("database")
    );
}

#[tokio::test]
async fn query_subtests_run_when_database_is_available() {
    let catalog_spec = spec(
        "withQueries",
        2,
        vec![QuerySpec::new("db_ping", "SELECT 1")],
    );
    let orchestrator = orchestrator_with(Arc::new(FixedLatencyExecutor { latency_ms: 5.0 }), true);

    let outcome = orchestrator.run_fixed(&catalog_spec).await;
    let run = match outcome {
        ScenarioOutcome::Completed(run) => run,
        other => panic!("expected completed run, got {:?}", other),
    };
    assert_eq!(run.results.len(), 2);
    assert!(run.results[1].is_db());
}

#[tokio::test]
async fn suite_continues_past_a_failing_scenario() {
    let orchestrator = orchestrator_with(Arc::new(FixedLatencyExecutor { latency_ms: 5.0 }), false);
    let outcomes = orchestrator.run_suite().await;

    // Three catalog scenarios plus spike and shortened endurance.
    assert_eq!(outcomes.len(), 5);
    assert!(outcomes[0].is_completed());
    assert_matches!(
        &outcomes[1],
        ScenarioOutcome::Failed { scenario, error: HarnessError::InvalidScenario(_) }
            if scenario == "broken"
    );
    assert!(outcomes[2].is_completed());
    assert!(outcomes[3].is_completed()); // spike
    assert!(outcomes[4].is_completed()); // endurance
}

#[tokio::test]
async fn spike_multiplier_is_exact() {
    let orchestrator = orchestrator_with(Arc::new(FixedLatencyExecutor { latency_ms: 20.0 }), false);
    let outcome = orchestrator.run_spike().await;

    let run = match outcome {
        ScenarioOutcome::Completed(run) => run,
        other => panic!("expected completed run, got {:?}", other),
    };
    let spike = run.spike.expect("spike analysis recorded");
    assert_eq!(spike.spike_multiplier, 4.0 / 2.0);
    assert_eq!(run.results.len(), 3); // baseline, spike, recovery
}

#[tokio::test]
async fn steady_latency_across_the_spike_passes() {
    let orchestrator = orchestrator_with(Arc::new(FixedLatencyExecutor { latency_ms: 20.0 }), false);
    let outcome = orchestrator.run_spike().await;

    let run = match outcome {
        ScenarioOutcome::Completed(run) => run,
        other => panic!("expected completed run, got {:?}", other),
    };
    let spike = run.spike.unwrap();
    assert!((spike.degradation_ratio - 1.0).abs() < 1e-9);
    assert!(spike.passed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn fourfold_degradation_under_spike_fails() {
    let executor = Arc::new(LoadSensitiveExecutor {
        in_flight: AtomicU64::new(0),
        saturation_point: 50,
        fast_ms: 50.0,
        slow_ms: 200.0,
    });
    let generator = Arc::new(LoadGenerator::new(executor));
    let catalog = ScenarioCatalog {
        spike: SpikeSpec {
            base_users: 10,
            spike_users: 200,
            requests_per_actor: 3,
            delay_ms: 0,
            endpoint: EndpointSpec::get("health", "/api/health"),
        },
        ..test_catalog()
    };
    let orchestrator = ScenarioOrchestrator::new(generator, catalog, &test_config(), false);

    let outcome = orchestrator.run_spike().await;
    let run = match outcome {
        ScenarioOutcome::Completed(run) => run,
        other => panic!("expected completed run, got {:?}", other),
    };
    let spike = run.spike.unwrap();
    assert_eq!(spike.spike_multiplier, 20.0);
    // Baseline stays fast, the spike phase saturates to ~4x baseline.
    assert!(spike.degradation_ratio > 3.0);
    assert!(!spike.passed);
}

#[tokio::test]
async fn endurance_run_records_a_stability_verdict() {
    let orchestrator = orchestrator_with(Arc::new(FixedLatencyExecutor { latency_ms: 100.0 }), false);
    let outcome = orchestrator.run_endurance(Duration::from_secs(1)).await;

    let run = match outcome {
        ScenarioOutcome::Completed(run) => run,
        other => panic!("expected completed run, got {:?}", other),
    };
    assert_eq!(run.scenario, "enduranceTest");
    let stability = run.stability.expect("stability analysis recorded");
    assert_eq!(stability.score, 100);
    assert!(stability.stable);
}

#[tokio::test]
async fn monitoring_probe_is_five_by_two() {
    let orchestrator = orchestrator_with(Arc::new(FixedLatencyExecutor { latency_ms: 5.0 }), false);
    let outcome = orchestrator
        .run_monitoring(Duration::from_millis(0), Duration::from_millis(10))
        .await;

    let run = match outcome {
        ScenarioOutcome::Completed(run) => run,
        other => panic!("expected completed run, got {:?}", other),
    };
    assert_eq!(run.results.len(), 1);
    assert_eq!(run.results[0].stats().total_requests, 10);
    assert_eq!(run.trend, Some(StabilityTrend::Stable));
}

#[tokio::test]
async fn rising_probe_latency_is_classified_as_degrading() {
    let orchestrator = orchestrator_with(
        Arc::new(RampingExecutor {
            calls: AtomicU64::new(0),
        }),
        false,
    );
    let outcome = orchestrator
        .run_monitoring(Duration::from_millis(100), Duration::from_millis(5))
        .await;

    let run = match outcome {
        ScenarioOutcome::Completed(run) => run,
        other => panic!("expected completed run, got {:?}", other),
    };
    assert!(run.results.len() >= 4);
    assert_eq!(run.trend, Some(StabilityTrend::Degrading));
}
