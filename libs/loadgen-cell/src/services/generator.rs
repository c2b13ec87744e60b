use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tracing::{debug, info, instrument, warn};

use executor_cell::RequestExecutor;
use metrics_cell::build_batch_stats;
use shared_models::{BatchResult, EndpointResult, QueryResult, RequestOutcome, Target};

/// Fans one target out to `concurrency` virtual users.
///
/// Each actor issues its requests strictly in sequence with think time
/// between calls; across actors there is no ordering. A batch is atomic
/// once launched — there is no mid-batch cancellation, only the executor's
/// per-call timeout.
pub struct LoadGenerator {
    executor: Arc<dyn RequestExecutor>,
}

impl LoadGenerator {
    pub fn new(executor: Arc<dyn RequestExecutor>) -> Self {
        Self { executor }
    }

    #[instrument(skip(self, target), fields(target = target.name()))]
    pub async fn run(
        &self,
        target: &Target,
        concurrency: u32,
        requests_per_actor: u32,
        inter_request_delay_ms: u64,
    ) -> BatchResult {
        info!(
            concurrency,
            requests_per_actor, inter_request_delay_ms, "Launching batch"
        );

        let delay = Duration::from_millis(inter_request_delay_ms);
        let started = Instant::now();

        let mut actors = Vec::with_capacity(concurrency as usize);
        for _ in 0..concurrency {
            let executor = Arc::clone(&self.executor);
            let target = target.clone();

            actors.push(tokio::spawn(async move {
                let mut outcomes = Vec::with_capacity(requests_per_actor as usize);
                for seq in 0..requests_per_actor {
                    outcomes.push(executor.execute(&target).await);
                    // Think time between calls; none after the final call.
                    if seq + 1 < requests_per_actor && !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                outcomes
            }));
        }

        // Synchronization barrier: results are aggregated only once every
        // actor has returned, never mid-run.
        let mut outcomes: Vec<RequestOutcome> =
            Vec::with_capacity((concurrency as usize) * (requests_per_actor as usize));
        for joined in join_all(actors).await {
            match joined {
                Ok(actor_outcomes) => outcomes.extend(actor_outcomes),
                Err(e) => warn!("Actor task aborted: {}", e),
            }
        }

        let elapsed_ms = started.elapsed().as_secs_f64() * 1_000.0;
        let stats = build_batch_stats(
            target.name(),
            concurrency,
            requests_per_actor,
            &outcomes,
            elapsed_ms,
        );
        debug!(
            total = stats.total_requests,
            failed = stats.failed_requests,
            elapsed_ms,
            "Batch complete"
        );

        match target {
            Target::Endpoint { url, method, .. } => BatchResult::Http(EndpointResult {
                url: url.clone(),
                method: method.clone(),
                stats,
            }),
            Target::Query { sql, .. } => BatchResult::Db(QueryResult {
                sql: sql.clone(),
                stats,
            }),
        }
    }
}
