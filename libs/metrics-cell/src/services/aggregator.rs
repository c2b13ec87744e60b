// =====================================================================================
// METRICS AGGREGATOR - PURE REDUCTIONS OVER OUTCOME BATCHES
// =====================================================================================

use std::collections::HashMap;

use shared_models::{BatchStats, MergedSummary, PercentileBreakdown, RequestOutcome};

/// Min/max/average over one latency set. All zeros for an empty set;
/// callers check `total_requests > 0` before trusting rate fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencySummary {
    pub min_ms: f64,
    pub max_ms: f64,
    pub avg_ms: f64,
}

pub fn summarize_latencies(latencies: &[f64]) -> LatencySummary {
    if latencies.is_empty() {
        return LatencySummary {
            min_ms: 0.0,
            max_ms: 0.0,
            avg_ms: 0.0,
        };
    }

    let mut min = f64::MAX;
    let mut max = f64::MIN;
    let mut sum = 0.0;
    for &latency in latencies {
        min = min.min(latency);
        max = max.max(latency);
        sum += latency;
    }

    LatencySummary {
        min_ms: min,
        max_ms: max,
        avg_ms: sum / latencies.len() as f64,
    }
}

/// Latency value below which `p` percent of observations fall.
///
/// Ascending sort with index `ceil(p/100 * n) - 1`, clamped to `[0, n-1]`.
/// An empty set yields 0 rather than panicking.
pub fn percentile(latencies: &[f64], p: f64) -> f64 {
    if latencies.is_empty() {
        return 0.0;
    }

    let mut sorted = latencies.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let index = ((p / 100.0 * n as f64).ceil() as usize).saturating_sub(1);
    sorted[index.min(n - 1)]
}

pub fn percentile_breakdown(latencies: &[f64]) -> PercentileBreakdown {
    PercentileBreakdown {
        p50_ms: percentile(latencies, 50.0),
        p90_ms: percentile(latencies, 90.0),
        p95_ms: percentile(latencies, 95.0),
        p99_ms: percentile(latencies, 99.0),
    }
}

/// Reduces one batch of outcomes into its summary statistics.
///
/// `elapsed_ms` is the wall time from actor launch to last completion;
/// throughput is reported as 0 when it is ~0 rather than dividing to
/// infinity.
pub fn build_batch_stats(
    target: &str,
    concurrency: u32,
    requests_per_actor: u32,
    outcomes: &[RequestOutcome],
    elapsed_ms: f64,
) -> BatchStats {
    let total_requests = outcomes.len() as u64;
    let successful_requests = outcomes.iter().filter(|o| o.success).count() as u64;
    let failed_requests = total_requests - successful_requests;

    let mut code_distribution: HashMap<String, u64> = HashMap::new();
    for outcome in outcomes {
        *code_distribution.entry(outcome.code.clone()).or_insert(0) += 1;
    }

    let latencies_ms: Vec<f64> = outcomes.iter().map(|o| o.latency_ms).collect();
    let latency = summarize_latencies(&latencies_ms);

    let error_rate_percent = if total_requests > 0 {
        failed_requests as f64 / total_requests as f64 * 100.0
    } else {
        0.0
    };

    let requests_per_second = if elapsed_ms > f64::EPSILON {
        total_requests as f64 / (elapsed_ms / 1_000.0)
    } else {
        0.0
    };

    BatchStats {
        target: target.to_string(),
        concurrency,
        requests_per_actor,
        total_requests,
        successful_requests,
        failed_requests,
        avg_latency_ms: latency.avg_ms,
        min_latency_ms: latency.min_ms,
        max_latency_ms: latency.max_ms,
        requests_per_second,
        error_rate_percent,
        code_distribution,
        latencies_ms,
    }
}

/// Rolls multiple batch summaries into one.
///
/// Counts are summed. Latency, error-rate, and throughput fields are the
/// unweighted arithmetic mean across results, NOT a recomputation from the
/// pooled raw outcomes — a deliberate approximation that can understate
/// error-heavy targets. Flag any change to this merge to report consumers.
pub fn merge_summaries(stats: &[&BatchStats]) -> MergedSummary {
    let result_count = stats.len();
    if result_count == 0 {
        return MergedSummary {
            result_count: 0,
            total_requests: 0,
            successful_requests: 0,
            failed_requests: 0,
            avg_latency_ms: 0.0,
            avg_error_rate_percent: 0.0,
            avg_requests_per_second: 0.0,
        };
    }

    let n = result_count as f64;
    MergedSummary {
        result_count,
        total_requests: stats.iter().map(|s| s.total_requests).sum(),
        successful_requests: stats.iter().map(|s| s.successful_requests).sum(),
        failed_requests: stats.iter().map(|s| s.failed_requests).sum(),
        avg_latency_ms: stats.iter().map(|s| s.avg_latency_ms).sum::<f64>() / n,
        avg_error_rate_percent: stats.iter().map(|s| s.error_rate_percent).sum::<f64>() / n,
        avg_requests_per_second: stats.iter().map(|s| s.requests_per_second).sum::<f64>() / n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(latency_ms: f64, success: bool) -> RequestOutcome {
        if success {
            RequestOutcome::succeeded(latency_ms, "200", None)
        } else {
            RequestOutcome::failed(latency_ms, "500", "HTTP 500")
        }
    }

    #[test]
    fn empty_batch_reduces_to_zeros() {
        let stats = build_batch_stats("empty", 1, 1, &[], 0.0);
        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.error_rate_percent, 0.0);
        assert_eq!(stats.requests_per_second, 0.0);
        assert_eq!(stats.avg_latency_ms, 0.0);
    }

    #[test]
    fn counts_and_error_rate_are_consistent() {
        let outcomes: Vec<_> = (0..10)
            .map(|i| outcome(50.0, i % 4 != 0))
            .collect();
        let stats = build_batch_stats("t", 2, 5, &outcomes, 1_000.0);

        assert_eq!(
            stats.successful_requests + stats.failed_requests,
            stats.total_requests
        );
        assert_eq!(stats.failed_requests, 3);
        assert!((stats.error_rate_percent - 30.0).abs() < f64::EPSILON);
        assert_eq!(stats.code_distribution["200"], 7);
        assert_eq!(stats.code_distribution["500"], 3);
    }

    #[test]
    fn throughput_guards_against_zero_elapsed() {
        let outcomes = vec![outcome(1.0, true)];
        let stats = build_batch_stats("t", 1, 1, &outcomes, 0.0);
        assert_eq!(stats.requests_per_second, 0.0);

        let stats = build_batch_stats("t", 1, 1, &outcomes, 500.0);
        assert!((stats.requests_per_second - 2.0).abs() < 1e-9);
    }

    #[test]
    fn percentile_of_empty_set_is_zero() {
        assert_eq!(percentile(&[], 95.0), 0.0);
    }

    #[test]
    fn percentile_of_single_value_is_that_value() {
        assert_eq!(percentile(&[42.0], 50.0), 42.0);
        assert_eq!(percentile(&[42.0], 99.0), 42.0);
    }

    #[test]
    fn merge_uses_unweighted_means() {
        let a = build_batch_stats("a", 1, 1, &[outcome(100.0, true)], 1_000.0);
        let b = build_batch_stats(
            "b",
            1,
            2,
            &[outcome(300.0, false), outcome(300.0, false)],
            1_000.0,
        );

        let merged = merge_summaries(&[&a, &b]);
        assert_eq!(merged.total_requests, 3);
        assert_eq!(merged.failed_requests, 2);
        // (100 + 300) / 2, not (100 + 300 + 300) / 3.
        assert!((merged.avg_latency_ms - 200.0).abs() < 1e-9);
        // (0% + 100%) / 2.
        assert!((merged.avg_error_rate_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn merge_of_nothing_is_all_zero() {
        let merged = merge_summaries(&[]);
        assert_eq!(merged.result_count, 0);
        assert_eq!(merged.total_requests, 0);
        assert_eq!(merged.avg_latency_ms, 0.0);
    }
}
