pub mod http;
pub mod query;

pub use http::HttpRequestExecutor;
pub use query::QueryExecutor;

use async_trait::async_trait;

use shared_models::{RequestOutcome, Target};

/// Issues one unit of work against a target.
///
/// Implementations never return an error: every failure mode (transport
/// error, timeout, SQL error, non-2xx status) is captured as a failed
/// [`RequestOutcome`] with the latency measured up to the failure point.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, target: &Target) -> RequestOutcome;
}

/// Dispatches on the target variant: HTTP endpoints go to the web client,
/// queries to the pooled database executor.
pub struct HarnessExecutor {
    http: HttpRequestExecutor,
    query: Option<QueryExecutor>,
}

impl HarnessExecutor {
    pub fn new(http: HttpRequestExecutor, query: Option<QueryExecutor>) -> Self {
        Self { http, query }
    }

    /// Whether query targets can be served. The orchestrator checks this
    /// before launching database sub-tests and skips them when false.
    pub fn has_database(&self) -> bool {
        self.query.is_some()
    }
}

#[async_trait]
impl RequestExecutor for HarnessExecutor {
    async fn execute(&self, target: &Target) -> RequestOutcome {
        match target {
            Target::Endpoint { url, method, .. } => self.http.execute_endpoint(url, method).await,
            Target::Query { sql, .. } => match &self.query {
                Some(query) => query.execute_query(sql).await,
                None => RequestOutcome::failed(0.0, "UNAVAILABLE", "database pool is not configured"),
            },
        }
    }
}
