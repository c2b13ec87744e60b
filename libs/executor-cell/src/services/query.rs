use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use shared_database::DbPoolManager;
use shared_models::{HarnessError, RequestOutcome};

use crate::services::http::elapsed_ms;

/// Issues single database queries over the bounded pool.
///
/// The connection is checked back in on every exit path, including query
/// failures. Pool exhaustion surfaces as a failed outcome for that one
/// query, never as an aborted batch.
pub struct QueryExecutor {
    pool: Arc<DbPoolManager>,
}

impl QueryExecutor {
    pub fn new(pool: Arc<DbPoolManager>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPoolManager {
        &self.pool
    }

    pub async fn execute_query(&self, sql: &str) -> RequestOutcome {
        let start = Instant::now();

        let mut conn = match self.pool.acquire().await {
            Ok(conn) => conn,
            Err(e) => {
                let code = match e {
                    HarnessError::PoolTimeout { .. } => "POOL_TIMEOUT",
                    _ => "ERROR",
                };
                return RequestOutcome::failed(elapsed_ms(start), code, e.to_string());
            }
        };

        debug!(sql, "Executing query");
        match sqlx::query(sql).fetch_all(&mut *conn).await {
            Ok(rows) => {
                RequestOutcome::succeeded(elapsed_ms(start), "OK", Some(rows.len() as u64))
            }
            Err(e) => RequestOutcome::failed(elapsed_ms(start), "ERROR", e.to_string()),
        }
    }
}
