use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use sqlx::any::{install_default_drivers, AnyPoolOptions};
use sqlx::pool::PoolConnection;
use sqlx::{Any, AnyPool};
use tracing::{debug, info};

use shared_config::HarnessConfig;
use shared_models::HarnessError;

/// Point-in-time pool state for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct PoolDiagnostics {
    pub max_connections: u32,
    pub active: u32,
    pub idle: u32,
    pub queued: u64,
}

/// Owns the bounded database connection pool.
///
/// Connections are returned to the pool on every exit path: `acquire` hands
/// out an RAII guard that checks the connection back in on drop. Acquisition
/// blocks when the pool is exhausted, bounded by the configured timeout.
#[derive(Debug)]
pub struct DbPoolManager {
    pool: AnyPool,
    max_connections: u32,
    acquire_timeout_ms: u64,
    pending_acquires: AtomicU64,
}

impl DbPoolManager {
    /// Connects using the harness configuration. Fails fast with
    /// [`HarnessError::DatabaseUnavailable`] when no URL is configured or the
    /// backing store cannot be reached; callers treat dependent query
    /// scenarios as skipped in that case.
    pub async fn connect(config: &HarnessConfig) -> Result<Self, HarnessError> {
        let url = config.database_url.as_deref().ok_or_else(|| {
            HarnessError::DatabaseUnavailable("DATABASE_URL is not configured".to_string())
        })?;

        Self::connect_with(
            url,
            config.db_pool_max_connections,
            config.db_acquire_timeout_ms,
        )
        .await
    }

    pub async fn connect_with(
        url: &str,
        max_connections: u32,
        acquire_timeout_ms: u64,
    ) -> Result<Self, HarnessError> {
        install_default_drivers();

        // connect() validates by checking out one connection, so an
        // unreachable store surfaces here rather than mid-run.
        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_millis(acquire_timeout_ms))
            .connect(url)
            .await
            .map_err(|e| HarnessError::DatabaseUnavailable(e.to_string()))?;

        info!(
            max_connections,
            acquire_timeout_ms, "Database pool initialized"
        );

        Ok(Self {
            pool,
            max_connections,
            acquire_timeout_ms,
            pending_acquires: AtomicU64::new(0),
        })
    }

    /// Checks out one connection, waiting up to the acquisition timeout when
    /// the pool is exhausted.
    pub async fn acquire(&self) -> Result<PoolConnection<Any>, HarnessError> {
        self.pending_acquires.fetch_add(1, Ordering::Relaxed);
        let result = self.pool.acquire().await;
        self.pending_acquires.fetch_sub(1, Ordering::Relaxed);

        result.map_err(|e| match e {
            sqlx::Error::PoolTimedOut => HarnessError::PoolTimeout {
                timeout_ms: self.acquire_timeout_ms,
            },
            other => HarnessError::Database(other.to_string()),
        })
    }

    pub fn diagnostics(&self) -> PoolDiagnostics {
        let size = self.pool.size();
        let idle = self.pool.num_idle() as u32;
        let diagnostics = PoolDiagnostics {
            max_connections: self.max_connections,
            active: size.saturating_sub(idle),
            idle,
            queued: self.pending_acquires.load(Ordering::Relaxed),
        };
        debug!(?diagnostics, "Pool diagnostics sampled");
        diagnostics
    }
}
