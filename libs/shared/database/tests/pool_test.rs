// =====================================================================================
// CONNECTION POOL INTEGRATION TESTS
// =====================================================================================

use std::sync::Arc;

use assert_matches::assert_matches;

use shared_database::DbPoolManager;
use shared_models::HarnessError;

#[tokio::test]
async fn concurrent_acquires_beyond_pool_size_all_succeed() {
    let manager = Arc::new(
        DbPoolManager::connect_with("sqlite::memory:", 5, 5_000)
            .await
            .unwrap(),
    );

    // 20 tasks against a pool of 5, each releasing immediately.
    let mut handles = Vec::new();
    for _ in 0..20 {
        let manager = Arc::clone(&manager);
        handles.push(tokio::spawn(async move {
            let conn = manager.acquire().await?;
            drop(conn);
            Ok::<(), HarnessError>(())
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let diag = manager.diagnostics();
    assert_eq!(diag.max_connections, 5);
    assert_eq!(diag.queued, 0);
    assert_eq!(diag.active, 0);
}

#[tokio::test]
async fn acquired_connection_shows_up_as_active() {
    let manager = DbPoolManager::connect_with("sqlite::memory:", 3, 5_000)
        .await
        .unwrap();

    let conn = manager.acquire().await.unwrap();
    let diag = manager.diagnostics();
    assert_eq!(diag.active, 1);

    drop(conn);
    let diag = manager.diagnostics();
    assert_eq!(diag.active, 0);
    assert_eq!(diag.idle, 1);
}

#[tokio::test]
async fn unreachable_store_fails_fast_with_unavailable() {
    let result = DbPoolManager::connect_with("postgres://nobody@127.0.0.1:9/none", 2, 500).await;
    assert_matches!(result, Err(HarnessError::DatabaseUnavailable(_)));
}
