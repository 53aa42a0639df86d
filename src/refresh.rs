//! Refresh coordination — pulling new contests from a `DrawSource` into
//! the store.
//!
//! A refresh never fails as a whole: per-contest fetch or validation
//! failures are counted in the report, and only the initial latest-contest
//! lookup failing produces an all-error report. Re-ingesting a contest that
//! is already stored counts as processed but neither inserted nor an error
//! (the skip policy; see `RefreshReport`).
//!
//! Every fetch runs outside the store lock; the write lock is taken per
//! append only, so read endpoints keep serving while a long walk is in
//! flight.

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::source::DrawSource;
use crate::store::DrawStore;
use crate::types::{EngineError, RefreshReport};

/// Pull every contest the source has that the store doesn't.
///
/// With `full` set, the walk restarts at contest 1 instead of the store's
/// latest + 1; existing contests are skipped, missing ones back-filled.
pub async fn refresh(source: &dyn DrawSource, store: &RwLock<DrawStore>, full: bool) -> RefreshReport {
    let latest = match source.fetch_latest().await {
        Ok(draw) => draw,
        Err(e) => {
            warn!(source = source.name(), error = %e, "Latest-contest lookup failed");
            return RefreshReport {
                total_processed: 0,
                total_inserted: 0,
                total_errors: 1,
                latest_contest: None,
                message: format!("Failed to reach draw source: {e}"),
            };
        }
    };
    let latest_contest = latest.contest_number;

    let start = if full {
        1
    } else {
        match store.read().await.latest() {
            Ok(draw) => draw.contest_number + 1,
            Err(_) => 1,
        }
    };

    if start > latest_contest {
        return RefreshReport {
            total_processed: 0,
            total_inserted: 0,
            total_errors: 0,
            latest_contest: Some(latest_contest),
            message: "Store is already up to date".to_string(),
        };
    }

    info!(
        source = source.name(),
        from = start,
        to = latest_contest,
        "Refreshing contests"
    );

    let mut total_processed = 0u64;
    let mut total_inserted = 0u64;
    let mut total_errors = 0u64;

    for contest in start..=latest_contest {
        total_processed += 1;

        // No lock held here — the fetch can take seconds
        let fetched = if contest == latest_contest {
            Ok(latest.clone())
        } else {
            source.fetch_contest(contest).await
        };

        match fetched {
            Ok(draw) => match store.write().await.append(draw) {
                Ok(()) => total_inserted += 1,
                Err(EngineError::DuplicateContest(_)) => {
                    debug!(contest, "Already stored, skipping");
                }
                Err(e) => {
                    warn!(contest, error = %e, "Rejected draw from source");
                    total_errors += 1;
                }
            },
            Err(e) => {
                warn!(contest, error = %e, "Fetch failed");
                total_errors += 1;
            }
        }
    }

    info!(
        inserted = total_inserted,
        errors = total_errors,
        latest = latest_contest,
        "Refresh complete"
    );

    RefreshReport {
        total_processed,
        total_inserted,
        total_errors,
        latest_contest: Some(latest_contest),
        message: "Refresh complete".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockDrawSource;
    use crate::types::Draw;
    use anyhow::Result;
    use async_trait::async_trait;
    use mockall::predicate::eq;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Notify;

    fn draw(contest: u32) -> Draw {
        let base = ((contest * 7) % 70) as u8;
        Draw {
            contest_number: contest,
            draw_date: "2025-06-01".to_string(),
            drawn_numbers: vec![base + 1, base + 2, base + 3, base + 4, base + 5],
            accumulated: contest % 2 == 0,
        }
    }

    fn source_with_latest(latest: u32) -> MockDrawSource {
        let mut source = MockDrawSource::new();
        source.expect_name().return_const("mock".to_string());
        source
            .expect_fetch_latest()
            .returning(move || Ok(draw(latest)));
        source
    }

    #[tokio::test]
    async fn test_refresh_fills_empty_store() {
        let mut source = source_with_latest(3);
        source
            .expect_fetch_contest()
            .returning(|contest| Ok(draw(contest)));

        let store = RwLock::new(DrawStore::new());
        let report = refresh(&source, &store, false).await;

        assert_eq!(report.total_processed, 3);
        assert_eq!(report.total_inserted, 3);
        assert_eq!(report.total_errors, 0);
        assert_eq!(report.latest_contest, Some(3));
        assert_eq!(store.into_inner().len(), 3);
    }

    #[tokio::test]
    async fn test_refresh_twice_is_idempotent() {
        let store = RwLock::new(DrawStore::new());

        let mut first = source_with_latest(3);
        first
            .expect_fetch_contest()
            .returning(|contest| Ok(draw(contest)));
        let report = refresh(&first, &store, false).await;
        assert_eq!(report.total_inserted, 3);

        // Same source data again: nothing to do
        let second = source_with_latest(3);
        let report = refresh(&second, &store, false).await;
        assert_eq!(report.total_processed, 0);
        assert_eq!(report.total_inserted, 0);
        assert_eq!(report.total_errors, 0);
        assert_eq!(report.latest_contest, Some(3));
        assert_eq!(store.into_inner().len(), 3);
    }

    #[tokio::test]
    async fn test_refresh_continues_from_store_latest() {
        let mut store = DrawStore::new();
        store.append(draw(1)).unwrap();
        store.append(draw(2)).unwrap();
        let store = RwLock::new(store);

        let mut source = source_with_latest(4);
        source
            .expect_fetch_contest()
            .with(eq(3))
            .returning(|contest| Ok(draw(contest)));

        let report = refresh(&source, &store, false).await;
        assert_eq!(report.total_processed, 2); // contests 3 and 4
        assert_eq!(report.total_inserted, 2);
        assert_eq!(store.into_inner().latest().unwrap().contest_number, 4);
    }

    #[tokio::test]
    async fn test_refresh_counts_fetch_failures_as_errors() {
        let mut source = source_with_latest(3);
        source.expect_fetch_contest().returning(|contest| {
            if contest == 2 {
                Err(anyhow::anyhow!("upstream 500"))
            } else {
                Ok(draw(contest))
            }
        });

        let store = RwLock::new(DrawStore::new());
        let report = refresh(&source, &store, false).await;

        assert_eq!(report.total_processed, 3);
        assert_eq!(report.total_inserted, 2);
        assert_eq!(report.total_errors, 1);
        assert_eq!(store.into_inner().len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_counts_malformed_draws_as_errors() {
        let mut source = source_with_latest(2);
        source.expect_fetch_contest().returning(|contest| {
            let mut bad = draw(contest);
            bad.drawn_numbers = vec![1, 1, 1, 1, 1];
            Ok(bad)
        });

        let store = RwLock::new(DrawStore::new());
        let report = refresh(&source, &store, false).await;

        assert_eq!(report.total_processed, 2);
        assert_eq!(report.total_inserted, 1); // only the reused latest draw
        assert_eq!(report.total_errors, 1);
    }

    #[test]
    fn test_refresh_source_down_reports_single_error() {
        let mut source = MockDrawSource::new();
        source.expect_name().return_const("mock".to_string());
        source
            .expect_fetch_latest()
            .returning(|| Err(anyhow::anyhow!("connection refused")));

        let store = RwLock::new(DrawStore::new());
        let report = tokio_test::block_on(refresh(&source, &store, false));

        assert_eq!(report.total_processed, 0);
        assert_eq!(report.total_errors, 1);
        assert!(report.latest_contest.is_none());
        assert!(report.message.contains("connection refused"));
        assert!(store.into_inner().is_empty());
    }

    #[tokio::test]
    async fn test_full_refresh_skips_existing_contests() {
        let mut store = DrawStore::new();
        store.append(draw(2)).unwrap();
        let store = RwLock::new(store);

        let mut source = source_with_latest(3);
        source
            .expect_fetch_contest()
            .returning(|contest| Ok(draw(contest)));

        let report = refresh(&source, &store, true).await;
        // Contest 2 was processed but skipped: neither inserted nor an error
        assert_eq!(report.total_processed, 3);
        assert_eq!(report.total_inserted, 2);
        assert_eq!(report.total_errors, 0);
        assert_eq!(store.into_inner().len(), 3);
    }

    /// A source whose per-contest fetches park on a gate until released.
    struct GatedSource {
        latest: Draw,
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl DrawSource for GatedSource {
        async fn fetch_latest(&self) -> Result<Draw> {
            Ok(self.latest.clone())
        }

        async fn fetch_contest(&self, contest_number: u32) -> Result<Draw> {
            self.gate.notified().await;
            Ok(draw(contest_number))
        }

        fn name(&self) -> &str {
            "gated"
        }
    }

    #[tokio::test]
    async fn test_reads_not_blocked_while_walk_is_fetching() {
        let gate = Arc::new(Notify::new());
        let source = GatedSource {
            latest: draw(2),
            gate: Arc::clone(&gate),
        };
        let store = Arc::new(RwLock::new(DrawStore::new()));

        let walk_store = Arc::clone(&store);
        let walk = tokio::spawn(async move { refresh(&source, &walk_store, false).await });

        // Let the walk park inside the contest-1 fetch
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        // The store must stay readable while the walk waits on the network
        let guard = tokio::time::timeout(Duration::from_millis(100), store.read())
            .await
            .expect("read lock blocked by an in-flight refresh");
        assert!(guard.is_empty());
        drop(guard);

        gate.notify_one();
        let report = walk.await.unwrap();
        assert_eq!(report.total_inserted, 2);
        assert_eq!(store.read().await.len(), 2);
    }
}
