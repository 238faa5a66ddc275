//! Single-slot TTL cache for league metadata.
//!
//! Readers share a `RwLock` over the snapshot. Refreshes are serialized by a
//! separate mutex so that callers racing on an expired entry produce exactly
//! one upstream fetch; the losers wait and then read the new snapshot.

use crate::clock::Clock;
use crate::error::SourceError;
use crate::models::LeagueMetadata;
use chrono::Duration;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

pub const DEFAULT_METADATA_TTL_HOURS: i64 = 24;

pub struct MetadataCache {
    ttl: Duration,
    slot: RwLock<Option<Arc<LeagueMetadata>>>,
    refresh: Mutex<()>,
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_METADATA_TTL_HOURS))
    }
}

impl MetadataCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    /// Current week, refreshing through `fetch` when the entry is missing or
    /// older than the TTL.
    pub async fn current_week<F, Fut>(&self, clock: &dyn Clock, fetch: F) -> Result<u32, SourceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<LeagueMetadata, SourceError>>,
    {
        self.metadata(clock, fetch).await.map(|m| m.current_week)
    }

    /// Fresh snapshot, refreshing if needed. On fetch failure the previous
    /// snapshot (if any) is left in place and the error is returned.
    pub async fn metadata<F, Fut>(
        &self,
        clock: &dyn Clock,
        fetch: F,
    ) -> Result<Arc<LeagueMetadata>, SourceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<LeagueMetadata, SourceError>>,
    {
        if let Some(snapshot) = self.fresh(clock).await {
            return Ok(snapshot);
        }

        let _guard = self.refresh.lock().await;

        // Another caller may have refreshed while we waited.
        if let Some(snapshot) = self.fresh(clock).await {
            return Ok(snapshot);
        }

        let called_at = clock.now();
        match fetch().await {
            Ok(mut metadata) => {
                let mut slot = self.slot.write().await;
                metadata.last_updated = match slot.as_ref() {
                    Some(prev) if prev.last_updated > called_at => prev.last_updated,
                    _ => called_at,
                };
                info!(
                    "League metadata refreshed: week {} (league {})",
                    metadata.current_week, metadata.league_id
                );
                let snapshot = Arc::new(metadata);
                *slot = Some(Arc::clone(&snapshot));
                Ok(snapshot)
            }
            Err(e) => {
                warn!("League metadata refresh failed: {}", e);
                Err(e)
            }
        }
    }

    /// Last stored snapshot regardless of age.
    pub async fn snapshot(&self) -> Option<Arc<LeagueMetadata>> {
        self.slot.read().await.clone()
    }

    async fn fresh(&self, clock: &dyn Clock) -> Option<Arc<LeagueMetadata>> {
        let slot = self.slot.read().await;
        let snapshot = slot.as_ref()?;
        if clock.now() - snapshot.last_updated > self.ttl {
            None
        } else {
            Some(Arc::clone(snapshot))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn metadata(week: u32) -> LeagueMetadata {
        LeagueMetadata {
            league_id: 42,
            name: "Test League".to_string(),
            current_week: week,
            current_scoring_period: week,
            season_id: 2024,
            first_week: 1,
            last_week: 17,
            is_active: true,
            last_updated: Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2024, 10, 6, 12, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_second_call_within_ttl_is_cached() {
        let cache = MetadataCache::default();
        let clock = clock();
        let calls = &AtomicUsize::new(0);

        for _ in 0..2 {
            let week = cache
                .current_week(&clock, move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(metadata(5))
                })
                .await
                .unwrap();
            assert_eq!(week, 5);
            clock.advance(Duration::hours(23));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_after_ttl() {
        let cache = MetadataCache::default();
        let clock = clock();
        let calls = &AtomicUsize::new(0);
        let fetch = move |week| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(metadata(week))
            }
        };

        assert_eq!(cache.current_week(&clock, fetch(5)).await.unwrap(), 5);

        // exactly at the TTL is still fresh
        clock.advance(Duration::hours(24));
        assert_eq!(cache.current_week(&clock, fetch(6)).await.unwrap(), 5);

        clock.advance(Duration::seconds(1));
        assert_eq!(cache.current_week(&clock, fetch(6)).await.unwrap(), 6);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_timestamp_is_call_time() {
        let cache = MetadataCache::default();
        let clock = clock();
        cache
            .current_week(&clock, || async { Ok(metadata(3)) })
            .await
            .unwrap();

        let snapshot = cache.snapshot().await.unwrap();
        assert_eq!(snapshot.last_updated, clock.now());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_stale_snapshot() {
        let cache = MetadataCache::default();
        let clock = clock();
        cache
            .current_week(&clock, || async { Ok(metadata(5)) })
            .await
            .unwrap();
        let before = cache.snapshot().await.unwrap();

        clock.advance(Duration::hours(30));
        let err = cache
            .current_week(&clock, || async {
                Err(SourceError::Transport("timed out".to_string()))
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));

        let after = cache.snapshot().await.unwrap();
        assert_eq!(*after, *before);
    }

    #[tokio::test]
    async fn test_failure_on_empty_cache_surfaces() {
        let cache = MetadataCache::default();
        let result = cache
            .current_week(&clock(), || async { Err(SourceError::Status(500)) })
            .await;
        assert!(result.is_err());
        assert!(cache.snapshot().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_refresh() {
        let cache = MetadataCache::default();
        let clock = clock();
        let calls = &AtomicUsize::new(0);
        let fetch = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            Ok(metadata(9))
        };

        let (a, b, c) = tokio::join!(
            cache.current_week(&clock, fetch),
            cache.current_week(&clock, fetch),
            cache.current_week(&clock, fetch),
        );

        assert_eq!((a.unwrap(), b.unwrap(), c.unwrap()), (9, 9, 9));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiters_retry_after_failed_refresh() {
        let cache = MetadataCache::default();
        let clock = clock();
        let calls = &AtomicUsize::new(0);
        let fetch = move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            if n == 0 {
                Err(SourceError::Status(503))
            } else {
                Ok(metadata(4))
            }
        };

        let (a, b) = tokio::join!(
            cache.current_week(&clock, fetch),
            cache.current_week(&clock, fetch),
        );

        assert!(a.is_err());
        assert_eq!(b.unwrap(), 4);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
