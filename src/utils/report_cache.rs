use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::model::daily_aggregate::DailyAggregate;
use crate::utils::db_utils::ScanFilter;

/// Short-lived memo of aggregated scans per filter. Reports over the same
/// range hit MySQL once per TTL.
#[derive(Clone)]
pub struct ReportCache {
    inner: Cache<ScanFilter, Arc<Vec<DailyAggregate>>>,
}

impl ReportCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Returns the cached aggregates or runs `load` once for concurrent
    /// callers asking for the same filter.
    pub async fn get_or_load<F, E>(
        &self,
        filter: ScanFilter,
        load: F,
    ) -> Result<Arc<Vec<DailyAggregate>>, Arc<E>>
    where
        F: Future<Output = Result<Vec<DailyAggregate>, E>>,
        E: Send + Sync + 'static,
    {
        self.inner
            .try_get_with(filter, async move { load.await.map(Arc::new) })
            .await
    }

    /// Drops everything, e.g. after a dashboard rebuild saw new scans.
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}
