use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::error::KvError;
use crate::store::KvStore;

/// Key under which the last schedule listing is kept.
pub const SCHEDULES_CACHE_KEY: &str = "pagerduty_schedules_cache";

/// Best-effort cache of the most recent schedule listing.
///
/// The blob is stored as given and never interpreted. It is a convenience
/// copy: readers must not treat it as current.
#[derive(Clone)]
pub struct ScheduleCache {
    store: Arc<dyn KvStore>,
    ttl: Option<Duration>,
}

impl fmt::Debug for ScheduleCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduleCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl ScheduleCache {
    /// Wrap `store`. Entries written through this cache expire after `ttl`,
    /// or never when `ttl` is `None`.
    pub fn new(store: Arc<dyn KvStore>, ttl: Option<Duration>) -> Self {
        Self { store, ttl }
    }

    pub async fn get_cached_schedules(&self) -> Result<Option<Vec<u8>>, KvError> {
        self.store.get(SCHEDULES_CACHE_KEY).await
    }

    pub async fn set_cached_schedules(&self, data: &[u8]) -> Result<(), KvError> {
        debug!(bytes = data.len(), "caching schedule listing");
        self.store.set(SCHEDULES_CACHE_KEY, data, self.ttl).await
    }

    pub async fn clear(&self) -> Result<bool, KvError> {
        self.store.delete(SCHEDULES_CACHE_KEY).await
    }
}
