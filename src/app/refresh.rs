// ZoneLoader - app/refresh.rs
//
// Fire-and-forget cache priming, run once per filter change.
//
// Failures are logged and swallowed: only result stream failures reach the
// user-visible message. Refreshes are not superseded by newer filter values;
// they share one root token that is cancelled when the refresher is dropped.

use crate::core::cancel::CancelToken;
use crate::core::model::ZoneFilter;
use crate::core::source::DataSource;
use crate::util::constants::REFRESH_THREAD_PREFIX;
use std::sync::Arc;

pub struct CacheRefresher<S> {
    source: Arc<S>,
    cancel: CancelToken,
    issued: u64,
}

impl<S: DataSource> CacheRefresher<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            cancel: CancelToken::new(),
            issued: 0,
        }
    }

    /// Start a background cache refresh for `filter`.
    pub fn refresh(&mut self, filter: ZoneFilter) {
        self.issued += 1;
        let source = Arc::clone(&self.source);
        let cancel = self.cancel.clone();

        let spawned = std::thread::Builder::new()
            .name(format!("{REFRESH_THREAD_PREFIX}-{}", self.issued))
            .spawn(move || {
                let result = match filter {
                    ZoneFilter::All => source.refresh_cache_all(&cancel),
                    ZoneFilter::Zone(zone) => source.refresh_cache_filtered(zone, &cancel),
                };
                match result {
                    Ok(()) => tracing::debug!(%filter, "Cache refreshed"),
                    Err(e) => tracing::warn!(%filter, error = %e, "Cache refresh failed; ignored"),
                }
            });

        if let Err(e) = spawned {
            tracing::warn!(%filter, error = %e, "Cannot spawn cache refresh worker; skipped");
        }
    }

    /// Number of refreshes started since construction.
    pub fn issued(&self) -> u64 {
        self.issued
    }
}

impl<S> Drop for CacheRefresher<S> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
