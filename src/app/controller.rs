// ZoneLoader - app/controller.rs
//
// Composition root: filter selection -> cache refresh + switched derivation
// -> loading flag, error message and result list.
//
// Architecture:
//   - `FilterController` is owned by one thread (the UI or caller thread),
//     which is the single point where shared state is mutated.
//   - One `FilterState` feeds two watchers: the cache refresh reaction runs
//     for every set call, the result reaction supersedes the previous
//     derivation through `LatestSwitcher`.
//   - Worker output reaches shared state only through `poll` / `wait`,
//     after the switcher's generation gate.
//
// No timeout is imposed on derivations: a source that never answers keeps
// `loading` raised until the filter changes again.

use crate::app::errors::ErrorSurface;
use crate::app::loading::LoadingTracker;
use crate::app::refresh::CacheRefresher;
use crate::app::switcher::LatestSwitcher;
use crate::core::cell::{Observable, StateCell, Watcher};
use crate::core::filter::FilterState;
use crate::core::model::{ControllerSnapshot, DerivationEvent, Generation, ZoneFilter};
use crate::core::source::DataSource;
use crate::util::error::FilterError;
use std::sync::Arc;
use std::time::Duration;

pub struct FilterController<S: DataSource> {
    filter: FilterState,
    refresh_feed: Watcher<ZoneFilter>,
    results_feed: Watcher<ZoneFilter>,
    refresher: CacheRefresher<S>,
    switcher: LatestSwitcher<S::Item>,
    loading: LoadingTracker,
    errors: ErrorSurface,
    results: StateCell<Vec<S::Item>>,
    /// The current generation settled with a failure.
    last_failed: bool,
}

impl<S: DataSource> FilterController<S> {
    /// Create a controller and immediately prime it for the sentinel filter:
    /// a cache refresh is fired and the unfiltered derivation starts.
    pub fn new(source: S) -> Self {
        Self::with_source(Arc::new(source))
    }

    /// Like `new`, for a source the caller keeps a handle to.
    pub fn with_source(source: Arc<S>) -> Self {
        let filter = FilterState::default();
        let refresh_feed = filter.observe();
        let results_feed = filter.observe();

        let derive_source = Arc::clone(&source);
        let switcher = LatestSwitcher::new(move |filter, cancel| match filter {
            ZoneFilter::All => derive_source.stream_all(cancel),
            ZoneFilter::Zone(zone) => derive_source.stream_filtered(zone, cancel),
        });

        let mut controller = Self {
            filter,
            refresh_feed,
            results_feed,
            refresher: CacheRefresher::new(source),
            switcher,
            loading: LoadingTracker::new(),
            errors: ErrorSurface::new(),
            results: StateCell::new(Vec::new()),
            last_failed: false,
        };

        // Both feeds replay the initial sentinel.
        controller.react_to_filter_changes();
        tracing::info!("Filter controller started");
        controller
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    pub fn set_filter(&mut self, value: ZoneFilter) {
        tracing::info!(filter = %value, "Filter set");
        self.filter.set(value);
        self.react_to_filter_changes();
    }

    /// Set the filter from a raw zone id (`0` = no filter).
    ///
    /// Invalid ids fail here and leave the controller untouched.
    pub fn set_zone(&mut self, raw: i64) -> Result<(), FilterError> {
        let value = ZoneFilter::from_raw(raw)?;
        self.set_filter(value);
        Ok(())
    }

    pub fn clear_filter(&mut self) {
        self.set_filter(ZoneFilter::All);
    }

    pub fn acknowledge_message(&mut self) {
        if self.errors.acknowledge() {
            tracing::debug!("Message acknowledged");
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn is_filtered(&self) -> bool {
        self.filter.is_filtered()
    }

    pub fn filter(&self) -> ZoneFilter {
        self.filter.get()
    }

    /// Generation of the most recently dispatched derivation.
    pub fn generation(&self) -> Generation {
        self.switcher.current_generation()
    }

    pub fn results(&self) -> Observable<Vec<S::Item>> {
        self.results.observable()
    }

    pub fn loading(&self) -> Observable<bool> {
        self.loading.observable()
    }

    pub fn message(&self) -> Observable<Option<String>> {
        self.errors.observable()
    }

    pub fn filter_observable(&self) -> Observable<ZoneFilter> {
        self.filter.observable()
    }

    /// Cache refreshes started since construction.
    pub fn refreshes_issued(&self) -> u64 {
        self.refresher.issued()
    }

    /// Stale worker messages dropped since construction.
    pub fn discarded(&self) -> u64 {
        self.switcher.discarded()
    }

    pub fn snapshot(&self) -> ControllerSnapshot<S::Item> {
        ControllerSnapshot {
            filter: self.filter.get(),
            generation: self.switcher.current_generation(),
            loading: self.loading.is_loading(),
            message: self.errors.message(),
            results: self.results.get(),
        }
    }

    // -------------------------------------------------------------------------
    // Applying worker output
    // -------------------------------------------------------------------------

    /// Apply all pending derivation output without blocking.
    /// Returns the number of messages applied.
    pub fn poll(&mut self) -> usize {
        let events = self.switcher.poll();
        self.apply(events)
    }

    /// Wait up to `timeout` for derivation output, then apply everything
    /// pending. Returns the number of messages applied.
    pub fn wait(&mut self, timeout: Duration) -> usize {
        let events = self.switcher.wait(timeout);
        self.apply(events)
    }

    fn apply(&mut self, events: Vec<DerivationEvent<S::Item>>) -> usize {
        let count = events.len();
        for event in events {
            let current = self.switcher.current_generation();
            match event {
                DerivationEvent::Emitted { generation, items } => {
                    tracing::debug!(%generation, count = items.len(), "Results updated");
                    self.results.set(items);
                    self.loading.settle(generation);
                }
                DerivationEvent::Failed { generation, error } => {
                    if self
                        .errors
                        .surface(generation, current, &error, &mut self.loading)
                    {
                        self.last_failed = true;
                    }
                }
                DerivationEvent::Completed { generation } => {
                    tracing::debug!(%generation, "Derivation completed");
                    self.loading.settle(generation);
                }
            }
        }
        count
    }

    // -------------------------------------------------------------------------
    // Filter reactions
    // -------------------------------------------------------------------------

    fn react_to_filter_changes(&mut self) {
        for value in self.refresh_feed.drain() {
            self.refresher.refresh(value);
        }
        for value in self.results_feed.drain() {
            self.start_derivation(value);
        }
    }

    fn start_derivation(&mut self, value: ZoneFilter) {
        if self.switcher.current_filter() == Some(value) && !self.last_failed {
            tracing::debug!(filter = %value, "Filter unchanged; keeping current results");
            return;
        }
        self.last_failed = false;
        let loading = &mut self.loading;
        self.switcher
            .switch_to(value, |generation| loading.begin(generation));
    }
}
