// ZoneLoader - app/loading.rs
//
// Loading indicator bracketing each derivation's active lifetime.
// Only the generation that most recently began may clear the flag, and
// only once.

use crate::core::cell::{Observable, StateCell};
use crate::core::model::Generation;

/// Owns the loading flag. Callers can observe it but never write it.
pub struct LoadingTracker {
    flag: StateCell<bool>,
    active: Option<Generation>,
    settled: bool,
}

impl LoadingTracker {
    pub fn new() -> Self {
        Self {
            flag: StateCell::new(false),
            active: None,
            settled: true,
        }
    }

    /// A derivation for `generation` is starting: raise the flag.
    ///
    /// Any earlier generation loses the right to clear it.
    pub fn begin(&mut self, generation: Generation) {
        self.active = Some(generation);
        self.settled = false;
        self.flag.set_if_changed(true);
    }

    /// `generation` settled (result, failure or completion).
    ///
    /// Lowers the flag and returns true only the first time the currently
    /// active generation settles; anything else is ignored.
    pub fn settle(&mut self, generation: Generation) -> bool {
        if self.active != Some(generation) {
            tracing::trace!(%generation, "Ignoring settle of superseded derivation");
            return false;
        }
        if self.settled {
            return false;
        }
        self.settled = true;
        self.flag.set_if_changed(false);
        true
    }

    pub fn is_loading(&self) -> bool {
        self.flag.get()
    }

    /// Generation that currently owns the flag.
    pub fn active_generation(&self) -> Option<Generation> {
        self.active
    }

    pub fn observable(&self) -> Observable<bool> {
        self.flag.observable()
    }
}

impl Default for LoadingTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generations() -> (Generation, Generation) {
        let first = Generation::NONE.next();
        (first, first.next())
    }

    #[test]
    fn test_begin_then_settle_brackets_flag() {
        let (first, _) = generations();
        let mut tracker = LoadingTracker::new();
        let watcher = tracker.observable().observe();

        tracker.begin(first);
        assert!(tracker.is_loading());
        assert!(tracker.settle(first));
        assert!(!tracker.is_loading());
        assert_eq!(watcher.drain(), vec![false, true, false]);
    }

    #[test]
    fn test_settle_is_applied_once() {
        let (first, _) = generations();
        let mut tracker = LoadingTracker::new();
        tracker.begin(first);
        assert!(tracker.settle(first));
        assert!(!tracker.settle(first));
    }

    #[test]
    fn test_superseded_generation_cannot_clear_flag() {
        let (first, second) = generations();
        let mut tracker = LoadingTracker::new();
        let watcher = tracker.observable().observe();

        tracker.begin(first);
        tracker.begin(second);
        assert!(!tracker.settle(first));
        assert!(tracker.is_loading());
        assert_eq!(tracker.active_generation(), Some(second));

        assert!(tracker.settle(second));
        // One rise, one fall: the supersession itself is not a transition.
        assert_eq!(watcher.drain(), vec![false, true, false]);
    }

    #[test]
    fn test_flag_rises_even_for_instant_settle() {
        let (first, second) = generations();
        let mut tracker = LoadingTracker::new();
        tracker.begin(first);
        tracker.settle(first);

        let watcher = tracker.observable().observe();
        tracker.begin(second);
        tracker.settle(second);
        assert_eq!(watcher.drain(), vec![false, true, false]);
    }
}
