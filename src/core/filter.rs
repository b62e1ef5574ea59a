// ZoneLoader - core/filter.rs
//
// The current filter selection. A replay-latest cell specialised to
// `ZoneFilter`, starting at the "no filter" sentinel.

use crate::core::cell::{Observable, StateCell, Watcher};
use crate::core::model::ZoneFilter;

/// Single-slot holder of the current filter value.
///
/// Every `set` call is delivered to every watcher, in call order, including
/// a repeat of the value already held.
pub struct FilterState {
    cell: StateCell<ZoneFilter>,
}

impl FilterState {
    pub fn new(initial: ZoneFilter) -> Self {
        Self {
            cell: StateCell::new(initial),
        }
    }

    pub fn set(&self, value: ZoneFilter) {
        self.cell.set(value);
    }

    pub fn get(&self) -> ZoneFilter {
        self.cell.get()
    }

    /// Reset to the sentinel.
    pub fn clear(&self) {
        self.cell.set(ZoneFilter::All);
    }

    /// Returns true if the current value is not the sentinel.
    pub fn is_filtered(&self) -> bool {
        self.get().is_filtered()
    }

    /// Live sequence of values, starting with the current one.
    pub fn observe(&self) -> Watcher<ZoneFilter> {
        self.cell.observe()
    }

    pub fn observable(&self) -> Observable<ZoneFilter> {
        self.cell.observable()
    }

    pub fn version(&self) -> u64 {
        self.cell.version()
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(ZoneFilter::All)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::ZoneId;

    fn zone(id: u32) -> ZoneFilter {
        ZoneFilter::Zone(ZoneId::new(id).unwrap())
    }

    #[test]
    fn test_default_is_unfiltered() {
        let state = FilterState::default();
        assert_eq!(state.get(), ZoneFilter::All);
        assert!(!state.is_filtered());
    }

    #[test]
    fn test_clear_resets_to_sentinel() {
        let state = FilterState::default();
        state.set(zone(7));
        assert!(state.is_filtered());
        state.clear();
        assert!(!state.is_filtered());
    }

    #[test]
    fn test_repeated_value_is_still_delivered() {
        let state = FilterState::default();
        let watcher = state.observe();
        state.set(zone(2));
        state.set(zone(2));
        assert_eq!(watcher.drain(), vec![ZoneFilter::All, zone(2), zone(2)]);
        assert_eq!(state.version(), 2);
    }
}
