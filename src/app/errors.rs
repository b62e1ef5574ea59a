// ZoneLoader - app/errors.rs
//
// One-shot user-visible error message for derivation failures.
//
// A failure of the current generation replaces any unacknowledged message
// (no queue) and settles the loading flag. Failures of superseded
// generations are discarded without touching either.

use crate::app::loading::LoadingTracker;
use crate::core::cell::{Observable, StateCell};
use crate::core::model::Generation;
use crate::util::error::SourceError;

pub struct ErrorSurface {
    message: StateCell<Option<String>>,
    surfaced: u64,
}

impl ErrorSurface {
    pub fn new() -> Self {
        Self {
            message: StateCell::new(None),
            surfaced: 0,
        }
    }

    /// Report `error` from `generation` while `current` is the newest
    /// dispatched generation. Returns true if the message was shown.
    pub fn surface(
        &mut self,
        generation: Generation,
        current: Generation,
        error: &SourceError,
        loading: &mut LoadingTracker,
    ) -> bool {
        if generation != current {
            tracing::debug!(
                %generation,
                %current,
                %error,
                "Discarding failure of superseded derivation"
            );
            return false;
        }

        tracing::warn!(%generation, %error, "Derivation failed");
        self.message.set(Some(error.to_string()));
        self.surfaced += 1;
        loading.settle(generation);
        true
    }

    /// Clear the message. A no-op (and no notification) when already clear.
    pub fn acknowledge(&self) -> bool {
        if self.message.get().is_none() {
            return false;
        }
        self.message.set(None);
        true
    }

    pub fn message(&self) -> Option<String> {
        self.message.get()
    }

    /// Total failures shown since construction.
    pub fn surfaced(&self) -> u64 {
        self.surfaced
    }

    pub fn observable(&self) -> Observable<Option<String>> {
        self.message.observable()
    }
}

impl Default for ErrorSurface {
    fn default() -> Self {
        Self::new()
    }
}
