// ZoneLoader - app/switcher.rs
//
// Switch-to-latest dispatch of derivations.
//
// Architecture:
//   - `LatestSwitcher` lives on the controller thread; `run_derivation` runs
//     on one background thread per generation.
//   - Each dispatch bumps the generation, cancels the previous derivation's
//     `CancelToken`, and spawns a worker that iterates the derived stream.
//   - All workers share one mpsc channel; every message is tagged with the
//     generation it was dispatched under.
//   - `poll` / `wait` drain the channel and drop every message whose tag is
//     not the current generation. This gate is authoritative: it holds even
//     when a superseded worker ignores its cancel token and keeps sending.
//
// Failure handling:
//   - A derive function returning `Err`, a stream item `Err`, and a panic
//     anywhere in the worker all become `DerivationEvent::Failed` for that
//     generation. The switcher itself stays usable.
//   - A worker whose token is cancelled exits without reporting anything.

use crate::core::cancel::CancelToken;
use crate::core::model::{DerivationEvent, Generation, ZoneFilter};
use crate::core::source::ResultStream;
use crate::util::constants::DERIVATION_THREAD_PREFIX;
use crate::util::error::SourceError;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

/// Maps a filter value to a result stream. Invoked on the worker thread.
pub type DeriveFn<T> =
    dyn Fn(ZoneFilter, &CancelToken) -> Result<ResultStream<T>, SourceError> + Send + Sync;

/// The one derivation allowed to be in flight.
struct ActiveDerivation {
    generation: Generation,
    cancel: CancelToken,
}

// =============================================================================
// LatestSwitcher
// =============================================================================

/// Dispatches derivations so that only the most recently requested filter's
/// output is ever forwarded.
pub struct LatestSwitcher<T> {
    derive: Arc<DeriveFn<T>>,
    tx: mpsc::Sender<DerivationEvent<T>>,
    rx: mpsc::Receiver<DerivationEvent<T>>,
    generation: Generation,
    /// Filter of the most recent dispatch, kept after the handle is discarded.
    current_filter: Option<ZoneFilter>,
    active: Option<ActiveDerivation>,
    discarded: u64,
}

impl<T: Send + 'static> LatestSwitcher<T> {
    pub fn new<F>(derive: F) -> Self
    where
        F: Fn(ZoneFilter, &CancelToken) -> Result<ResultStream<T>, SourceError>
            + Send
            + Sync
            + 'static,
    {
        let (tx, rx) = mpsc::channel();
        Self {
            derive: Arc::new(derive),
            tx,
            rx,
            generation: Generation::NONE,
            current_filter: None,
            active: None,
            discarded: 0,
        }
    }

    /// Supersede the active derivation with a new one for `filter`.
    ///
    /// `on_dispatch` runs after the previous derivation is cancelled and
    /// before the new worker starts, receiving the new generation.
    pub fn switch_to(
        &mut self,
        filter: ZoneFilter,
        on_dispatch: impl FnOnce(Generation),
    ) -> Generation {
        self.cancel_active();

        let generation = self.generation.next();
        self.generation = generation;
        self.current_filter = Some(filter);
        on_dispatch(generation);

        let cancel = CancelToken::new();
        let derive = Arc::clone(&self.derive);
        let tx = self.tx.clone();
        let worker_cancel = cancel.clone();

        let spawned = std::thread::Builder::new()
            .name(format!("{DERIVATION_THREAD_PREFIX}-{}", generation.get()))
            .spawn(move || run_derivation(derive, filter, generation, worker_cancel, tx));

        if let Err(e) = spawned {
            tracing::error!(%generation, error = %e, "Cannot spawn derivation worker");
            // The receiver is owned by `self`, so this send cannot fail.
            let _ = self.tx.send(DerivationEvent::Failed {
                generation,
                error: SourceError::backend(format!("cannot start loading: {e}")),
            });
        }

        self.active = Some(ActiveDerivation { generation, cancel });
        tracing::debug!(%generation, %filter, "Derivation dispatched");
        generation
    }

    /// Cancel the active derivation, if any, and discard its handle.
    pub fn cancel_active(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
            tracing::debug!(generation = %active.generation, "Derivation cancelled");
        }
    }

    /// Drain pending messages without blocking, keeping only those of the
    /// current generation.
    pub fn poll(&mut self) -> Vec<DerivationEvent<T>> {
        let pending: Vec<_> = self.rx.try_iter().collect();
        self.admit(pending)
    }

    /// Block until at least one current-generation message arrives or
    /// `timeout` elapses, then drain everything pending.
    pub fn wait(&mut self, timeout: Duration) -> Vec<DerivationEvent<T>> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let first = match self.rx.recv_timeout(remaining) {
                Ok(event) => event,
                Err(_) => return Vec::new(),
            };
            let mut pending = vec![first];
            pending.extend(self.rx.try_iter());
            let admitted = self.admit(pending);
            if !admitted.is_empty() {
                return admitted;
            }
        }
    }

    /// Generation gate. Terminal messages also discard the active handle.
    fn admit(&mut self, pending: Vec<DerivationEvent<T>>) -> Vec<DerivationEvent<T>> {
        let mut admitted = Vec::with_capacity(pending.len());
        for event in pending {
            let generation = event.generation();
            if generation != self.generation {
                self.discarded += 1;
                tracing::trace!(
                    stale = %generation,
                    current = %self.generation,
                    "Dropping output of superseded derivation"
                );
                continue;
            }
            if !matches!(event, DerivationEvent::Emitted { .. }) {
                self.active = None;
            }
            admitted.push(event);
        }
        admitted
    }

    pub fn current_generation(&self) -> Generation {
        self.generation
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation == self.generation
    }

    /// Filter of the most recent dispatch, if any.
    pub fn current_filter(&self) -> Option<ZoneFilter> {
        self.current_filter
    }

    /// Returns true while the current derivation has not ended.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Number of stale messages dropped by the generation gate.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}

impl<T> Drop for LatestSwitcher<T> {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
        }
    }
}

// =============================================================================
// Background derivation
// =============================================================================

/// Worker entry point: runs one derivation and reports a panic as a failure.
fn run_derivation<T>(
    derive: Arc<DeriveFn<T>>,
    filter: ZoneFilter,
    generation: Generation,
    cancel: CancelToken,
    tx: mpsc::Sender<DerivationEvent<T>>,
) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        drive(&*derive, filter, generation, &cancel, &tx);
    }));

    if let Err(payload) = outcome {
        let detail = panic_detail(payload.as_ref());
        tracing::error!(%generation, %filter, detail = %detail, "Derivation panicked");
        if !cancel.is_cancelled() {
            let _ = tx.send(DerivationEvent::Failed {
                generation,
                error: SourceError::Panicked { detail },
            });
        }
    }
}

/// Open the stream for `filter` and forward its items until it ends, fails,
/// or the token is cancelled.
fn drive<T>(
    derive: &DeriveFn<T>,
    filter: ZoneFilter,
    generation: Generation,
    cancel: &CancelToken,
    tx: &mpsc::Sender<DerivationEvent<T>>,
) {
    macro_rules! send {
        ($msg:expr) => {
            if tx.send($msg).is_err() {
                return; // Controller dropped; exit quietly.
            }
        };
    }

    macro_rules! check_cancel {
        () => {
            if cancel.is_cancelled() {
                tracing::debug!(%generation, "Derivation superseded, stopping");
                return;
            }
        };
    }

    check_cancel!();
    let mut stream = match derive(filter, cancel) {
        Ok(stream) => stream,
        Err(error) => {
            check_cancel!();
            tracing::debug!(%generation, %error, "Derivation could not open stream");
            send!(DerivationEvent::Failed { generation, error });
            return;
        }
    };

    loop {
        check_cancel!();
        let Some(item) = stream.next() else { break };
        check_cancel!();

        match item {
            Ok(items) => {
                tracing::trace!(%generation, count = items.len(), "Derivation emitted");
                send!(DerivationEvent::Emitted { generation, items });
            }
            Err(error) => {
                tracing::debug!(%generation, %error, "Derivation stream failed");
                send!(DerivationEvent::Failed { generation, error });
                return;
            }
        }
    }

    check_cancel!();
    send!(DerivationEvent::Completed { generation });
}

/// Best-effort text of a panic payload.
fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
