// ZoneLoader - core/cell.rs
//
// Replay-latest observable state cell.
//
// A `StateCell` holds exactly one value plus a version counter. Every `set`
// pushes the new value to each live subscriber while holding the cell lock,
// so all watchers see updates in the order the `set` calls were made. A new
// subscriber first receives the value current at subscription time.
//
// Architecture:
//   - `StateCell<T>` is the writable handle, kept by the owning component.
//   - `Observable<T>` is a read-only clone handed out to observers.
//   - `Watcher<T>` is one subscription; it wraps an mpsc receiver.
//   - Subscribers whose `Watcher` was dropped are pruned on the next `set`.

use std::sync::{mpsc, Arc, Mutex, MutexGuard};
use std::time::Duration;

struct Inner<T> {
    value: T,
    version: u64,
    subscribers: Vec<mpsc::Sender<T>>,
}

fn lock<T>(inner: &Mutex<Inner<T>>) -> MutexGuard<'_, Inner<T>> {
    // A panic while holding the lock cannot leave `Inner` half-written:
    // every mutation is a single assignment or a Vec::retain.
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn subscribe<T: Clone>(inner: &Mutex<Inner<T>>) -> Watcher<T> {
    let (tx, rx) = mpsc::channel();
    let mut guard = lock(inner);
    // Replay: the receiver is fresh, so this send cannot fail.
    let _ = tx.send(guard.value.clone());
    guard.subscribers.push(tx);
    Watcher { rx }
}

// =============================================================================
// StateCell
// =============================================================================

/// Writable single-slot cell with replay-1 observation semantics.
pub struct StateCell<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T: Clone> StateCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Replace the current value and notify every live watcher.
    pub fn set(&self, value: T) {
        let mut guard = lock(&self.inner);
        guard.version += 1;
        guard
            .subscribers
            .retain(|tx| tx.send(value.clone()).is_ok());
        guard.value = value;
    }

    /// Replace the value only if it differs from the current one.
    /// Returns true when a notification was sent.
    pub fn set_if_changed(&self, value: T) -> bool
    where
        T: PartialEq,
    {
        if lock(&self.inner).value == value {
            return false;
        }
        self.set(value);
        true
    }

    pub fn get(&self) -> T {
        lock(&self.inner).value.clone()
    }

    /// Number of `set` calls applied so far.
    pub fn version(&self) -> u64 {
        lock(&self.inner).version
    }

    /// Subscribe; the returned watcher starts with the current value.
    pub fn observe(&self) -> Watcher<T> {
        subscribe(&self.inner)
    }

    /// Read-only handle sharing this cell.
    pub fn observable(&self) -> Observable<T> {
        Observable {
            inner: Arc::clone(&self.inner),
        }
    }
}

// =============================================================================
// Observable
// =============================================================================

/// Read-only view of a `StateCell`. Cloning shares the same cell.
pub struct Observable<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone> Observable<T> {
    pub fn get(&self) -> T {
        lock(&self.inner).value.clone()
    }

    pub fn version(&self) -> u64 {
        lock(&self.inner).version
    }

    pub fn observe(&self) -> Watcher<T> {
        subscribe(&self.inner)
    }
}

// =============================================================================
// Watcher
// =============================================================================

/// A live subscription to a cell. Values arrive in `set` order.
pub struct Watcher<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> Watcher<T> {
    /// Next pending value, without blocking.
    pub fn try_next(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next value.
    pub fn next_timeout(&self, timeout: Duration) -> Option<T> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// All pending values in arrival order.
    pub fn drain(&self) -> Vec<T> {
        self.rx.try_iter().collect()
    }

    /// The most recent pending value, discarding older ones.
    pub fn latest(&self) -> Option<T> {
        self.rx.try_iter().last()
    }
}
