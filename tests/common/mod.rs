// ZoneLoader - tests/common/mod.rs
//
// Scripted data source for end-to-end controller tests.
//
// Every stream the controller opens is reported to the test as an
// `OpenedStream`, whose `gate` sender feeds that stream item by item.
// Dropping the gate ends the stream. Nothing is timed: the test decides
// exactly when each derivation emits, fails, or completes.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{mpsc, Arc, Mutex};
use std::time::{Duration, Instant};
use zoneloader::app::controller::FilterController;
use zoneloader::core::cancel::CancelToken;
use zoneloader::core::model::{ZoneFilter, ZoneId};
use zoneloader::core::source::{DataSource, ResultStream};
use zoneloader::util::error::SourceError;

/// Generous bound for anything that should happen "soon".
pub const WAIT: Duration = Duration::from_secs(5);

pub type Item = u32;
pub type Gate = mpsc::Sender<Result<Vec<Item>, SourceError>>;

/// One stream opened by the controller.
pub struct OpenedStream {
    pub filter: ZoneFilter,
    pub gate: Gate,
    pub cancel: CancelToken,
}

pub struct ScriptedSource {
    opened: Mutex<mpsc::Sender<OpenedStream>>,
    refreshes: Mutex<Vec<ZoneFilter>>,
    fail_open: Mutex<HashSet<ZoneFilter>>,
    fail_refresh: bool,
}

impl ScriptedSource {
    pub fn new() -> (Arc<Self>, mpsc::Receiver<OpenedStream>) {
        Self::build(false)
    }

    /// Variant whose cache refreshes always fail.
    pub fn with_failing_refresh() -> (Arc<Self>, mpsc::Receiver<OpenedStream>) {
        Self::build(true)
    }

    fn build(fail_refresh: bool) -> (Arc<Self>, mpsc::Receiver<OpenedStream>) {
        let (tx, rx) = mpsc::channel();
        let source = Self {
            opened: Mutex::new(tx),
            refreshes: Mutex::new(Vec::new()),
            fail_open: Mutex::new(HashSet::new()),
            fail_refresh,
        };
        (Arc::new(source), rx)
    }

    /// Make opening a stream for `filter` fail synchronously.
    pub fn fail_open(&self, filter: ZoneFilter) {
        self.fail_open.lock().unwrap().insert(filter);
    }

    pub fn refreshes(&self) -> Vec<ZoneFilter> {
        self.refreshes.lock().unwrap().clone()
    }

    fn open(
        &self,
        filter: ZoneFilter,
        cancel: &CancelToken,
    ) -> Result<ResultStream<Item>, SourceError> {
        if self.fail_open.lock().unwrap().contains(&filter) {
            return Err(SourceError::backend("cannot connect"));
        }
        let (gate, rx) = mpsc::channel();
        let opened = OpenedStream {
            filter,
            gate,
            cancel: cancel.clone(),
        };
        let _ = self.opened.lock().unwrap().send(opened);
        Ok(Box::new(GatedStream {
            rx,
            cancel: cancel.clone(),
        }))
    }

    fn record_refresh(&self, filter: ZoneFilter) -> Result<(), SourceError> {
        self.refreshes.lock().unwrap().push(filter);
        if self.fail_refresh {
            Err(SourceError::backend("refresh failed"))
        } else {
            Ok(())
        }
    }
}

impl DataSource for ScriptedSource {
    type Item = Item;

    fn stream_all(&self, cancel: &CancelToken) -> Result<ResultStream<Item>, SourceError> {
        self.open(ZoneFilter::All, cancel)
    }

    fn stream_filtered(
        &self,
        zone: ZoneId,
        cancel: &CancelToken,
    ) -> Result<ResultStream<Item>, SourceError> {
        self.open(ZoneFilter::Zone(zone), cancel)
    }

    fn refresh_cache_all(&self, _cancel: &CancelToken) -> Result<(), SourceError> {
        self.record_refresh(ZoneFilter::All)
    }

    fn refresh_cache_filtered(&self, zone: ZoneId, _cancel: &CancelToken) -> Result<(), SourceError> {
        self.record_refresh(ZoneFilter::Zone(zone))
    }
}

/// Stream fed by a test gate; ends on gate drop or cancellation.
struct GatedStream {
    rx: mpsc::Receiver<Result<Vec<Item>, SourceError>>,
    cancel: CancelToken,
}

impl Iterator for GatedStream {
    type Item = Result<Vec<Item>, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.cancel.is_cancelled() {
                return None;
            }
            match self.rx.recv_timeout(Duration::from_millis(10)) {
                Ok(item) => return Some(item),
                Err(mpsc::RecvTimeoutError::Timeout) => continue,
                Err(mpsc::RecvTimeoutError::Disconnected) => return None,
            }
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

pub fn zone(id: u32) -> ZoneFilter {
    ZoneFilter::Zone(ZoneId::new(id).unwrap())
}

/// Next stream opened by the controller.
pub fn next_stream(opened: &mpsc::Receiver<OpenedStream>) -> OpenedStream {
    opened
        .recv_timeout(WAIT)
        .expect("controller did not open a stream")
}

/// Apply worker output until `loading` drops or `WAIT` elapses.
pub fn settle<S: DataSource>(controller: &mut FilterController<S>) {
    let deadline = Instant::now() + WAIT;
    while controller.loading().get() && Instant::now() < deadline {
        controller.wait(Duration::from_millis(20));
    }
}

/// Poll `condition` until it holds or `WAIT` elapses.
pub fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// Next stream opened for `filter`, skipping (and ending) any other.
pub fn stream_for(opened: &mpsc::Receiver<OpenedStream>, filter: ZoneFilter) -> OpenedStream {
    loop {
        let stream = next_stream(opened);
        if stream.filter == filter {
            return stream;
        }
    }
}
