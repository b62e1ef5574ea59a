// ZoneLoader - app/memory_source.rs
//
// In-memory `DataSource` over a fixed device catalog, used by the console
// binary. Every stream emits one snapshot after a simulated latency and then
// ends. Zones listed as failing produce "network error" for both streams
// and cache refreshes. Unknown zones stream an empty list but cannot be
// refreshed.

use crate::core::cancel::CancelToken;
use crate::core::model::{Device, ZoneId};
use crate::core::source::{DataSource, ResultStream};
use crate::util::constants::SIMULATED_FAILURE_MESSAGE;
use crate::util::error::SourceError;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Built-in sample catalog: (id, zone, name).
const SAMPLE_DEVICES: &[(u64, u32, &str)] = &[
    (1, 1, "Lobby thermostat"),
    (2, 1, "Lobby door sensor"),
    (3, 2, "Server room humidity"),
    (4, 2, "Server room smoke detector"),
    (5, 2, "Rack PDU"),
    (6, 3, "Kitchen motion sensor"),
    (7, 4, "Garage door controller"),
    (8, 4, "Garage CO2 sensor"),
];

pub struct MemorySource {
    devices: Vec<Device>,
    latency: Duration,
    failing_zones: HashSet<ZoneId>,
    streams_opened: AtomicU64,
    refreshes: AtomicU64,
}

impl MemorySource {
    pub fn new(devices: Vec<Device>, latency: Duration) -> Self {
        Self {
            devices,
            latency,
            failing_zones: HashSet::new(),
            streams_opened: AtomicU64::new(0),
            refreshes: AtomicU64::new(0),
        }
    }

    /// Source over the built-in sample catalog.
    pub fn sample(latency: Duration) -> Self {
        let devices = SAMPLE_DEVICES
            .iter()
            .filter_map(|&(id, zone, name)| {
                Some(Device {
                    id,
                    zone: ZoneId::new(zone).ok()?,
                    name: name.to_string(),
                })
            })
            .collect();
        Self::new(devices, latency)
    }

    /// Make every request for these zones fail.
    pub fn with_failing_zones(mut self, zones: impl IntoIterator<Item = ZoneId>) -> Self {
        self.failing_zones.extend(zones);
        self
    }

    pub fn streams_opened(&self) -> u64 {
        self.streams_opened.load(Ordering::SeqCst)
    }

    pub fn refreshes(&self) -> u64 {
        self.refreshes.load(Ordering::SeqCst)
    }

    fn snapshot_stream(
        &self,
        outcome: Result<Vec<Device>, SourceError>,
        cancel: &CancelToken,
    ) -> ResultStream<Device> {
        self.streams_opened.fetch_add(1, Ordering::SeqCst);
        let latency = self.latency;
        let cancel = cancel.clone();
        Box::new(std::iter::once_with(move || {
            if !cancel.sleep(latency) {
                return Err(SourceError::Cancelled);
            }
            outcome
        }))
    }

    fn simulate_refresh(&self, zone: Option<ZoneId>, cancel: &CancelToken) -> Result<(), SourceError> {
        if !cancel.sleep(self.latency) {
            return Err(SourceError::Cancelled);
        }
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        match zone {
            Some(zone) if self.failing_zones.contains(&zone) => {
                Err(SourceError::backend(SIMULATED_FAILURE_MESSAGE))
            }
            Some(zone) if !self.devices.iter().any(|d| d.zone == zone) => {
                Err(SourceError::ZoneNotFound { zone: zone.get() })
            }
            _ => Ok(()),
        }
    }
}

impl DataSource for MemorySource {
    type Item = Device;

    fn stream_all(&self, cancel: &CancelToken) -> Result<ResultStream<Device>, SourceError> {
        Ok(self.snapshot_stream(Ok(self.devices.clone()), cancel))
    }

    fn stream_filtered(
        &self,
        zone: ZoneId,
        cancel: &CancelToken,
    ) -> Result<ResultStream<Device>, SourceError> {
        let outcome = if self.failing_zones.contains(&zone) {
            Err(SourceError::backend(SIMULATED_FAILURE_MESSAGE))
        } else {
            Ok(self
                .devices
                .iter()
                .filter(|d| d.zone == zone)
                .cloned()
                .collect())
        };
        Ok(self.snapshot_stream(outcome, cancel))
    }

    fn refresh_cache_all(&self, cancel: &CancelToken) -> Result<(), SourceError> {
        self.simulate_refresh(None, cancel)
    }

    fn refresh_cache_filtered(&self, zone: ZoneId, cancel: &CancelToken) -> Result<(), SourceError> {
        self.simulate_refresh(Some(zone), cancel)
    }
}
