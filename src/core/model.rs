// ZoneLoader - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no threads.
// These types are the shared vocabulary across all layers.

use crate::util::constants::SENTINEL_ZONE_ID;
use crate::util::error::{FilterError, SourceError};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Zone ids and filter values
// =============================================================================

/// A concrete, non-sentinel zone identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ZoneId(u32);

impl ZoneId {
    /// Create a zone id. Zero is reserved for "no filter" and is rejected.
    pub fn new(raw: u32) -> Result<Self, FilterError> {
        if i64::from(raw) == SENTINEL_ZONE_ID {
            return Err(FilterError::SentinelAsZone);
        }
        Ok(Self(raw))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for ZoneId {
    type Error = FilterError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<ZoneId> for u32 {
    fn from(zone: ZoneId) -> Self {
        zone.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The selection driving which data set is shown.
///
/// `All` is the sentinel meaning "no filter"; there is always exactly one
/// current value, never an absent one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneFilter {
    #[default]
    All,
    Zone(ZoneId),
}

impl ZoneFilter {
    /// Map a raw zone id to a filter value: `0` is the sentinel, any
    /// positive `u32` is a zone, everything else is rejected.
    pub fn from_raw(raw: i64) -> Result<Self, FilterError> {
        if raw == SENTINEL_ZONE_ID {
            return Ok(Self::All);
        }
        let id = u32::try_from(raw).map_err(|_| FilterError::InvalidZone { raw })?;
        Ok(Self::Zone(ZoneId::new(id)?))
    }

    /// Raw id of this value, with the sentinel mapped back to `0`.
    pub fn raw(self) -> i64 {
        match self {
            Self::All => SENTINEL_ZONE_ID,
            Self::Zone(zone) => i64::from(zone.get()),
        }
    }

    /// Returns true unless this is the sentinel.
    pub fn is_filtered(self) -> bool {
        self != Self::All
    }

    pub fn zone(self) -> Option<ZoneId> {
        match self {
            Self::All => None,
            Self::Zone(zone) => Some(zone),
        }
    }
}

impl From<ZoneId> for ZoneFilter {
    fn from(zone: ZoneId) -> Self {
        Self::Zone(zone)
    }
}

impl fmt::Display for ZoneFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all zones"),
            Self::Zone(zone) => write!(f, "zone {zone}"),
        }
    }
}

// =============================================================================
// Generations
// =============================================================================

/// Monotonic tag identifying which filter-change epoch a piece of
/// asynchronous work belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    /// The generation before any derivation has been dispatched.
    pub const NONE: Generation = Generation(0);

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Derivation events (worker thread -> controller)
// =============================================================================

/// Messages sent by a derivation worker back to the controller thread.
/// Every message carries the generation it was dispatched under.
#[derive(Debug, Clone, PartialEq)]
pub enum DerivationEvent<T> {
    /// The stream produced a result list.
    Emitted { generation: Generation, items: Vec<T> },

    /// Opening or iterating the stream failed. Terminal for the generation.
    Failed {
        generation: Generation,
        error: SourceError,
    },

    /// The stream ended normally. Terminal for the generation.
    Completed { generation: Generation },
}

impl<T> DerivationEvent<T> {
    pub fn generation(&self) -> Generation {
        match self {
            Self::Emitted { generation, .. }
            | Self::Failed { generation, .. }
            | Self::Completed { generation } => *generation,
        }
    }
}

// =============================================================================
// Observed state
// =============================================================================

/// Point-in-time copy of everything the controller exposes to observers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerSnapshot<T> {
    /// Current filter value.
    pub filter: ZoneFilter,

    /// Generation of the most recently dispatched derivation.
    pub generation: Generation,

    /// Whether the current derivation has not settled yet.
    pub loading: bool,

    /// Unacknowledged error message, if any.
    pub message: Option<String>,

    /// Last successfully derived result list.
    pub results: Vec<T>,
}

// =============================================================================
// Demo item
// =============================================================================

/// A device registered in a zone. The item type served by the in-memory
/// demo source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: u64,
    pub zone: ZoneId,
    pub name: String,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} (zone {})", self.id, self.name, self.zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_maps_zero_to_sentinel() {
        assert_eq!(ZoneFilter::from_raw(0), Ok(ZoneFilter::All));
        assert!(!ZoneFilter::All.is_filtered());
    }

    #[test]
    fn test_from_raw_accepts_positive_zone() {
        let filter = ZoneFilter::from_raw(7).unwrap();
        assert!(filter.is_filtered());
        assert_eq!(filter.zone().map(ZoneId::get), Some(7));
        assert_eq!(filter.raw(), 7);
    }

    #[test]
    fn test_from_raw_rejects_out_of_range() {
        assert_eq!(
            ZoneFilter::from_raw(-1),
            Err(FilterError::InvalidZone { raw: -1 })
        );
        let too_big = i64::from(u32::MAX) + 1;
        assert_eq!(
            ZoneFilter::from_raw(too_big),
            Err(FilterError::InvalidZone { raw: too_big })
        );
    }

    #[test]
    fn test_zone_id_rejects_sentinel() {
        assert_eq!(ZoneId::new(0), Err(FilterError::SentinelAsZone));
    }

    #[test]
    fn test_zone_filter_serialises_readably() {
        let zone = ZoneFilter::Zone(ZoneId::new(3).unwrap());
        assert_eq!(serde_json::to_string(&zone).unwrap(), r#"{"zone":3}"#);
        assert_eq!(serde_json::to_string(&ZoneFilter::All).unwrap(), r#""all""#);
    }

    #[test]
    fn test_zone_id_deserialise_validates() {
        assert!(serde_json::from_str::<ZoneId>("0").is_err());
        assert_eq!(serde_json::from_str::<ZoneId>("5").unwrap().get(), 5);
    }

    #[test]
    fn test_generation_is_monotonic() {
        let first = Generation::NONE.next();
        assert!(first > Generation::NONE);
        assert!(first.next() > first);
        assert_eq!(first.to_string(), "#1");
    }
}
