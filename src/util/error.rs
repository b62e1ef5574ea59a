// ZoneLoader - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors preserve the causal chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all ZoneLoader operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum ZoneLoaderError {
    /// The external data source failed.
    Source(SourceError),

    /// A filter value was rejected.
    Filter(FilterError),

    /// Configuration loading failed.
    Config(ConfigError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for ZoneLoaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(e) => write!(f, "Data source error: {e}"),
            Self::Filter(e) => write!(f, "Filter error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ZoneLoaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Source(e) => Some(e),
            Self::Filter(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Data source errors
// ---------------------------------------------------------------------------

/// Failures raised by a `DataSource` while opening or iterating a result
/// stream, or while priming its cache.
///
/// The `Display` output is what the controller shows to the user, so the
/// backend variant renders its message verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The backend reported a failure (network, storage, ...).
    Backend { message: String },

    /// The requested zone does not exist in the backend.
    ZoneNotFound { zone: u32 },

    /// The operation observed its cancel token and stopped.
    Cancelled,

    /// The derivation panicked; the payload text is preserved when available.
    Panicked { detail: String },
}

impl SourceError {
    /// Shorthand for a backend failure with the given message.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend { message } => f.write_str(message),
            Self::ZoneNotFound { zone } => write!(f, "zone {zone} not found"),
            Self::Cancelled => f.write_str("operation cancelled"),
            Self::Panicked { detail } => write!(f, "data loading crashed: {detail}"),
        }
    }
}

impl std::error::Error for SourceError {}

impl From<SourceError> for ZoneLoaderError {
    fn from(e: SourceError) -> Self {
        Self::Source(e)
    }
}

// ---------------------------------------------------------------------------
// Filter errors
// ---------------------------------------------------------------------------

/// Programmer-misuse errors for filter values. These fail fast at the call
/// site and are never routed through the user-visible message channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// Raw zone id outside the accepted range.
    InvalidZone { raw: i64 },

    /// The sentinel id was used where a concrete zone is required.
    SentinelAsZone,
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidZone { raw } => write!(
                f,
                "Invalid zone id {raw}: expected 0 (no filter) or 1-{}",
                u32::MAX
            ),
            Self::SentinelAsZone => write!(
                f,
                "Zone id {} means \"no filter\" and cannot name a zone",
                super::constants::SENTINEL_ZONE_ID
            ),
        }
    }
}

impl std::error::Error for FilterError {}

impl From<FilterError> for ZoneLoaderError {
    fn from(e: FilterError) -> Self {
        Self::Filter(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to loading `config.toml`.
#[derive(Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    Read { path: PathBuf, source: io::Error },

    /// The config file is not valid TOML or has the wrong shape.
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "Could not read config file '{}': {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "Failed to parse config file '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for ZoneLoaderError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
