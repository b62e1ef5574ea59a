// ZoneLoader - core/source.rs
//
// Contract of the external data repository the controller drives.
// The controller only invokes a source; it never owns its storage.

use crate::core::cancel::CancelToken;
use crate::core::model::ZoneId;
use crate::util::error::SourceError;

/// A blocking sequence of result lists, consumed on a worker thread.
///
/// Each `next()` may block until the backend produces the next list. An
/// `Err` item is terminal; the worker stops iterating after it.
pub type ResultStream<T> = Box<dyn Iterator<Item = Result<Vec<T>, SourceError>> + Send>;

/// External data repository.
///
/// Every method runs on a worker thread and receives the cancel token of
/// the request. Implementations should stop producing output once the
/// token is cancelled; late output is discarded by the controller anyway.
///
/// Cache refresh failures are logged and otherwise ignored by the
/// controller: only failures of the result streams reach the user.
pub trait DataSource: Send + Sync + 'static {
    type Item: Clone + Send + 'static;

    /// Unfiltered stream, used for the sentinel filter.
    fn stream_all(&self, cancel: &CancelToken) -> Result<ResultStream<Self::Item>, SourceError>;

    /// Stream restricted to one zone.
    fn stream_filtered(
        &self,
        zone: ZoneId,
        cancel: &CancelToken,
    ) -> Result<ResultStream<Self::Item>, SourceError>;

    /// Best-effort priming of the unfiltered cache.
    fn refresh_cache_all(&self, cancel: &CancelToken) -> Result<(), SourceError>;

    /// Best-effort priming of one zone's cache.
    fn refresh_cache_filtered(&self, zone: ZoneId, cancel: &CancelToken)
        -> Result<(), SourceError>;
}
