//! Source trait for asynchronous record feeds

use crate::Result;
use crate::file::Scanned;

/// A feed of decoded records in stream order.
///
/// Sources own their own decoding state, including the BTM reassembler, so
/// each stream reassembles telegrams independently. Decode errors are handled
/// by the source's [`ErrorPolicy`](crate::config::ErrorPolicy); an `Err`
/// returned here is one the policy chose to surface.
#[async_trait::async_trait]
pub trait RecordSource: Send + 'static {
    /// Get the next decoded item
    ///
    /// Returns:
    /// - `Ok(Some(item))` - Next record in stream order
    /// - `Ok(None)` - Source exhausted (normal termination)
    /// - `Err(e)` - Decode or I/O failure
    async fn next_record(&mut self) -> Result<Option<Scanned>>;

    /// Short label for logs, e.g. the file path.
    fn describe(&self) -> String;
}
