//! Driver spawns and manages record decoding tasks

use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::error::Error;
use crate::file::Scanned;
use crate::provider::RecordSource;

/// Default capacity of the event channel.
pub const DEFAULT_CAPACITY: usize = 256;

/// Consecutive source errors tolerated before the driver stops.
const MAX_CONSECUTIVE_ERRORS: u32 = 10;

/// One item forwarded from a source.
#[derive(Debug)]
pub enum DecodeEvent {
    Record(Scanned),
    /// A failure the source surfaced; the driver keeps going unless it is fatal.
    Error(Error),
}

/// Result of spawning a driver task
pub struct DriverChannels {
    /// Decoded records and errors, in source order
    pub events: mpsc::Receiver<DecodeEvent>,
    /// Cancellation token for graceful shutdown
    pub cancel: CancellationToken,
}

impl DriverChannels {
    /// Consume the channels as a [`Stream`] of events.
    ///
    /// The stream ends when the source is exhausted or the driver is cancelled.
    pub fn into_stream(self) -> impl Stream<Item = DecodeEvent> + Send + 'static {
        ReceiverStream::new(self.events)
    }

    /// Ask the driver task to stop after the current record.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

/// Driver spawns the task that owns a [`RecordSource`]
///
/// Records are pulled strictly in order so BTM reassembly inside the source
/// sees real arrival order.
pub struct Driver;

impl Driver {
    /// Spawn a driver task with the default channel capacity.
    pub fn spawn<S>(source: S) -> DriverChannels
    where
        S: RecordSource,
    {
        Self::spawn_with_capacity(source, DEFAULT_CAPACITY)
    }

    /// Spawn a driver task; `capacity` bounds the number of undelivered events.
    pub fn spawn_with_capacity<S>(source: S, capacity: usize) -> DriverChannels
    where
        S: RecordSource,
    {
        let (event_tx, event_rx) = mpsc::channel(capacity.max(1));
        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();

        tokio::spawn(async move {
            Self::reader_task(source, event_tx, cancel_task).await;
        });

        DriverChannels { events: event_rx, cancel }
    }

    async fn reader_task<S>(
        mut source: S,
        event_tx: mpsc::Sender<DecodeEvent>,
        cancel: CancellationToken,
    ) where
        S: RecordSource,
    {
        let label = source.describe();
        info!(source = %label, "Record reader task started");
        let mut record_count = 0u64;
        let mut error_count = 0u32;

        loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!(source = %label, "Record reader cancelled");
                    break;
                }
                result = source.next_record() => result,
            };

            match result {
                Ok(Some(item)) => {
                    record_count += 1;
                    error_count = 0;
                    trace!(source = %label, offset = item.offset(), "Record {}", record_count);

                    if event_tx.send(DecodeEvent::Record(item)).await.is_err() {
                        debug!("Event receiver dropped, shutting down");
                        break;
                    }
                }
                Ok(None) => {
                    info!(source = %label, "Source ended after {} records", record_count);
                    break;
                }
                Err(e) => {
                    error_count += 1;
                    let fatal = !e.is_recoverable();
                    warn!(
                        source = %label,
                        "Source error ({}/{}): {}",
                        error_count,
                        MAX_CONSECUTIVE_ERRORS,
                        e
                    );

                    if event_tx.send(DecodeEvent::Error(e)).await.is_err() {
                        debug!("Event receiver dropped, shutting down");
                        break;
                    }
                    if fatal || error_count >= MAX_CONSECUTIVE_ERRORS {
                        error!(source = %label, "Stopping after source error");
                        break;
                    }
                }
            }
        }

        info!(source = %label, "Record reader task ended (processed {} records)", record_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use crate::config::ScanConfig;
    use crate::error::DecodeError;
    use crate::providers::{FileSource, LiveSource};
    use crate::test_utils::sample_record_file;
    use futures::StreamExt;

    /// Source that fails a fixed number of times, then ends.
    struct FailingSource {
        failures: Vec<Error>,
    }

    #[async_trait::async_trait]
    impl RecordSource for FailingSource {
        async fn next_record(&mut self) -> Result<Option<Scanned>> {
            match self.failures.pop() {
                Some(error) => Err(error),
                None => Ok(None),
            }
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    #[tokio::test]
    async fn forwards_every_record_then_ends() {
        let source = FileSource::from_bytes(sample_record_file(), ScanConfig::default());
        let events: Vec<DecodeEvent> = Driver::spawn(source).into_stream().collect().await;
        assert_eq!(events.len(), 8);
        assert!(events.iter().all(|e| matches!(e, DecodeEvent::Record(_))));
    }

    #[tokio::test]
    async fn decode_errors_are_forwarded_and_scan_continues() {
        let source = FailingSource {
            failures: vec![
                DecodeError::InvalidOrdinal(9).into(),
                DecodeError::truncated("record body", 20, 3).into(),
            ],
        };
        let events: Vec<DecodeEvent> = Driver::spawn(source).into_stream().collect().await;
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| matches!(e, DecodeEvent::Error(Error::Decode(_)))));
    }

    #[tokio::test]
    async fn fatal_error_stops_driver() {
        let source = FailingSource {
            failures: vec![Error::SourceClosed, Error::TooManyErrors { limit: 1, offset: 4 }],
        };
        let events: Vec<DecodeEvent> = Driver::spawn(source).into_stream().collect().await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], DecodeEvent::Error(Error::TooManyErrors { .. })));
    }

    #[tokio::test]
    async fn cancellation_stops_idle_source() {
        let (tx, source) = LiveSource::channel(4, ScanConfig::default());
        let channels = Driver::spawn(source);
        channels.shutdown();
        let events: Vec<DecodeEvent> = channels.into_stream().collect().await;
        assert!(events.is_empty());
        drop(tx);
    }
}
