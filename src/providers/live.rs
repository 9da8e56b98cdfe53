//! Live record source fed by byte chunks
//!
//! A live feed delivers the record stream in arbitrary chunks: a chunk may
//! hold several records, or split one record (even its header) across chunk
//! boundaries. [`LiveSource`] buffers chunks from an mpsc channel and frames
//! records as soon as enough bytes are present.

use bytes::{Buf, BytesMut};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::config::{ErrorPolicy, ScanConfig};
use crate::error::{DecodeError, Error, Result};
use crate::file::{Scanned, ScannedRecord};
use crate::provider::RecordSource;
use crate::record::{HEADER_LEN, RECORD_PREFIX_LEN, RecordDispatcher, RecordHeader, frame_len};

/// Incremental framer over a multiplexed record stream.
///
/// Owns its own [`RecordDispatcher`], so BTM telegrams are reassembled per
/// stream. The file profile in the configuration is ignored: live feeds carry
/// record-profile frames.
pub struct LiveSource {
    chunks: mpsc::Receiver<Vec<u8>>,
    buffer: BytesMut,
    /// Stream offset of `buffer[0]`
    base_offset: usize,
    dispatcher: RecordDispatcher,
    config: ScanConfig,
    resyncs: usize,
    closed: bool,
    name: String,
}

impl LiveSource {
    pub fn new(chunks: mpsc::Receiver<Vec<u8>>, config: ScanConfig) -> Self {
        Self {
            chunks,
            buffer: BytesMut::with_capacity(4096),
            base_offset: 0,
            dispatcher: RecordDispatcher::new(),
            config,
            resyncs: 0,
            closed: false,
            name: "live".to_string(),
        }
    }

    /// Create a source together with the sender that feeds it.
    ///
    /// ```rust
    /// use atp_decode::config::ScanConfig;
    /// use atp_decode::providers::LiveSource;
    ///
    /// let (tx, source) = LiveSource::channel(64, ScanConfig::default());
    /// drop(tx);
    /// # let _ = source;
    /// ```
    pub fn channel(capacity: usize, config: ScanConfig) -> (mpsc::Sender<Vec<u8>>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::new(rx, config))
    }

    /// Label used in logs.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Resynchronisations performed so far.
    pub fn resyncs(&self) -> usize {
        self.resyncs
    }

    /// Bytes buffered but not yet framed.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn dispatcher(&self) -> &RecordDispatcher {
        &self.dispatcher
    }

    /// Try to frame one record from the buffer.
    ///
    /// `Ok(None)` means more bytes are needed.
    fn try_frame(&mut self) -> Result<Option<ScannedRecord>> {
        loop {
            if self.buffer.len() < HEADER_LEN {
                return Ok(None);
            }
            if let Err(error) = RecordHeader::parse(&self.buffer) {
                self.resync(error)?;
                continue;
            }

            let Some(total) = frame_len(&self.buffer) else {
                return Ok(None);
            };
            if self.buffer.len() < total {
                return Ok(None);
            }

            match self.dispatcher.decode(&self.buffer[..total]) {
                Ok(record) => {
                    let offset = self.base_offset;
                    self.consume(total);
                    trace!(source = %self.name, offset, "Framed live record");
                    return Ok(Some(ScannedRecord { offset, record }));
                }
                Err(error) => self.resync(error)?,
            }
        }
    }

    fn consume(&mut self, len: usize) {
        self.buffer.advance(len);
        self.base_offset += len;
    }

    /// Stop framing: nothing buffered or still queued is decoded afterwards.
    fn close(&mut self) {
        self.closed = true;
        self.base_offset += self.buffer.len();
        self.buffer.clear();
    }

    fn resync(&mut self, error: DecodeError) -> Result<()> {
        let offset = self.base_offset;
        if self.config.on_error == ErrorPolicy::Abort {
            warn!(source = %self.name, offset, error = %error, "Aborting live stream");
            self.close();
            return Err(error.into());
        }

        self.resyncs += 1;
        if let Some(limit) = self.config.max_errors {
            if self.resyncs > limit {
                self.close();
                return Err(Error::TooManyErrors { limit, offset });
            }
        }

        debug!(source = %self.name, offset, error = %error, "Resynchronising live stream");
        self.consume(1);
        Ok(())
    }

    /// Handle bytes left over once the sender is gone.
    fn finish(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let available = self.buffer.len();
        let needed = frame_len(&self.buffer).unwrap_or(RECORD_PREFIX_LEN);
        self.consume(available);

        match self.config.on_error {
            ErrorPolicy::Resync => {
                warn!(source = %self.name, available, "Live stream closed mid-record");
                Ok(())
            }
            ErrorPolicy::Abort => {
                Err(DecodeError::truncated("trailing record", needed, available).into())
            }
        }
    }
}

#[async_trait::async_trait]
impl RecordSource for LiveSource {
    async fn next_record(&mut self) -> Result<Option<Scanned>> {
        loop {
            if let Some(record) = self.try_frame()? {
                return Ok(Some(Scanned::Record(record)));
            }
            if self.closed {
                self.finish()?;
                return Ok(None);
            }

            match self.chunks.recv().await {
                Some(chunk) => {
                    trace!(source = %self.name, bytes = chunk.len(), "Received chunk");
                    self.buffer.extend_from_slice(&chunk);
                }
                None => {
                    info!(source = %self.name, offset = self.base_offset, "Live stream closed");
                    self.closed = true;
                }
            }
        }
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Payload;
    use crate::test_utils::{btm_records, expected_telegram, record, sample_record_file};

    async fn drain(source: &mut LiveSource) -> Vec<ScannedRecord> {
        let mut records = Vec::new();
        while let Some(item) = source.next_record().await.unwrap() {
            match item {
                Scanned::Record(record) => records.push(record),
                Scanned::Mmi(_) => panic!("live sources only frame records"),
            }
        }
        records
    }

    #[tokio::test]
    async fn frames_records_split_across_chunks() {
        let file = sample_record_file();
        let (tx, mut source) = LiveSource::channel(64, ScanConfig::default());
        for chunk in file.chunks(7) {
            tx.send(chunk.to_vec()).await.unwrap();
        }
        drop(tx);

        let records = drain(&mut source).await;
        assert_eq!(records.len(), 8);
        assert_eq!(records[1].offset, 17);
        assert_eq!(source.resyncs(), 0);
        assert_eq!(source.buffered(), 0);
    }

    #[tokio::test]
    async fn reassembles_btm_per_stream() {
        let (tx, mut source) = LiveSource::channel(8, ScanConfig::default());
        let records = btm_records(21);
        for index in [4usize, 0, 2, 1, 3] {
            tx.send(records[index].clone()).await.unwrap();
        }
        drop(tx);

        let decoded = drain(&mut source).await;
        let last = decoded.last().unwrap();
        let Payload::Telegram { telegram: Some(telegram), .. } = &last.record.payload else {
            panic!("expected completed telegram, got {:?}", last.record.payload);
        };
        assert_eq!(telegram.data, expected_telegram(21));
    }

    #[tokio::test]
    async fn resyncs_past_noise() {
        let (tx, mut source) = LiveSource::channel(8, ScanConfig::default());
        let mut bytes = vec![0xFF, 0x00];
        bytes.extend(record(216, &[4]));
        tx.send(bytes).await.unwrap();
        drop(tx);

        let records = drain(&mut source).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].offset, 2);
        assert_eq!(source.resyncs(), 2);
    }

    #[tokio::test]
    async fn resyncs_through_large_noise_chunk() {
        let (tx, mut source) = LiveSource::channel(4, ScanConfig::default());
        let mut bytes = vec![0xFF; 200_000];
        bytes.extend(record(216, &[9]));
        tx.send(bytes).await.unwrap();
        drop(tx);

        let records = tokio::time::timeout(std::time::Duration::from_secs(10), drain(&mut source))
            .await
            .expect("noise is skipped in linear time");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].offset, 200_000);
        assert_eq!(records[0].record.payload, Payload::Button(9));
        assert_eq!(source.resyncs(), 200_000);
        assert_eq!(source.buffered(), 0);
    }

    #[tokio::test]
    async fn abort_policy_stops_at_first_error() {
        let config = ScanConfig::default().with_policy(ErrorPolicy::Abort);
        let (tx, mut source) = LiveSource::channel(8, config);
        let mut bytes = record(216, &[1]);
        bytes.push(0xFF);
        bytes.extend(record(216, &[2]));
        tx.send(bytes).await.unwrap();
        tx.send(record(216, &[3])).await.unwrap();

        assert!(matches!(source.next_record().await.unwrap(), Some(Scanned::Record(_))));
        let err = source.next_record().await.unwrap_err();
        assert!(matches!(err, Error::Decode(DecodeError::InvalidTimestamp { .. })));
        assert!(source.next_record().await.unwrap().is_none());
        assert_eq!(source.buffered(), 0);
        assert_eq!(source.resyncs(), 0);
        drop(tx);
    }

    #[tokio::test]
    async fn abort_policy_reports_partial_tail() {
        let config = ScanConfig::default().with_policy(ErrorPolicy::Abort);
        let (tx, mut source) = LiveSource::channel(8, config);
        let raw = record(216, &[4, 5]);
        tx.send(raw[..10].to_vec()).await.unwrap();
        drop(tx);

        let err = source.next_record().await.unwrap_err();
        assert!(matches!(err, Error::Decode(DecodeError::Truncated { available: 10, .. })));
        assert!(source.next_record().await.unwrap().is_none());
    }
}
