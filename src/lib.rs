//! Bit-exact decoder for ATP onboard recorder telemetry.
//!
//! Decodes the binary records written by an Automatic Train Protection
//! recorder: record headers, MMI sub-packets, and balise telegrams rebuilt
//! from BTM fragments. Field offsets, signedness and the legacy position
//! wraparound correction match the legacy decoder output exactly.
//!
//! # Layers
//!
//! - **Decoding core** ([`bytes`], [`record`], [`mmi`], [`btm`]): pure,
//!   synchronous, no I/O. [`RecordDispatcher`] is the entry point.
//! - **File scanning** ([`file`], [`config`]): record files and
//!   header-prefixed MMI files, with a resync or abort error policy.
//! - **Async feeds** ([`provider`], [`providers`], [`driver`]): file replay
//!   and chunked live streams forwarded over a channel.
//!
//! ## Example (decoding one record)
//!
//! ```rust
//! use atp_decode::{Payload, RecordDispatcher};
//!
//! let mut raw = vec![0x02, 0x17, 0x0A, 0x0F, 0x0E, 0x1E, 0x2D, 0x00, 0x00, 0x03, 0xE8];
//! raw.extend_from_slice(&[0x00, 0x00, 0x00, 0x78]);
//! raw.extend_from_slice(&[0x01, 0x05]);
//!
//! let mut dispatcher = RecordDispatcher::new();
//! let record = dispatcher.decode(&raw)?;
//! assert_eq!(record.header.location, 1000);
//! assert_eq!(record.payload, Payload::Status(5));
//! assert_eq!(record.description(), "STATUS ATP");
//! # Ok::<(), atp_decode::DecodeError>(())
//! ```
//!
//! ## Example (file replay)
//!
//! ```rust,no_run
//! use atp_decode::{DecodeEvent, ScanConfig, Telemetry};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> atp_decode::Result<()> {
//!     let channels = Telemetry::open("ru_20240315.dat", ScanConfig::default()).await?;
//!     let mut events = channels.into_stream();
//!
//!     while let Some(event) = events.next().await {
//!         match event {
//!             DecodeEvent::Record(item) => {
//!                 println!("{:>8} {}", item.offset(), item.description())
//!             }
//!             DecodeEvent::Error(e) => eprintln!("{e}"),
//!         }
//!     }
//!     Ok(())
//! }
//! ```

// Decoding core
pub mod btm;
pub mod bytes;
mod error;
pub mod mmi;
pub mod record;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Scanning and configuration
pub mod config;
pub mod file;
pub mod stations;

// Stream-based feed architecture
pub mod driver;
pub mod provider;
pub mod providers;

// Core exports
pub use btm::BtmReassembler;
pub use error::*;
pub use mmi::{MmiDynamic, MmiPacket, MmiStatus};
pub use record::{
    DecodedRecord, HeaderProfile, MmiFileHeader, Payload, RecordDispatcher, RecordHeader,
};
pub use types::*;

// Scanning exports
pub use config::{ErrorPolicy, FileProfile, ScanConfig};
pub use file::{FileReader, MmiFileReader, RecordFileReader, Scanned, ScannedMmi, ScannedRecord};
pub use stations::StationTable;

// Feed exports
pub use driver::{DecodeEvent, Driver, DriverChannels};
pub use provider::RecordSource;
pub use providers::{FileSource, LiveSource};

/// Unified entry point for asynchronous telemetry feeds.
///
/// Both constructors spawn a [`Driver`] task and return its channels.
pub struct Telemetry;

impl Telemetry {
    /// Replay a recorded file.
    ///
    /// The file family (record or MMI) comes from `config.profile`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::File`] if the file cannot be read.
    pub async fn open<P: AsRef<std::path::Path>>(
        path: P,
        config: ScanConfig,
    ) -> Result<DriverChannels> {
        let source = FileSource::open(path, config).await?;
        Ok(Driver::spawn(source))
    }

    /// Decode a live stream delivered as byte chunks.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// ```rust
    /// use atp_decode::{ScanConfig, Telemetry};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let (tx, rx) = tokio::sync::mpsc::channel(64);
    /// let channels = Telemetry::live(rx, ScanConfig::default());
    /// drop(tx);
    /// # let _ = channels;
    /// # }
    /// ```
    pub fn live(
        chunks: tokio::sync::mpsc::Receiver<Vec<u8>>,
        config: ScanConfig,
    ) -> DriverChannels {
        Driver::spawn(LiveSource::new(chunks, config))
    }
}
