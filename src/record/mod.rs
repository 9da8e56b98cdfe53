//! Record headers and record-level dispatch.
//!
//! - [`RecordHeader`] / [`MmiFileHeader`] parse the two 15-byte header profiles
//! - [`RecordDispatcher`] decodes complete `header + length + body` records

mod dispatch;
mod header;

pub use dispatch::{DecodedRecord, Payload, RECORD_PREFIX_LEN, RecordDispatcher, frame_len};
pub use header::{HEADER_LEN, HeaderProfile, MmiFileHeader, RecordHeader};
