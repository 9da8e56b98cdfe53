//! Core value types shared by the decoders.
//!
//! - [`RecordKind`] maps the record-kind byte to a named variant and its dispatch [`Route`]
//! - [`MmiPacketType`] names the MMI sub-packet tags
//! - [`Telegram`] holds a reassembled 104-byte balise telegram
//! - [`BitField`] unpacks the packed flag bytes found in MMI packets
//!
//! ## Usage Example
//!
//! ```rust
//! use atp_decode::types::{RecordKind, Route};
//!
//! let kind = RecordKind::from(45);
//! assert_eq!(kind, RecordKind::BtmTelegram(3));
//! assert_eq!(kind.route(), Route::Btm(3));
//! assert_eq!(u8::from(kind), 45);
//! ```

mod bitfield;
mod mmi_type;
mod record_kind;
mod telegram;

pub use bitfield::BitField;
pub use mmi_type::MmiPacketType;
pub use record_kind::{BTM_TELEGRAM_FIRST, BTM_TELEGRAM_LAST, RecordKind, Route};
pub use telegram::{TELEGRAM_LEN, Telegram};
