//! Record-kind discriminator catalogue
//!
//! Every telemetry record starts with a kind byte selecting how its body is
//! decoded. The catalogue is known to be incomplete, so any byte without a
//! name maps to [`RecordKind::Other`] and round-trips unchanged.

use serde::{Deserialize, Serialize};

/// First record kind carrying a BTM telegram fragment (ordinal 1).
pub const BTM_TELEGRAM_FIRST: u8 = 43;
/// Last record kind carrying a BTM telegram fragment (ordinal 5).
pub const BTM_TELEGRAM_LAST: u8 = 47;

/// How a record body is routed by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Body is an MMI sub-packet selected by `body[0]`.
    Mmi,
    /// Body is a single status byte.
    Status,
    /// Body is a BTM fragment for the given ordinal (1..=5).
    Btm(u8),
    /// Body is a single button code.
    Button,
    /// Train position and speed recorded when the ATP goes down.
    AtpDown,
    /// VDX telemetry with no defined structure.
    Unclassified,
    /// Anything else: the raw body is preserved.
    Unknown,
}

/// Record kind byte found at offset 0 of every record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Atp,
    StatusAtp,
    StatusMmi,
    Mmi,
    VdxInStatus1,
    VdxOut1,
    VdxOut2,
    VdxOut3,
    DxInStatus1,
    DxStatus1,
    OutStatus1,
    BtmCommand1,
    BtmStatus1,
    /// BTM telegram fragment, carrying its ordinal 1..=5.
    BtmTelegram(u8),
    Sdu1,
    Sdu2,
    OdoConfig1,
    OdoMessage1,
    OdoMessage2,
    OdoBtmStatus1,
    PmLogTelegram,
    PmAppLogTelegram,
    PrsInfo,
    AtpDown,
    PeriodicSpeedDistance,
    ButtonEvent,
    StatusCounterBoard,
    StatusUsb,
    StatusPrs,
    StatusSpeedmeter,
    StatusDataDownload,
    StatusMvb,
    StatusGpp,
    Other(u8),
}

impl From<u8> for RecordKind {
    fn from(code: u8) -> Self {
        match code {
            1 => RecordKind::Atp,
            2 => RecordKind::StatusAtp,
            3 => RecordKind::StatusMmi,
            4 => RecordKind::Mmi,
            21 => RecordKind::VdxInStatus1,
            22 => RecordKind::VdxOut1,
            23 => RecordKind::VdxOut2,
            24 => RecordKind::VdxOut3,
            31 => RecordKind::DxInStatus1,
            32 => RecordKind::DxStatus1,
            33 => RecordKind::OutStatus1,
            41 => RecordKind::BtmCommand1,
            42 => RecordKind::BtmStatus1,
            BTM_TELEGRAM_FIRST..=BTM_TELEGRAM_LAST => {
                RecordKind::BtmTelegram(code - BTM_TELEGRAM_FIRST + 1)
            }
            51 => RecordKind::Sdu1,
            52 => RecordKind::Sdu2,
            61 => RecordKind::OdoConfig1,
            62 => RecordKind::OdoMessage1,
            63 => RecordKind::OdoMessage2,
            64 => RecordKind::OdoBtmStatus1,
            71 => RecordKind::PmLogTelegram,
            72 => RecordKind::PmAppLogTelegram,
            91 => RecordKind::PrsInfo,
            201 => RecordKind::AtpDown,
            211 => RecordKind::PeriodicSpeedDistance,
            216 => RecordKind::ButtonEvent,
            221 => RecordKind::StatusCounterBoard,
            222 => RecordKind::StatusUsb,
            223 => RecordKind::StatusPrs,
            224 => RecordKind::StatusSpeedmeter,
            225 => RecordKind::StatusDataDownload,
            227 => RecordKind::StatusMvb,
            228 => RecordKind::StatusGpp,
            other => RecordKind::Other(other),
        }
    }
}

impl From<RecordKind> for u8 {
    fn from(kind: RecordKind) -> Self {
        match kind {
            RecordKind::Atp => 1,
            RecordKind::StatusAtp => 2,
            RecordKind::StatusMmi => 3,
            RecordKind::Mmi => 4,
            RecordKind::VdxInStatus1 => 21,
            RecordKind::VdxOut1 => 22,
            RecordKind::VdxOut2 => 23,
            RecordKind::VdxOut3 => 24,
            RecordKind::DxInStatus1 => 31,
            RecordKind::DxStatus1 => 32,
            RecordKind::OutStatus1 => 33,
            RecordKind::BtmCommand1 => 41,
            RecordKind::BtmStatus1 => 42,
            RecordKind::BtmTelegram(ordinal) => (BTM_TELEGRAM_FIRST - 1).wrapping_add(ordinal),
            RecordKind::Sdu1 => 51,
            RecordKind::Sdu2 => 52,
            RecordKind::OdoConfig1 => 61,
            RecordKind::OdoMessage1 => 62,
            RecordKind::OdoMessage2 => 63,
            RecordKind::OdoBtmStatus1 => 64,
            RecordKind::PmLogTelegram => 71,
            RecordKind::PmAppLogTelegram => 72,
            RecordKind::PrsInfo => 91,
            RecordKind::AtpDown => 201,
            RecordKind::PeriodicSpeedDistance => 211,
            RecordKind::ButtonEvent => 216,
            RecordKind::StatusCounterBoard => 221,
            RecordKind::StatusUsb => 222,
            RecordKind::StatusPrs => 223,
            RecordKind::StatusSpeedmeter => 224,
            RecordKind::StatusDataDownload => 225,
            RecordKind::StatusMvb => 227,
            RecordKind::StatusGpp => 228,
            RecordKind::Other(code) => code,
        }
    }
}

impl RecordKind {
    /// Dispatcher routing for this kind.
    pub fn route(self) -> Route {
        match self {
            RecordKind::Atp | RecordKind::Mmi => Route::Mmi,
            RecordKind::StatusAtp
            | RecordKind::StatusMmi
            | RecordKind::StatusCounterBoard
            | RecordKind::StatusUsb
            | RecordKind::StatusPrs
            | RecordKind::StatusSpeedmeter
            | RecordKind::StatusDataDownload
            | RecordKind::StatusMvb
            | RecordKind::StatusGpp => Route::Status,
            RecordKind::BtmTelegram(ordinal) => Route::Btm(ordinal),
            RecordKind::ButtonEvent => Route::Button,
            RecordKind::AtpDown => Route::AtpDown,
            RecordKind::VdxInStatus1
            | RecordKind::VdxOut1
            | RecordKind::VdxOut2
            | RecordKind::VdxOut3 => Route::Unclassified,
            _ => Route::Unknown,
        }
    }

    /// Legacy name of the record kind, `None` for uncatalogued bytes.
    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            RecordKind::Atp => "ATP",
            RecordKind::StatusAtp => "STATUS ATP",
            RecordKind::StatusMmi => "STATUS MMI",
            RecordKind::Mmi => "MMI",
            RecordKind::VdxInStatus1 => "MVB_LOG_TYPE_VDX_IN_STATUS_1",
            RecordKind::VdxOut1 => "MVB_LOG_TYPE_VDX_OUT_1",
            RecordKind::VdxOut2 => "MVB_LOG_TYPE_VDX_OUT_2",
            RecordKind::VdxOut3 => "MVB_LOG_TYPE_VDX_OUT_3",
            RecordKind::DxInStatus1 => "MVB_LOG_TYPE_DX_IN_STATUS_1",
            RecordKind::DxStatus1 => "MVB_LOG_TYPE_DX_STATUS_1",
            RecordKind::OutStatus1 => "MVB_LOG_TYPE_OUT_STATUS_1",
            RecordKind::BtmCommand1 => "MVB_LOG_BTM_COMMAND_1",
            RecordKind::BtmStatus1 => "MVB_LOG_BTM_STATUS_1",
            RecordKind::BtmTelegram(1) => "MVB_LOG_BTM_TGM_1",
            RecordKind::BtmTelegram(2) => "MVB_LOG_BTM_TGM_2",
            RecordKind::BtmTelegram(3) => "MVB_LOG_BTM_TGM_3",
            RecordKind::BtmTelegram(4) => "MVB_LOG_BTM_TGM_4",
            RecordKind::BtmTelegram(_) => "MVB_LOG_BTM_TGM_5",
            RecordKind::Sdu1 => "MVB_LOG_SDU1",
            RecordKind::Sdu2 => "MVB_LOG_SDU2",
            RecordKind::OdoConfig1 => "MVB_LOG_ODO_CONFIG_1",
            RecordKind::OdoMessage1 => "MVB_LOG_ODO_MESSAGE_1",
            RecordKind::OdoMessage2 => "MVB_LOG_ODO_MESSAGE_2",
            RecordKind::OdoBtmStatus1 => "MVB_LOG_ODO_BTM_STATUS_1",
            RecordKind::PmLogTelegram => "MVB_LOG_PM_LOG_TGM",
            RecordKind::PmAppLogTelegram => "MVB_LOG_PM_APP_LOG_TGM",
            RecordKind::PrsInfo => "PRS INFO",
            RecordKind::AtpDown => "ATP DOWN",
            RecordKind::PeriodicSpeedDistance => "PERIODIC_SPEED_DISTANCE",
            RecordKind::ButtonEvent => "MVB LOG TYPE BUTTON EVENT",
            RecordKind::StatusCounterBoard => "STATUS COUNTER BOARD",
            RecordKind::StatusUsb => "STATUS USB",
            RecordKind::StatusPrs => "STATUS PRS",
            RecordKind::StatusSpeedmeter => "STATUS SPEEDMETER",
            RecordKind::StatusDataDownload => "STATUS DATA DOWNLOAD",
            RecordKind::StatusMvb => "STATUS MVB",
            RecordKind::StatusGpp => "STATUS GPP",
            RecordKind::Other(_) => return None,
        };
        Some(name)
    }
}
