//! MMI sub-packet tags

use serde::{Deserialize, Serialize};

/// Known MMI sub-packet tags, read from `body[0]` of ATP/MMI records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MmiPacketType {
    StartAtp,
    Dynamic,
    Status,
    SetTimeAtp,
    TrackDescription,
    GeoPosition,
    CurrentTrainData,
    ForcedDriverRequest,
    DriverMessage,
    FailureReportAtp,
    EchoedTrainData,
    CurrentSrRules,
    EchoedSrRules,
    CurrentDriverData,
    TestRequest,
    SelectStmRequest,
    RuData,
}

impl MmiPacketType {
    /// Look up a tag byte; `None` for tags outside the known catalogue.
    pub fn from_tag(tag: u8) -> Option<Self> {
        let packet_type = match tag {
            0 => MmiPacketType::StartAtp,
            1 => MmiPacketType::Dynamic,
            2 => MmiPacketType::Status,
            3 => MmiPacketType::SetTimeAtp,
            4 => MmiPacketType::TrackDescription,
            5 => MmiPacketType::GeoPosition,
            6 => MmiPacketType::CurrentTrainData,
            7 => MmiPacketType::ForcedDriverRequest,
            8 => MmiPacketType::DriverMessage,
            9 => MmiPacketType::FailureReportAtp,
            10 => MmiPacketType::EchoedTrainData,
            11 => MmiPacketType::CurrentSrRules,
            12 => MmiPacketType::EchoedSrRules,
            14 => MmiPacketType::CurrentDriverData,
            15 => MmiPacketType::TestRequest,
            16 => MmiPacketType::SelectStmRequest,
            19 => MmiPacketType::RuData,
            _ => return None,
        };
        Some(packet_type)
    }

    /// Tag byte on the wire.
    pub fn tag(self) -> u8 {
        match self {
            MmiPacketType::StartAtp => 0,
            MmiPacketType::Dynamic => 1,
            MmiPacketType::Status => 2,
            MmiPacketType::SetTimeAtp => 3,
            MmiPacketType::TrackDescription => 4,
            MmiPacketType::GeoPosition => 5,
            MmiPacketType::CurrentTrainData => 6,
            MmiPacketType::ForcedDriverRequest => 7,
            MmiPacketType::DriverMessage => 8,
            MmiPacketType::FailureReportAtp => 9,
            MmiPacketType::EchoedTrainData => 10,
            MmiPacketType::CurrentSrRules => 11,
            MmiPacketType::EchoedSrRules => 12,
            MmiPacketType::CurrentDriverData => 14,
            MmiPacketType::TestRequest => 15,
            MmiPacketType::SelectStmRequest => 16,
            MmiPacketType::RuData => 19,
        }
    }

    /// Legacy packet name, e.g. `MMI_DYNAMIC`.
    pub fn name(self) -> &'static str {
        match self {
            MmiPacketType::StartAtp => "MMI_START_ATP",
            MmiPacketType::Dynamic => "MMI_DYNAMIC",
            MmiPacketType::Status => "MMI_STATUS",
            MmiPacketType::SetTimeAtp => "MMI_SET_TIME_ATP",
            MmiPacketType::TrackDescription => "MMI_TRACK_DESCRIPTION",
            MmiPacketType::GeoPosition => "MMI_GEO_POSITION",
            MmiPacketType::CurrentTrainData => "MMI_CURRENT_TRAIN_DATA",
            MmiPacketType::ForcedDriverRequest => "MMI_FORCED_DRIVER_REQUEST",
            MmiPacketType::DriverMessage => "MMI_DRIVER_MESSAGE",
            MmiPacketType::FailureReportAtp => "MMI_FAILURE_REPORT_ATP",
            MmiPacketType::EchoedTrainData => "MMI_ECHOED_TRAIN_DATA",
            MmiPacketType::CurrentSrRules => "MMI_CURRENT_SR_RULES",
            MmiPacketType::EchoedSrRules => "MMI_ECHOED_SR_RULES",
            MmiPacketType::CurrentDriverData => "MMI_CURRENT_DRIVER_DATA",
            MmiPacketType::TestRequest => "MMI_TEST_REQUEST",
            MmiPacketType::SelectStmRequest => "MMI_SELECT_STM_REQUEST",
            MmiPacketType::RuData => "MMI_RU_DATA",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for tag in 0..=u8::MAX {
            if let Some(packet_type) = MmiPacketType::from_tag(tag) {
                assert_eq!(packet_type.tag(), tag);
            }
        }
        assert_eq!(MmiPacketType::from_tag(13), None);
        assert_eq!(MmiPacketType::from_tag(1).map(MmiPacketType::name), Some("MMI_DYNAMIC"));
    }
}
