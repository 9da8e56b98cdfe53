//! Reassembled balise telegram

use serde::{Serialize, Serializer};

/// Length of a complete balise telegram in bytes.
pub const TELEGRAM_LEN: usize = 104;

/// A complete 104-byte balise telegram rebuilt from five BTM fragments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Telegram {
    /// Sequence number shared by the five fragments
    pub sequence: u8,
    /// Telegram bytes in wire order
    #[serde(serialize_with = "serialize_telegram_bytes")]
    pub data: [u8; TELEGRAM_LEN],
}

impl Telegram {
    /// Telegram bytes as a slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

fn serialize_telegram_bytes<S: Serializer>(
    data: &[u8; TELEGRAM_LEN],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(data.iter())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_byte_sequence() {
        let telegram = Telegram { sequence: 7, data: [0xAB; TELEGRAM_LEN] };
        let json = serde_json::to_value(&telegram).expect("telegram serializes");
        assert_eq!(json["sequence"], 7);
        let bytes = json["data"].as_array().expect("data is a sequence");
        assert_eq!(bytes.len(), TELEGRAM_LEN);
        assert!(bytes.iter().all(|b| b == 0xAB));
    }
}
