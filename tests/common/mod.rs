//! Record builders shared by the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

/// 2023-10-15 14:30:45
pub const TIMESTAMP: [u8; 6] = [0x17, 0x0A, 0x0F, 0x0E, 0x1E, 0x2D];

pub fn record(kind: u8, location: u32, speed: i16, body: &[u8]) -> Vec<u8> {
    let mut raw = vec![kind];
    raw.extend_from_slice(&TIMESTAMP);
    raw.extend_from_slice(&location.to_be_bytes());
    raw.extend_from_slice(&[0, 0]);
    raw.extend_from_slice(&speed.to_be_bytes());
    raw.push(u8::try_from(body.len()).expect("body fits in one length byte"));
    raw.extend_from_slice(body);
    raw
}

pub fn fragment(sequence: u8, ordinal: u8) -> Vec<u8> {
    let mut fragment = vec![sequence];
    fragment.extend((0..25u8).map(|i| ordinal.wrapping_mul(40).wrapping_add(i)));
    fragment
}

/// Telegram bytes expected from the five fragments built by [`fragment`].
pub fn telegram(sequence: u8) -> Vec<u8> {
    let mut telegram = fragment(sequence, 1)[22..26].to_vec();
    for ordinal in 2..=5 {
        telegram.extend_from_slice(&fragment(sequence, ordinal)[1..]);
    }
    telegram
}

pub fn mmi_dynamic(v_train: u16, o_train: u32) -> Vec<u8> {
    let mut body = vec![0u8; 30];
    body[0] = 1;
    body[3..5].copy_from_slice(&v_train.to_be_bytes());
    body[7..11].copy_from_slice(&o_train.to_be_bytes());
    body[25] = 0x50;
    body
}

/// A unique scratch path under the system temp directory.
pub fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("atp-decode-{}-{name}", std::process::id()))
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
