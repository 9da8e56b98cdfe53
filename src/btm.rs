//! BTM balise telegram reassembly
//!
//! A balise telegram is 104 bytes long but arrives as five 26-byte fragments,
//! each `[sequence, payload; 25]`. The fragment's ordinal (1..=5) comes from
//! the record kind that carried it, not from the fragment bytes. Fragments for
//! the same sequence may arrive in any order and may be repeated.
//!
//! Ordinal 1 only contributes the last four bytes of its payload; ordinals
//! 2..=5 contribute all 25:
//!
//! | ordinal | payload bytes | telegram bytes |
//! |---|---|---|
//! | 1 | 21..25 | 0..4 |
//! | 2 | 0..25 | 4..29 |
//! | 3 | 0..25 | 29..54 |
//! | 4 | 0..25 | 54..79 |
//! | 5 | 0..25 | 79..104 |
//!
//! At most [`MAX_SLOTS`] telegrams are reassembled at once. A fragment for a
//! new sequence while every slot is taken is dropped without error, and no
//! slot is evicted. Stalled slots are only cleared by the caller through
//! [`BtmReassembler::discard`] or [`BtmReassembler::reset`].
//!
//! The reassembler is not synchronised. Give each stream its own instance, or
//! wrap a shared one in a mutex.

use std::time::SystemTime;

use tracing::{debug, trace};

use crate::error::DecodeError;
use crate::types::{TELEGRAM_LEN, Telegram};

/// Maximum number of telegrams reassembled concurrently.
pub const MAX_SLOTS: usize = 10;
/// Fragment length: one sequence byte plus the payload.
pub const FRAGMENT_LEN: usize = 1 + PAYLOAD_LEN;
/// Payload bytes carried by each fragment.
pub const PAYLOAD_LEN: usize = 25;
/// Number of fragments per telegram.
pub const FRAGMENTS_PER_TELEGRAM: usize = 5;

/// Where one ordinal's payload lands in the telegram.
struct Contribution {
    payload_start: usize,
    telegram_offset: usize,
}

const LAYOUT: [Contribution; FRAGMENTS_PER_TELEGRAM] = [
    Contribution { payload_start: 21, telegram_offset: 0 },
    Contribution { payload_start: 0, telegram_offset: 4 },
    Contribution { payload_start: 0, telegram_offset: 29 },
    Contribution { payload_start: 0, telegram_offset: 54 },
    Contribution { payload_start: 0, telegram_offset: 79 },
];

#[derive(Debug, Clone)]
struct Slot {
    sequence: u8,
    parts: [Option<[u8; PAYLOAD_LEN]>; FRAGMENTS_PER_TELEGRAM],
    first_seen: SystemTime,
}

impl Slot {
    fn new(sequence: u8) -> Self {
        Self { sequence, parts: [None; FRAGMENTS_PER_TELEGRAM], first_seen: SystemTime::now() }
    }

    fn received(&self) -> usize {
        self.parts.iter().filter(|part| part.is_some()).count()
    }

    /// Assemble the telegram once every ordinal is present.
    fn assemble(&self) -> Option<Telegram> {
        let mut data = [0u8; TELEGRAM_LEN];
        for (part, contribution) in self.parts.iter().zip(LAYOUT.iter()) {
            let payload = part.as_ref()?;
            let source = &payload[contribution.payload_start..];
            let offset = contribution.telegram_offset;
            data[offset..offset + source.len()].copy_from_slice(source);
        }
        Some(Telegram { sequence: self.sequence, data })
    }
}

/// Snapshot of an in-flight telegram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSlot {
    pub sequence: u8,
    /// Distinct ordinals received so far
    pub received: usize,
    /// Arrival time of the first fragment
    pub first_seen: SystemTime,
}

/// Bounded reassembly table for BTM telegram fragments.
///
/// ```rust
/// use atp_decode::btm::BtmReassembler;
///
/// let mut reassembler = BtmReassembler::new();
/// let mut fragment = [0u8; 26];
/// fragment[0] = 9;
///
/// for ordinal in [3, 1, 5, 2] {
///     assert!(reassembler.add_fragment(&fragment, ordinal)?.is_none());
/// }
/// let telegram = reassembler.add_fragment(&fragment, 4)?.expect("fifth ordinal completes");
/// assert_eq!(telegram.sequence, 9);
/// assert!(reassembler.pending_sequences().is_empty());
/// # Ok::<(), atp_decode::DecodeError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct BtmReassembler {
    slots: [Option<Slot>; MAX_SLOTS],
    last_completed: Option<Telegram>,
}

impl BtmReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store one fragment and return the telegram if it completes one.
    ///
    /// Re-submitting an ordinal overwrites its payload. Returns `Ok(None)` while
    /// the telegram is incomplete, and also when the fragment opens a new
    /// sequence but every slot is occupied.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::InvalidOrdinal`] when `ordinal` is outside 1..=5
    /// - [`DecodeError::Truncated`] when `fragment` is shorter than [`FRAGMENT_LEN`]
    pub fn add_fragment(
        &mut self,
        fragment: &[u8],
        ordinal: u8,
    ) -> Result<Option<Telegram>, DecodeError> {
        let index = ordinal_index(ordinal)?;
        if fragment.len() < FRAGMENT_LEN {
            return Err(DecodeError::truncated("BTM fragment", FRAGMENT_LEN, fragment.len()));
        }

        let sequence = fragment[0];
        let mut payload = [0u8; PAYLOAD_LEN];
        payload.copy_from_slice(&fragment[1..FRAGMENT_LEN]);

        let Some(position) = self.slot_for(sequence) else {
            debug!(sequence, ordinal, "All BTM slots occupied, dropping fragment");
            return Ok(None);
        };

        let Some(slot) = self.slots[position].as_mut() else {
            return Ok(None);
        };
        slot.parts[index] = Some(payload);
        trace!(sequence, ordinal, received = slot.received(), "Stored BTM fragment");

        let Some(telegram) = slot.assemble() else {
            return Ok(None);
        };

        self.slots[position] = None;
        debug!(sequence, "BTM telegram complete");
        self.last_completed = Some(telegram.clone());
        Ok(Some(telegram))
    }

    /// Most recently completed telegram.
    pub fn last_completed(&self) -> Option<&Telegram> {
        self.last_completed.as_ref()
    }

    /// `(sequence, fragments_received)` for every in-flight telegram.
    pub fn pending_sequences(&self) -> Vec<(u8, usize)> {
        self.slots.iter().flatten().map(|slot| (slot.sequence, slot.received())).collect()
    }

    /// In-flight telegrams with their first arrival time, for caller-driven eviction.
    pub fn pending_slots(&self) -> Vec<PendingSlot> {
        self.slots
            .iter()
            .flatten()
            .map(|slot| PendingSlot {
                sequence: slot.sequence,
                received: slot.received(),
                first_seen: slot.first_seen,
            })
            .collect()
    }

    /// Number of occupied slots.
    pub fn occupied(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Free the slot holding `sequence`. Returns whether a slot was freed.
    pub fn discard(&mut self, sequence: u8) -> bool {
        for slot in self.slots.iter_mut() {
            if slot.as_ref().is_some_and(|s| s.sequence == sequence) {
                *slot = None;
                debug!(sequence, "Discarded pending BTM telegram");
                return true;
            }
        }
        false
    }

    /// Clear every slot and the last completed telegram.
    pub fn reset(&mut self) {
        self.slots = Default::default();
        self.last_completed = None;
    }

    /// Index of the slot for `sequence`, allocating one if needed.
    fn slot_for(&mut self, sequence: u8) -> Option<usize> {
        if let Some(position) =
            self.slots.iter().position(|s| s.as_ref().is_some_and(|s| s.sequence == sequence))
        {
            return Some(position);
        }

        let free = self.slots.iter().position(Option::is_none)?;
        self.slots[free] = Some(Slot::new(sequence));
        trace!(sequence, slot = free, "Allocated BTM slot");
        Some(free)
    }
}

fn ordinal_index(ordinal: u8) -> Result<usize, DecodeError> {
    match ordinal {
        1..=5 => Ok(usize::from(ordinal) - 1),
        other => Err(DecodeError::InvalidOrdinal(other)),
    }
}
