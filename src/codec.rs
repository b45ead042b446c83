//! Binary table format for the move databases.
//!
//! Record layout (10 bytes):
//! - 9 bytes: big-endian packed key, 2 bits per sticker over the
//!   4-color alphabet, face-major sticker order
//! - 1 byte: move code 0-7, or 255 marking the solved root
//!
//! Records are sorted strictly ascending by key so the oracle can binary
//! search and the fuzzy scan can tie-break on the lowest key.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::puzzle::{Color, Move, Scan, State, STICKER_COUNT};

/// Packed key width.
pub const KEY_BYTES: usize = 9;
/// On-disk record width.
pub const RECORD_BYTES: usize = KEY_BYTES + 1;
/// Move byte marking the solved root state.
pub const SOLVED_CODE: u8 = 255;

/// Stickers per key byte.
const STICKERS_PER_BYTE: usize = STICKER_COUNT / KEY_BYTES;

/// A state packed into 72 bits.
///
/// The derived ordering is byte-lexicographic, which equals numeric
/// order of the big-endian integer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct PackedKey(pub [u8; KEY_BYTES]);

/// What the table knows about a state: the move that reached it during
/// enumeration, or that it is the root.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NextStep {
    Solved,
    Face(Move),
}

impl NextStep {
    /// The on-disk move byte.
    pub fn code(self) -> u8 {
        match self {
            NextStep::Solved => SOLVED_CODE,
            NextStep::Face(mv) => mv.code(),
        }
    }

    /// Decodes an on-disk move byte.
    pub fn from_code(code: u8) -> Option<NextStep> {
        if code == SOLVED_CODE {
            Some(NextStep::Solved)
        } else {
            Move::from_code(code).map(NextStep::Face)
        }
    }
}

/// One decoded table entry.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Record {
    pub key: PackedKey,
    pub step: NextStep,
}

/// Error decoding a table byte stream.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum DecodeError {
    #[error("table length {0} is not a multiple of {RECORD_BYTES}-byte records")]
    Truncated(usize),
    #[error("unrecognized move code {0} in record {1}")]
    BadMoveCode(u8, usize),
    #[error("records out of order at index {0}")]
    OutOfOrder(usize),
}

/// Packs a resolved state into its 72-bit key.
pub fn pack(state: &State) -> PackedKey {
    let mut key = [0u8; KEY_BYTES];
    for (byte_index, byte) in key.iter_mut().enumerate() {
        let mut packed = 0u8;
        for offset in 0..STICKERS_PER_BYTE {
            let sticker = state.sticker(byte_index * STICKERS_PER_BYTE + offset);
            packed = (packed << 2) | sticker.code();
        }
        *byte = packed;
    }
    PackedKey(key)
}

/// Unpacks a key back into the state it encodes. Total: every key over
/// the 4-color alphabet decodes.
pub fn unpack(key: PackedKey) -> State {
    let mut stickers = [Color::Red; STICKER_COUNT];
    for (index, sticker) in stickers.iter_mut().enumerate() {
        let byte = key.0[index / STICKERS_PER_BYTE];
        let shift = 6 - 2 * (index % STICKERS_PER_BYTE);
        *sticker = Color::from_code(byte >> shift);
    }
    State::from_stickers(stickers)
}

/// Packs a scan into a (value, mask) key pair for masked comparison.
///
/// Known stickers contribute their color bits under mask `0b11`; unknown
/// stickers contribute zero bits under a zero mask, so they compare equal
/// to anything.
pub fn pack_masked(scan: &Scan) -> (PackedKey, PackedKey) {
    let mut value = [0u8; KEY_BYTES];
    let mut mask = [0u8; KEY_BYTES];
    for byte_index in 0..KEY_BYTES {
        let mut value_byte = 0u8;
        let mut mask_byte = 0u8;
        for offset in 0..STICKERS_PER_BYTE {
            let (code, mask_bits) = match scan.sticker(byte_index * STICKERS_PER_BYTE + offset) {
                Some(color) => (color.code(), 0b11),
                None => (0, 0),
            };
            value_byte = (value_byte << 2) | code;
            mask_byte = (mask_byte << 2) | mask_bits;
        }
        value[byte_index] = value_byte;
        mask[byte_index] = mask_byte;
    }
    (PackedKey(value), PackedKey(mask))
}

/// Serializes an enumeration map as a sorted record stream.
pub fn encode(entries: &FxHashMap<PackedKey, NextStep>) -> Vec<u8> {
    let mut records: Vec<Record> = entries
        .iter()
        .map(|(&key, &step)| Record { key, step })
        .collect();
    records.sort_unstable_by_key(|record| record.key);

    let mut bytes = Vec::with_capacity(records.len() * RECORD_BYTES);
    for record in &records {
        bytes.extend_from_slice(&record.key.0);
        bytes.push(record.step.code());
    }
    bytes
}

/// Deserializes a record stream, validating shape and order.
pub fn decode(bytes: &[u8]) -> Result<Vec<Record>, DecodeError> {
    if bytes.len() % RECORD_BYTES != 0 {
        return Err(DecodeError::Truncated(bytes.len()));
    }
    let mut records: Vec<Record> = Vec::with_capacity(bytes.len() / RECORD_BYTES);
    for (index, chunk) in bytes.chunks_exact(RECORD_BYTES).enumerate() {
        let mut key = [0u8; KEY_BYTES];
        key.copy_from_slice(&chunk[..KEY_BYTES]);
        let key = PackedKey(key);
        let step = NextStep::from_code(chunk[KEY_BYTES])
            .ok_or(DecodeError::BadMoveCode(chunk[KEY_BYTES], index))?;
        if let Some(previous) = records.last() {
            if previous.key >= key {
                return Err(DecodeError::OutOfOrder(index));
            }
        }
        records.push(Record { key, step });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{Orientation, Scan};

    fn reference_solved() -> State {
        Orientation::ALL[4].solved_state()
    }

    fn sample_states() -> Vec<State> {
        let mut states = vec![reference_solved()];
        let mut current = reference_solved();
        for mv in Move::ALL {
            current = current.apply(mv);
            states.push(current);
        }
        states
    }

    #[test]
    fn test_pack_unpack_round_trip() {
        for state in sample_states() {
            assert_eq!(unpack(pack(&state)), state);
        }
    }

    #[test]
    fn test_pack_bit_layout() {
        // reference solved: 9x red (00), 9x yellow (11), 9x green (01),
        // 9x blue (10), four stickers per byte, first sticker in the
        // high bits
        let key = pack(&reference_solved());
        assert_eq!(key.0, [0x00, 0x00, 0x3F, 0xFF, 0xF5, 0x55, 0x56, 0xAA, 0xAA]);
    }

    #[test]
    fn test_key_order_matches_string_order() {
        // face-major symbol order and key order agree on the leading
        // sticker
        let low = pack(&reference_solved()); // front red
        let high = pack(&Orientation::ALL[7].solved_state()); // front yellow
        assert!(low < high);
    }

    #[test]
    fn test_masked_pack_ignores_unknowns() {
        let state = reference_solved().apply(Move::R);
        let scan = Scan::from(state).with_sticker(0, None).with_sticker(35, None);
        let (value, mask) = pack_masked(&scan);
        // unknown stickers zero out both value and mask bits
        assert_eq!(mask.0[0] & 0b1100_0000, 0);
        assert_eq!(mask.0[8] & 0b0000_0011, 0);
        assert_eq!(value.0[0] & 0b1100_0000, 0);
        // fully known scans produce the exact key under a full mask
        let (value, mask) = pack_masked(&Scan::from(state));
        assert_eq!(value, pack(&state));
        assert_eq!(mask.0, [0xFF; KEY_BYTES]);
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let mut entries = FxHashMap::default();
        let solved = reference_solved();
        entries.insert(pack(&solved), NextStep::Solved);
        for mv in Move::ALL {
            entries.insert(pack(&solved.apply(mv)), NextStep::Face(mv));
        }

        let bytes = encode(&entries);
        assert_eq!(bytes.len(), entries.len() * RECORD_BYTES);

        let records = decode(&bytes).unwrap();
        assert_eq!(records.len(), entries.len());
        for pair in records.windows(2) {
            assert!(pair[0].key < pair[1].key);
        }
        for record in &records {
            assert_eq!(entries.get(&record.key), Some(&record.step));
        }
    }

    #[test]
    fn test_decode_rejects_truncated_stream() {
        assert_eq!(decode(&[0u8; 7]), Err(DecodeError::Truncated(7)));
    }

    #[test]
    fn test_decode_rejects_bad_move_code() {
        let mut bytes = [0u8; RECORD_BYTES];
        bytes[KEY_BYTES] = 8;
        assert_eq!(decode(&bytes), Err(DecodeError::BadMoveCode(8, 0)));
    }

    #[test]
    fn test_decode_rejects_unsorted_records() {
        let mut bytes = Vec::new();
        let mut first = [0u8; KEY_BYTES];
        first[0] = 2;
        bytes.extend_from_slice(&first);
        bytes.push(0);
        bytes.extend_from_slice(&[1u8; KEY_BYTES]);
        bytes.push(1);
        assert_eq!(decode(&bytes), Err(DecodeError::OutOfOrder(1)));

        // duplicate keys are also out of order
        let mut dup = Vec::new();
        dup.extend_from_slice(&[3u8; KEY_BYTES]);
        dup.push(0);
        dup.extend_from_slice(&[3u8; KEY_BYTES]);
        dup.push(1);
        assert_eq!(decode(&dup), Err(DecodeError::OutOfOrder(1)));
    }

    #[test]
    fn test_solved_sentinel_round_trip() {
        assert_eq!(NextStep::from_code(SOLVED_CODE), Some(NextStep::Solved));
        assert_eq!(NextStep::from_code(3), Some(NextStep::Face(Move::Ri)));
        assert_eq!(NextStep::from_code(9), None);
        for mv in Move::ALL {
            assert_eq!(NextStep::Face(mv).code(), mv.code());
        }
    }
}
