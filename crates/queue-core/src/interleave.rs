//! Merge two lane windows into combined processing order

use std::collections::VecDeque;
use std::ops::Range;

use crate::interval::nominal_lane;
use crate::{Error, Lane, QueueEntry, Result, TaggedEntry};

/// Interleave lane buffers over consecutive virtual `positions`
///
/// Each position is served by its nominal lane while that buffer has entries,
/// otherwise by the other lane. Both buffers running dry before the range is
/// covered means the caller sized them wrong and is reported as a defect.
pub fn interleave(
    positions: Range<u64>,
    rate: u64,
    express: Vec<QueueEntry>,
    standard: Vec<QueueEntry>,
) -> Result<Vec<TaggedEntry>> {
    let expected = positions.end.saturating_sub(positions.start);
    let buffered = (express.len() as u64, standard.len() as u64);
    let mut express = VecDeque::from(express);
    let mut standard = VecDeque::from(standard);
    let mut merged = Vec::with_capacity(expected as usize);

    for (offset, position) in positions.enumerate() {
        let nominal = nominal_lane(position, rate);
        let (first, second) = match nominal {
            Lane::Express => (&mut express, &mut standard),
            Lane::Standard => (&mut standard, &mut express),
        };

        let tagged = if let Some(entry) = first.pop_front() {
            TaggedEntry { lane: nominal, entry }
        } else if let Some(entry) = second.pop_front() {
            TaggedEntry {
                lane: nominal.other(),
                entry,
            }
        } else {
            return Err(Error::InterleaveExhausted {
                position: offset as u64,
                expected,
                express: buffered.0,
                standard: buffered.1,
            });
        };
        merged.push(tagged);
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;

    fn entries(tag: u8, n: u32) -> Vec<QueueEntry> {
        (0..n)
            .map(|i| QueueEntry::new(Address::repeat_byte(tag), i, 4_000, 32_000))
            .collect()
    }

    fn lanes(merged: &[TaggedEntry]) -> String {
        merged
            .iter()
            .map(|t| match t.lane {
                Lane::Express => 'E',
                Lane::Standard => 'S',
            })
            .collect()
    }

    #[test]
    fn test_follows_cycle() {
        let merged = interleave(0..6, 2, entries(0xe, 4), entries(0x5, 2)).unwrap();
        assert_eq!(lanes(&merged), "EESEES");
        // each lane keeps its own order
        let express_ids: Vec<u32> = merged
            .iter()
            .filter(|t| t.lane == Lane::Express)
            .map(|t| t.entry.slot_id)
            .collect();
        assert_eq!(express_ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_offset_positions() {
        // positions 2..5 with rate 2 are S E E
        let merged = interleave(2..5, 2, entries(0xe, 2), entries(0x5, 1)).unwrap();
        assert_eq!(lanes(&merged), "SEE");
    }

    #[test]
    fn test_fallback_when_nominal_empty() {
        let merged = interleave(0..4, 2, entries(0xe, 1), entries(0x5, 3)).unwrap();
        assert_eq!(lanes(&merged), "ESSS");

        let merged = interleave(0..4, 2, entries(0xe, 4), Vec::new()).unwrap();
        assert_eq!(lanes(&merged), "EEEE");
    }

    #[test]
    fn test_short_buffers_are_a_defect() {
        let err = interleave(0..5, 2, entries(0xe, 2), entries(0x5, 1)).unwrap_err();
        assert!(err.is_defect());
        match err {
            Error::InterleaveExhausted {
                position,
                expected,
                express,
                standard,
            } => {
                assert_eq!(position, 3);
                assert_eq!(expected, 5);
                assert_eq!((express, standard), (2, 1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_range() {
        assert!(interleave(9..9, 3, Vec::new(), Vec::new()).unwrap().is_empty());
    }
}
