//! Property tests for the bit transposer.

#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::indexing_slicing)]

use multilane::{deinterleave, interleaved_len, transpose, LaneSlot, LaneWidth};
use proptest::collection::vec;
use proptest::prelude::*;

fn width() -> impl Strategy<Value = LaneWidth> {
    prop_oneof![
        Just(LaneWidth::Dual),
        Just(LaneWidth::Quad),
        Just(LaneWidth::Octal),
    ]
}

/// K lanes of equal length.
fn equal_lanes() -> impl Strategy<Value = (LaneWidth, Vec<Vec<u8>>)> {
    (width(), 0usize..64).prop_flat_map(|(width, len)| {
        (Just(width), vec(vec(any::<u8>(), len), width.lanes()))
    })
}

proptest! {
    /// De-interleaving a transpose recovers every lane exactly.
    #[test]
    fn round_trip((width, lanes) in equal_lanes()) {
        let slots: Vec<LaneSlot<'_>> = lanes.iter().map(|l| LaneSlot::present(l, &[0x00])).collect();
        let mut out = vec![0u8; interleaved_len(width, lanes[0].len())];
        transpose(width, &slots, &mut out).unwrap();
        for (index, lane) in lanes.iter().enumerate() {
            prop_assert_eq!(&deinterleave(width, &out, index).unwrap(), lane);
        }
    }

    /// Ragged lanes end flush: each lane's payload is the tail of its wire.
    #[test]
    fn ragged_lanes_are_right_aligned(
        width in width(),
        lanes in vec(vec(any::<u8>(), 0..32), 1..=8),
        pad in vec(any::<u8>(), 1..5),
    ) {
        let lanes = &lanes[..lanes.len().min(width.lanes())];
        let slots: Vec<LaneSlot<'_>> = lanes.iter().map(|l| LaneSlot::present(l, &pad)).collect();
        let frames = lanes.iter().map(Vec::len).max().unwrap_or(0);
        let mut out = vec![0u8; interleaved_len(width, frames)];
        transpose(width, &slots, &mut out).unwrap();

        for (index, lane) in lanes.iter().enumerate() {
            let wire = deinterleave(width, &out, index).unwrap();
            prop_assert_eq!(wire.len(), frames);
            let pad_len = frames - lane.len();
            prop_assert_eq!(&wire[pad_len..], lane.as_slice());
            for (i, byte) in wire[..pad_len].iter().enumerate() {
                prop_assert_eq!(*byte, pad[i % pad.len()]);
            }
        }
    }

    /// Any length that is not a multiple of K is rejected.
    #[test]
    fn misaligned_output_rejected(width in width(), frames in 0usize..16, extra in 1usize..8) {
        let extra = extra % width.lanes();
        prop_assume!(extra != 0);
        let mut out = vec![0u8; frames * width.lanes() + extra];
        prop_assert!(transpose(width, &[], &mut out).is_err());
    }
}
