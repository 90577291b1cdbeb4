//! Bit transposer: interleaves K lane buffers into one multi-wire bitstream
//!
//! A K-wire SPI peripheral shifts one output byte per clock group, with each
//! data wire carrying `8 / K` bits of that byte. To make lane `j` appear on
//! wire `j`, the source bytes must be rearranged so every output byte holds
//! a bit group from each lane.
//!
//! # Wire layout
//!
//! | K | out bytes per source byte | output byte layout                        |
//! |---|---------------------------|-------------------------------------------|
//! | 1 | 1                         | lane 0 byte                               |
//! | 2 | 2                         | `[l1 nibble][l0 nibble]`, high nibble first |
//! | 4 | 4                         | `[l3:2][l2:2][l1:2][l0:2]`, MSB pair first  |
//! | 8 | 8                         | byte-parallel: out `i*8+j` = lane `j` byte `i` |
//!
//! # Padding
//!
//! Lanes shorter than the frame count are **left**-padded with their padding
//! frame (tiled), so real payload bytes end together on every lane. LED
//! chipsets latch on the trailing bytes, and leading filler (e.g. APA102
//! black frames) is harmless.

use alloc::vec::Vec;

use platform::{LaneWidth, MAX_LANES};

/// One lane's input to [`transpose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneSlot<'a> {
    /// Lane with data
    Present {
        /// Bytes to send on this lane
        payload: &'a [u8],
        /// Filler pattern prepended (tiled) when `payload` is short.
        /// Empty acts as `[0x00]`.
        padding: &'a [u8],
    },
    /// Unused lane, filled entirely with the default pad byte
    Absent,
}

impl<'a> LaneSlot<'a> {
    /// Present lane with the given padding frame.
    pub const fn present(payload: &'a [u8], padding: &'a [u8]) -> Self {
        Self::Present { payload, padding }
    }

    /// Payload length (0 for absent lanes).
    pub const fn payload_len(&self) -> usize {
        match self {
            Self::Present { payload, .. } => payload.len(),
            Self::Absent => 0,
        }
    }

    /// Byte `index` of this lane once extended to `frames` bytes.
    fn byte_at(&self, index: usize, frames: usize, filler: u8) -> u8 {
        let Self::Present { payload, padding } = *self else {
            return filler;
        };
        let pad_len = frames.saturating_sub(payload.len());
        match index.checked_sub(pad_len) {
            Some(data_index) => payload.get(data_index).copied().unwrap_or(filler),
            None => index
                .checked_rem(padding.len())
                .and_then(|tile| padding.get(tile).copied())
                .unwrap_or(0x00),
        }
    }
}

/// Transpose failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransposeError {
    /// Output length is not a multiple of the lane width
    SizeMismatch {
        /// Output buffer length
        len: usize,
        /// Lane width K
        lanes: usize,
    },
    /// The longest payload does not fit in `output.len() / K` frames
    OutputTooSmall {
        /// Longest payload
        needed: usize,
        /// Frames available
        frames: usize,
    },
    /// More lane slots than the width has wires
    TooManyLanes {
        /// Slots supplied
        lanes: usize,
        /// Lane width K
        max: usize,
    },
    /// Lane index outside `0..K` when de-interleaving
    LaneOutOfRange {
        /// Requested lane
        lane: usize,
        /// Lane width K
        lanes: usize,
    },
}

impl TransposeError {
    /// Short static diagnostic.
    pub const fn message(&self) -> &'static str {
        match self {
            Self::SizeMismatch { .. } => "Output buffer size must be divisible by lane count",
            Self::OutputTooSmall { .. } => "Output buffer too small for longest lane",
            Self::TooManyLanes { .. } => "More lanes than the transpose width",
            Self::LaneOutOfRange { .. } => "Lane index out of range",
        }
    }
}

impl core::fmt::Display for TransposeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            Self::SizeMismatch { len, lanes } => write!(
                f,
                "Output buffer size {len} must be divisible by {lanes}"
            ),
            Self::OutputTooSmall { needed, frames } => write!(
                f,
                "Longest lane has {needed} bytes but output holds {frames} frames"
            ),
            Self::TooManyLanes { lanes, max } => {
                write!(f, "{lanes} lanes supplied, transpose width is {max}")
            }
            Self::LaneOutOfRange { lane, lanes } => {
                write!(f, "Lane {lane} out of range for width {lanes}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TransposeError {}

/// Longest present payload (0 if every slot is absent).
pub fn max_payload_len(slots: &[LaneSlot<'_>]) -> usize {
    slots.iter().map(LaneSlot::payload_len).max().unwrap_or(0)
}

/// Output bytes needed to carry `max_len` bytes per lane at `width`.
pub const fn interleaved_len(width: LaneWidth, max_len: usize) -> usize {
    max_len.saturating_mul(width.lanes())
}

/// Filler for absent lanes: first present lane's first padding byte.
fn default_filler(slots: &[LaneSlot<'_>]) -> u8 {
    slots
        .iter()
        .find_map(|slot| match slot {
            LaneSlot::Present { padding, .. } => padding.first().copied(),
            LaneSlot::Absent => None,
        })
        .unwrap_or(0x00)
}

/// Interleave `slots` into `output` for a `width`-wire peripheral.
///
/// Slots beyond `slots.len()` (up to K) are treated as [`LaneSlot::Absent`].
/// Every byte of `output` is written on success; on error its contents are
/// unspecified.
#[allow(clippy::arithmetic_side_effects)] // Safety: K is 1, 2, 4 or 8, never zero
pub fn transpose(
    width: LaneWidth,
    slots: &[LaneSlot<'_>],
    output: &mut [u8],
) -> Result<(), TransposeError> {
    let k = width.lanes();
    if slots.len() > k {
        return Err(TransposeError::TooManyLanes {
            lanes: slots.len(),
            max: k,
        });
    }
    if output.len() % k != 0 {
        return Err(TransposeError::SizeMismatch {
            len: output.len(),
            lanes: k,
        });
    }
    let frames = output.len() / k;
    let needed = max_payload_len(slots);
    if needed > frames {
        return Err(TransposeError::OutputTooSmall { needed, frames });
    }

    let filler = default_filler(slots);
    let mut column = [filler; MAX_LANES];
    for (index, chunk) in output.chunks_exact_mut(k).enumerate() {
        for (byte, slot) in column.iter_mut().zip(slots) {
            *byte = slot.byte_at(index, frames, filler);
        }
        interleave(width, &column, chunk);
    }
    Ok(())
}

/// Write one source byte per lane as K output bytes.
fn interleave(width: LaneWidth, column: &[u8; MAX_LANES], out: &mut [u8]) {
    let [a, b, c, d, ..] = *column;
    match width {
        LaneWidth::Single => {
            if let Some(dst) = out.first_mut() {
                *dst = a;
            }
        }
        LaneWidth::Dual => {
            if let [hi, lo] = out {
                (*hi, *lo) = interleave2(a, b);
            }
        }
        LaneWidth::Quad => {
            if let Ok(dst) = <&mut [u8; 4]>::try_from(out) {
                *dst = interleave4(a, b, c, d);
            }
        }
        LaneWidth::Octal => {
            if let Ok(dst) = <&mut [u8; MAX_LANES]>::try_from(out) {
                *dst = *column;
            }
        }
    }
}

/// Two lanes, 4-bit groups: lane 0 in the low nibble, high nibbles first.
#[allow(clippy::arithmetic_side_effects)] // Safety: constant shifts < 8
const fn interleave2(a: u8, b: u8) -> (u8, u8) {
    ((a >> 4) | (b & 0xF0), (a & 0x0F) | (b << 4))
}

/// Four lanes, 2-bit groups: lane 0 in bits 1:0 ... lane 3 in bits 7:6,
/// most significant pair first.
#[allow(clippy::arithmetic_side_effects)] // Safety: constant shifts < 8
const fn interleave4(a: u8, b: u8, c: u8, d: u8) -> [u8; 4] {
    const fn pair(byte: u8, shift: u32) -> u8 {
        (byte >> shift) & 0b11
    }
    [
        pair(a, 6) | pair(b, 6) << 2 | pair(c, 6) << 4 | pair(d, 6) << 6,
        pair(a, 4) | pair(b, 4) << 2 | pair(c, 4) << 4 | pair(d, 4) << 6,
        pair(a, 2) | pair(b, 2) << 2 | pair(c, 2) << 4 | pair(d, 2) << 6,
        pair(a, 0) | pair(b, 0) << 2 | pair(c, 0) << 4 | pair(d, 0) << 6,
    ]
}

/// Recover lane `lane` from an interleaved buffer (padding included).
///
/// Exact inverse of [`transpose`]; used by test doubles and conformance
/// checks to verify what went out on each wire.
#[allow(clippy::arithmetic_side_effects)] // Safety: K is 1, 2, 4 or 8; shifts are < 8
pub fn deinterleave(width: LaneWidth, buffer: &[u8], lane: usize) -> Result<Vec<u8>, TransposeError> {
    let k = width.lanes();
    if lane >= k {
        return Err(TransposeError::LaneOutOfRange { lane, lanes: k });
    }
    if buffer.len() % k != 0 {
        return Err(TransposeError::SizeMismatch {
            len: buffer.len(),
            lanes: k,
        });
    }

    let bits = 8 / k;
    let mask = 0xFFu8 >> (8 - bits);
    let lane_shift = lane * bits;
    let bytes = buffer
        .chunks_exact(k)
        .map(|chunk| match width {
            LaneWidth::Single => chunk.first().copied().unwrap_or(0),
            LaneWidth::Octal => chunk.get(lane).copied().unwrap_or(0),
            LaneWidth::Dual | LaneWidth::Quad => {
                chunk.iter().enumerate().fold(0u8, |acc, (group, out)| {
                    let group_shift = 8 - bits * (group + 1);
                    acc | ((out >> lane_shift) & mask) << group_shift
                })
            }
        })
        .collect();
    Ok(bytes)
}
