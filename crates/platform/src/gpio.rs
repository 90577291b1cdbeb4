//! Pin assignment validation shared by all backends
//!
//! Backends call these from `begin()` before touching hardware so that a bad
//! assignment never leaves a peripheral half-configured.

use crate::backend::{BackendError, LaneWidth};
use crate::config::MAX_LANES;

/// Validate the clock and data pins of a backend config.
///
/// Rules:
/// - clock pin and D0 are required
/// - active data pins are contiguous from D0 (no `None` gaps)
/// - no more active data pins than the family has wires
/// - no GPIO is used twice
///
/// Returns the number of active data pins.
pub fn validate_pins(
    clock_pin: Option<u8>,
    data_pins: &[Option<u8>; MAX_LANES],
    width: LaneWidth,
) -> Result<usize, BackendError> {
    let Some(clock) = clock_pin else {
        return Err(BackendError::InvalidPins("Clock pin is required"));
    };
    if data_pins[0].is_none() {
        return Err(BackendError::InvalidPins("Data pin D0 is required"));
    }

    let active = data_pins.iter().take_while(|pin| pin.is_some()).count();
    if data_pins.iter().skip(active).any(Option::is_some) {
        return Err(BackendError::InvalidPins(
            "Data pins must be assigned contiguously from D0",
        ));
    }
    if active > width.lanes() {
        return Err(BackendError::InvalidPins(
            "More data pins than the peripheral has lanes",
        ));
    }

    let mut seen = [false; 256];
    let assigned = core::iter::once(clock).chain(data_pins.iter().flatten().copied());
    for pin in assigned {
        if let Some(slot) = seen.get_mut(usize::from(pin)) {
            if *slot {
                return Err(BackendError::InvalidPins("GPIO assigned more than once"));
            }
            *slot = true;
        }
    }

    Ok(active)
}

/// Require the active data pins to be consecutive GPIO numbers (D0, D0+1, ...).
///
/// PIO-style backends shift all lanes out of one contiguous pin group.
pub fn require_consecutive(data_pins: &[Option<u8>; MAX_LANES]) -> Result<(), BackendError> {
    let mut pins = data_pins.iter().map_while(|pin| *pin);
    let Some(mut previous) = pins.next() else {
        return Err(BackendError::InvalidPins("Data pin D0 is required"));
    };
    for pin in pins {
        if previous.checked_add(1) != Some(pin) {
            return Err(BackendError::InvalidPins(
                "Data pins must be consecutive (D0, D0+1, D0+2, ...)",
            ));
        }
        previous = pin;
    }
    Ok(())
}

/// Expand a short list of data pins into the fixed D0..D7 layout.
///
/// Extra entries beyond [`MAX_LANES`] are ignored.
#[must_use]
pub fn data_pin_slots(pins: &[u8]) -> [Option<u8>; MAX_LANES] {
    let mut slots = [None; MAX_LANES];
    for (slot, pin) in slots.iter_mut().zip(pins) {
        *slot = Some(*pin);
    }
    slots
}
