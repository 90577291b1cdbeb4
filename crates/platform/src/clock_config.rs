//! Clock divider computation for multi-lane SPI backends.
//!
//! Every backend derives its bit clock from a fixed source clock through a
//! divider. PIO-style engines spend two source cycles per bit (clock high,
//! clock low) and accept a 16.8 fixed-point divider; SPI peripherals fed by
//! DMA usually spend one cycle per bit.
//!
//! ```text
//! bit_clock = source_hz / (cycles_per_bit * divider)
//! ```
//!
//! The divider is always rounded **up**, so the produced clock never exceeds
//! the requested one (LED chipsets tolerate slow clocks, not fast ones).

use crate::backend::BackendError;
use crate::config::FASTEST_CLOCK_HZ;

/// Fractional bits in the fixed-point divider.
pub const DIVIDER_FRAC_BITS: u32 = 8;

/// Largest encodable divider (65535 + 255/256).
pub const MAX_DIVIDER_FIXED: u32 = 0x00FF_FFFF;

/// Smallest divider (1.0): the bit clock can never exceed the source.
pub const MIN_DIVIDER_FIXED: u32 = 1 << DIVIDER_FRAC_BITS;

/// A clock source a backend divides down to its bit clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockDomain {
    /// Short identifier used in diagnostics (e.g. `"clk_sys"`)
    pub name: &'static str,
    /// Source clock in Hz
    pub source_hz: u32,
    /// Source cycles spent per output bit
    pub cycles_per_bit: u32,
    /// Fastest bit clock the peripheral and typical wiring handle reliably
    pub max_output_hz: u32,
}

/// RP2040-class PIO: 125 MHz system clock, two instructions per bit,
/// 25 MHz ceiling for parallel strips.
pub const PIO_SYS_125MHZ: ClockDomain = ClockDomain {
    name: "clk_sys",
    source_hz: 125_000_000,
    cycles_per_bit: 2,
    max_output_hz: 25_000_000,
};

/// ESP32-class GP-SPI on the 80 MHz APB clock with DMA.
pub const SPI_APB_80MHZ: ClockDomain = ClockDomain {
    name: "apb",
    source_hz: 80_000_000,
    cycles_per_bit: 1,
    max_output_hz: 40_000_000,
};

/// 16.8 fixed-point clock divider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockDivider(u32);

impl ClockDivider {
    /// Raw 16.8 fixed-point value.
    #[must_use]
    pub const fn fixed(self) -> u32 {
        self.0
    }

    /// Integer part (register field `INT`).
    #[must_use]
    pub const fn integer(self) -> u16 {
        // MAX_DIVIDER_FIXED >> 8 fits in 16 bits
        #[allow(clippy::cast_possible_truncation)]
        let int = (self.0 >> DIVIDER_FRAC_BITS) as u16;
        int
    }

    /// Fractional part in 1/256 steps (register field `FRAC`).
    #[must_use]
    pub const fn fraction(self) -> u8 {
        #[allow(clippy::cast_possible_truncation)]
        let frac = (self.0 & 0xFF) as u8;
        frac
    }
}

impl ClockDomain {
    /// Resolve a requested bit clock to the speed this domain will target.
    ///
    /// [`FASTEST_CLOCK_HZ`] and anything above `max_output_hz` clamp to
    /// `max_output_hz`.
    #[must_use]
    pub const fn target_hz(&self, requested_hz: u32) -> u32 {
        if requested_hz == FASTEST_CLOCK_HZ || requested_hz > self.max_output_hz {
            self.max_output_hz
        } else {
            requested_hz
        }
    }

    /// Compute the divider for `requested_hz`.
    ///
    /// # Errors
    ///
    /// [`BackendError::InvalidClock`] for a zero request, a misconfigured
    /// domain, or a rate too slow for the 16-bit integer divider.
    #[allow(clippy::arithmetic_side_effects)] // Safety: u64 products of u32 values cannot overflow; denominators checked non-zero
    pub fn divider_for(&self, requested_hz: u32) -> Result<ClockDivider, BackendError> {
        if requested_hz == 0 {
            return Err(BackendError::InvalidClock("Clock speed must be non-zero"));
        }
        let target = self.target_hz(requested_hz);
        if target == 0 || self.cycles_per_bit == 0 || self.source_hz == 0 {
            return Err(BackendError::InvalidClock("Clock domain is misconfigured"));
        }

        let numerator = u64::from(self.source_hz) << DIVIDER_FRAC_BITS;
        let denominator = u64::from(self.cycles_per_bit) * u64::from(target);
        let fixed = numerator.div_ceil(denominator).max(u64::from(MIN_DIVIDER_FIXED));

        match u32::try_from(fixed) {
            Ok(fixed) if fixed <= MAX_DIVIDER_FIXED => Ok(ClockDivider(fixed)),
            _ => Err(BackendError::InvalidClock(
                "Requested clock too slow for this clock domain",
            )),
        }
    }

    /// Bit clock actually produced by `divider`.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)] // Safety: u64 math; divider >= MIN_DIVIDER_FIXED so denominator is non-zero
    pub fn actual_hz(&self, divider: ClockDivider) -> u32 {
        let numerator = u64::from(self.source_hz) << DIVIDER_FRAC_BITS;
        let denominator =
            u64::from(self.cycles_per_bit.max(1)) * u64::from(divider.fixed().max(1));
        u32::try_from(numerator / denominator).unwrap_or(u32::MAX)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// 125 MHz / (2 * 12.5) = 5 MHz exactly.
    #[test]
    fn exact_divider_at_5mhz() {
        let div = PIO_SYS_125MHZ.divider_for(5_000_000).unwrap();
        assert_eq!(div.integer(), 12);
        assert_eq!(div.fraction(), 128);
        assert_eq!(PIO_SYS_125MHZ.actual_hz(div), 5_000_000);
    }

    /// "Fastest" resolves to the domain ceiling: 125 MHz / (2 * 2.5) = 25 MHz.
    #[test]
    fn fastest_resolves_to_domain_max() {
        let div = PIO_SYS_125MHZ.divider_for(FASTEST_CLOCK_HZ).unwrap();
        assert_eq!(div.integer(), 2);
        assert_eq!(div.fraction(), 128);
        assert_eq!(PIO_SYS_125MHZ.actual_hz(div), 25_000_000);
    }

    #[test]
    fn over_max_request_is_clamped() {
        let clamped = SPI_APB_80MHZ.divider_for(200_000_000).unwrap();
        let fastest = SPI_APB_80MHZ.divider_for(FASTEST_CLOCK_HZ).unwrap();
        assert_eq!(clamped, fastest);
        assert_eq!(SPI_APB_80MHZ.actual_hz(clamped), 40_000_000);
    }

    /// A non-integral ratio rounds the divider up, never over-clocking.
    #[test]
    fn inexact_divider_rounds_down_the_clock() {
        let div = SPI_APB_80MHZ.divider_for(3_000_000).unwrap();
        assert!(SPI_APB_80MHZ.actual_hz(div) <= 3_000_000);
    }

    #[test]
    fn zero_request_rejected() {
        assert!(PIO_SYS_125MHZ.divider_for(0).is_err());
    }

    /// 125 MHz / 2 / 65536 ≈ 954 Hz is the slowest PIO bit clock.
    #[test]
    fn too_slow_request_rejected() {
        assert!(PIO_SYS_125MHZ.divider_for(100).is_err());
        assert!(PIO_SYS_125MHZ.divider_for(1_000).is_ok());
    }

    #[test]
    fn misconfigured_domain_rejected() {
        let broken = ClockDomain {
            cycles_per_bit: 0,
            ..PIO_SYS_125MHZ
        };
        assert_eq!(
            broken.divider_for(1_000_000),
            Err(BackendError::InvalidClock("Clock domain is misconfigured"))
        );
    }
}
