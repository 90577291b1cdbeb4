//! Property tests for clock divider computation.

#![allow(clippy::arithmetic_side_effects)]

use platform::clock_config::{ClockDomain, MAX_DIVIDER_FIXED, MIN_DIVIDER_FIXED};
use proptest::prelude::*;

fn domain() -> impl Strategy<Value = ClockDomain> {
    (1_000_000u32..=480_000_000, 1u32..=4).prop_map(|(source_hz, cycles_per_bit)| ClockDomain {
        name: "prop",
        source_hz,
        cycles_per_bit,
        max_output_hz: source_hz / cycles_per_bit,
    })
}

proptest! {
    /// The produced clock never exceeds the request (or the domain ceiling).
    #[test]
    fn never_overclocks(domain in domain(), requested in 1u32..=u32::MAX) {
        if let Ok(divider) = domain.divider_for(requested) {
            let actual = domain.actual_hz(divider);
            prop_assert!(actual <= domain.target_hz(requested));
            prop_assert!(divider.fixed() >= MIN_DIVIDER_FIXED);
            prop_assert!(divider.fixed() <= MAX_DIVIDER_FIXED);
        }
    }

    /// Requests the divider can reach are accepted.
    #[test]
    fn reachable_rates_accepted(domain in domain(), fraction in 1u32..=1000) {
        let requested = (domain.max_output_hz / fraction).max(1);
        // Slowest rate with a 16-bit integer divider
        let floor = domain.source_hz / domain.cycles_per_bit / 65_535;
        prop_assume!(requested > floor);
        prop_assert!(domain.divider_for(requested).is_ok());
    }
}
