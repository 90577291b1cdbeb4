//! Device configuration
//!
//! ```
//! use multilane::{padding, Config, SpiMode};
//!
//! let config = Config::new(18, &[23, 22, 21, 19])
//!     .unwrap()
//!     .with_clock_speed(20_000_000)
//!     .with_mode(SpiMode::Mode0)
//!     .with_padding(padding::APA102)
//!     .unwrap();
//! assert_eq!(config.num_lanes(), 4);
//! ```

use heapless::Vec;
use platform::gpio::data_pin_slots;
use platform::{BackendConfig, SpiMode, FASTEST_CLOCK_HZ, MAX_LANES, UNLIMITED_TRANSFER};

use crate::error::Error;

/// Longest padding frame a device can carry.
pub const MAX_PADDING_LEN: usize = 16;

/// Padding frames for common clocked LED chipsets.
///
/// Each is one "do nothing" LED frame; the transposer repeats it to fill
/// the head of shorter lanes.
pub mod padding {
    /// APA102 black LED frame (brightness 0)
    pub const APA102: &[u8] = &[0xE0, 0x00, 0x00, 0x00];
    /// SK9822 shares the APA102 frame format
    pub const SK9822: &[u8] = APA102;
    /// LPD8806 black (7-bit colour with MSB set)
    pub const LPD8806: &[u8] = &[0x80, 0x80, 0x80];
    /// WS2801 black
    pub const WS2801: &[u8] = &[0x00, 0x00, 0x00];
    /// P9813 black (flag byte with zero checksums)
    pub const P9813: &[u8] = &[0xFF, 0x00, 0x00, 0x00];
    /// Plain zero filler
    pub const ZERO: &[u8] = &[0x00];
}

/// Multi-lane device configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Shared clock GPIO (SCK)
    pub clock_pin: u8,
    /// Data GPIOs, lane 0 first (1–8 entries)
    pub data_pins: Vec<u8, MAX_LANES>,
    /// Requested clock in Hz ([`FASTEST_CLOCK_HZ`] = fastest the backend allows)
    pub clock_speed_hz: u32,
    /// Clock polarity / phase
    pub mode: SpiMode,
    /// Filler prepended to short lanes
    pub padding: Vec<u8, MAX_PADDING_LEN>,
    /// Transfer size limit handed to the backend
    pub max_transfer_sz: usize,
}

impl Config {
    /// Validated config with defaults: fastest clock, mode 0, zero padding.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] unless 1 to 8 data pins are given.
    pub fn new(clock_pin: u8, data_pins: &[u8]) -> Result<Self, Error> {
        if data_pins.is_empty() {
            return Err(Error::Config("At least one data pin is required"));
        }
        let data_pins = Vec::from_slice(data_pins)
            .map_err(|_| Error::Config("At most 8 data pins are supported"))?;
        Ok(Self {
            clock_pin,
            data_pins,
            clock_speed_hz: FASTEST_CLOCK_HZ,
            mode: SpiMode::Mode0,
            padding: Vec::from_slice(padding::ZERO).unwrap_or_default(),
            max_transfer_sz: UNLIMITED_TRANSFER,
        })
    }

    /// Set the requested clock speed.
    #[must_use]
    pub fn with_clock_speed(mut self, hz: u32) -> Self {
        self.clock_speed_hz = hz;
        self
    }

    /// Set the SPI mode.
    #[must_use]
    pub fn with_mode(mut self, mode: SpiMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the padding frame. An empty frame means zero filler.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the frame exceeds [`MAX_PADDING_LEN`] bytes.
    pub fn with_padding(mut self, frame: &[u8]) -> Result<Self, Error> {
        let frame = if frame.is_empty() { padding::ZERO } else { frame };
        self.padding = Vec::from_slice(frame)
            .map_err(|_| Error::Config("Padding frame longer than 16 bytes"))?;
        Ok(self)
    }

    /// Limit the size of a single backend transfer (0 = no limit).
    #[must_use]
    pub fn with_max_transfer_sz(mut self, bytes: usize) -> Self {
        self.max_transfer_sz = bytes;
        self
    }

    /// Number of lanes (data pins).
    pub fn num_lanes(&self) -> usize {
        self.data_pins.len()
    }

    /// Backend config for the instance on `bus_num`.
    pub fn backend_config(&self, bus_num: u8) -> BackendConfig {
        let mut config = BackendConfig::new(bus_num, self.clock_speed_hz);
        config.clock_pin = Some(self.clock_pin);
        config.data_pins = data_pin_slots(&self.data_pins);
        config.max_transfer_sz = self.max_transfer_sz;
        config.mode = self.mode;
        config
    }
}
