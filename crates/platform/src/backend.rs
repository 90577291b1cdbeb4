//! Multi-lane SPI backend contract
//!
//! Every platform driver (DMA-fed SPI peripheral, PIO state machine, ISR
//! bit-banger) implements [`SpiBackend`] once per lane-count family. The
//! device layer only ever talks to this trait.
//!
//! # Lifecycle
//!
//! ```text
//! [uninitialized] --begin()--> [idle] --transmit()--> [busy]
//!        ^                       ^                       |
//!        |                       +----wait_complete()----+
//!        +-----------------end()-------------------------+
//! ```
//!
//! `transmit()` on a busy backend first waits for the active transfer, so
//! transfers issued on one instance never overlap on the wire.

use crate::config::{MAX_LANES, UNLIMITED_TRANSFER};
use crate::peripheral::SpiMode;

/// Lane-count family of a backend.
///
/// The discriminant is the number of data wires (and the number of output
/// bytes produced per source byte by the transposer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LaneWidth {
    /// Standard SPI, one data line
    Single = 1,
    /// Dual SPI, two data lines
    Dual = 2,
    /// Quad SPI, four data lines
    Quad = 4,
    /// Octal SPI, eight data lines
    Octal = 8,
}

impl LaneWidth {
    /// All families, narrowest first.
    pub const ALL: [Self; 4] = [Self::Single, Self::Dual, Self::Quad, Self::Octal];

    /// Number of data wires.
    #[must_use]
    pub const fn lanes(self) -> usize {
        self as usize
    }

    /// Narrowest family able to carry `count` lanes.
    ///
    /// 1 → Single, 2 → Dual, 3–4 → Quad, 5–8 → Octal, anything else → `None`.
    #[must_use]
    pub const fn for_lane_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(Self::Single),
            2 => Some(Self::Dual),
            3 | 4 => Some(Self::Quad),
            5..=8 => Some(Self::Octal),
            _ => None,
        }
    }

    /// Short family label used in diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Single => "Single-SPI",
            Self::Dual => "Dual-SPI",
            Self::Quad => "Quad-SPI",
            Self::Octal => "Octal-SPI",
        }
    }
}

/// Transmit hint passed to [`SpiBackend::transmit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmitMode {
    /// Queue the transfer and return while hardware keeps clocking.
    #[default]
    Async,
    /// Return only once the transfer has completed.
    Sync,
}

/// Configuration handed to [`SpiBackend::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BackendConfig {
    /// Peripheral bus number; must match [`SpiBackend::bus_id`]
    pub bus_num: u8,
    /// Shared clock (SCK) GPIO
    pub clock_pin: Option<u8>,
    /// Data GPIOs D0..D7; `None` marks an unused slot
    pub data_pins: [Option<u8>; MAX_LANES],
    /// Requested clock speed in Hz (`FASTEST_CLOCK_HZ` = fastest safe)
    pub clock_speed_hz: u32,
    /// Largest buffer accepted by `transmit` (`UNLIMITED_TRANSFER` = no limit)
    pub max_transfer_sz: usize,
    /// Clock polarity / phase
    pub mode: SpiMode,
}

impl BackendConfig {
    /// Config for `bus_num` with no pins assigned.
    #[must_use]
    pub const fn new(bus_num: u8, clock_speed_hz: u32) -> Self {
        Self {
            bus_num,
            clock_pin: None,
            data_pins: [None; MAX_LANES],
            clock_speed_hz,
            max_transfer_sz: UNLIMITED_TRANSFER,
            mode: SpiMode::Mode0,
        }
    }

    /// Number of assigned data pins.
    #[must_use]
    pub fn active_data_pins(&self) -> usize {
        self.data_pins.iter().filter(|pin| pin.is_some()).count()
    }

    /// Whether `len` bytes fit within `max_transfer_sz`.
    #[must_use]
    pub const fn accepts_transfer(&self, len: usize) -> bool {
        self.max_transfer_sz == UNLIMITED_TRANSFER || len <= self.max_transfer_sz
    }
}

/// Backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BackendError {
    /// Missing, duplicated, gapped or non-consecutive pin assignment
    InvalidPins(&'static str),
    /// Requested clock speed cannot be produced by this clock domain
    InvalidClock(&'static str),
    /// `BackendConfig::bus_num` does not name this instance
    BusMismatch {
        /// Bus the instance is wired to
        expected: u8,
        /// Bus requested in the config
        requested: u8,
    },
    /// Operation attempted before `begin()` or after `end()`
    NotInitialized,
    /// Buffer exceeds the configured `max_transfer_sz`
    TransferTooLarge {
        /// Buffer length
        len: usize,
        /// Configured limit
        max: usize,
    },
    /// Scratch/DMA buffer growth failed
    Allocation,
    /// Peripheral or DMA resources already claimed elsewhere
    ResourceUnavailable(&'static str),
    /// This platform offers no backend of the requested family
    Unsupported(LaneWidth),
    /// Every backend of the requested family is already initialized
    AllInUse(LaneWidth),
    /// Hardware did not signal completion in time
    Timeout,
}

impl BackendError {
    /// Short static diagnostic, suitable for `WriteResult`-style reporting.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match *self {
            Self::InvalidPins(msg) | Self::InvalidClock(msg) | Self::ResourceUnavailable(msg) => {
                msg
            }
            Self::BusMismatch { .. } => "Bus ID mismatch",
            Self::NotInitialized => "Backend not initialized",
            Self::TransferTooLarge { .. } => "Transfer exceeds max_transfer_sz",
            Self::Allocation => "Failed to allocate DMA buffer",
            Self::Unsupported(_) => "SPI hardware not available on this platform",
            Self::AllInUse(_) => "All SPI controllers already in use",
            Self::Timeout => "Transfer did not complete before timeout",
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BackendError {}

impl core::fmt::Display for BackendError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BusMismatch {
                expected,
                requested,
            } => write!(
                f,
                "Bus ID mismatch: instance is bus {expected}, config requested bus {requested}"
            ),
            Self::TransferTooLarge { len, max } => {
                write!(f, "Transfer of {len} bytes exceeds max_transfer_sz {max}")
            }
            Self::Unsupported(width) => write!(f, "{} hardware not available", width.label()),
            Self::AllInUse(width) => {
                write!(f, "All {} controllers already in use", width.label())
            }
            other => f.write_str(other.message()),
        }
    }
}

/// Platform driver for one multi-lane SPI peripheral.
///
/// Implementations own their scratch/DMA buffer (see [`crate::dma::ScratchBuffer`])
/// and serialize access to the underlying hardware: a second `transmit()`
/// waits for the first to finish.
pub trait SpiBackend {
    /// Lane-count family this instance drives.
    fn width(&self) -> LaneWidth;

    /// Validate `config`, compute the clock divider and claim hardware.
    ///
    /// All-or-nothing: on error the backend stays uninitialized. Calling
    /// `begin` on an initialized backend is a no-op.
    fn begin(&mut self, config: &BackendConfig) -> Result<(), BackendError>;

    /// Wait for any active transfer, release hardware and free scratch memory.
    fn end(&mut self) -> impl core::future::Future<Output = ()>;

    /// Queue an already-interleaved buffer for transmission.
    ///
    /// Waits first if a previous transfer on this instance is still active.
    /// With [`TransmitMode::Sync`] it also waits for this transfer.
    fn transmit(
        &mut self,
        buffer: &[u8],
        mode: TransmitMode,
    ) -> impl core::future::Future<Output = Result<(), BackendError>>;

    /// Wait for the active transfer, up to `timeout_ms` (`WAIT_FOREVER` = no limit).
    ///
    /// Returns `false` only on timeout. A timeout does not cancel the transfer.
    fn wait_complete(&mut self, timeout_ms: u32) -> impl core::future::Future<Output = bool>;

    /// Transfer in flight
    fn is_busy(&self) -> bool;

    /// `begin()` succeeded and `end()` has not been called since
    fn is_initialized(&self) -> bool;

    /// Hardware bus number of this instance
    fn bus_id(&self) -> u8;

    /// Human-readable instance name
    fn name(&self) -> &'static str;
}
