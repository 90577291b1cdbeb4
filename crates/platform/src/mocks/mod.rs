//! Mock backends for testing
//!
//! [`MockBackend`] implements the full [`SpiBackend`] contract (pin and
//! clock validation, scratch buffer, busy tracking) without hardware. Every
//! transmitted frame is captured, and an event log records the order of
//! lifecycle calls. Completion is simulated by counting polls, so tests can
//! model slow or stuck hardware deterministically.

use alloc::vec::Vec;

use crate::backend::{BackendConfig, BackendError, LaneWidth, SpiBackend, TransmitMode};
use crate::clock_config::{ClockDivider, ClockDomain, PIO_SYS_125MHZ};
use crate::config::{MAX_BACKENDS, WAIT_FOREVER};
use crate::dma::{self, ScratchBuffer};
use crate::gpio;
use crate::registry::BackendFactory;

/// Lifecycle event recorded by [`MockBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockEvent {
    /// `begin()` succeeded on this bus
    Begin {
        /// Bus number from the config
        bus: u8,
    },
    /// A non-empty frame was queued
    Transmit {
        /// Frame length in bytes
        len: usize,
    },
    /// The simulated hardware finished the active frame
    Complete,
    /// `end()` released the backend
    End,
}

/// Simulated multi-lane SPI peripheral.
pub struct MockBackend {
    width: LaneWidth,
    bus_id: u8,
    name: &'static str,
    domain: ClockDomain,
    consecutive_pins: bool,
    config: Option<BackendConfig>,
    divider: Option<ClockDivider>,
    busy: bool,
    completion_polls: u32,
    pending_polls: u32,
    stuck: bool,
    fail_begin: Option<BackendError>,
    scratch: ScratchBuffer,
    transmissions: Vec<Vec<u8>>,
    events: Vec<MockEvent>,
}

impl MockBackend {
    /// Create a mock of `width` wired to `bus_id`.
    ///
    /// Defaults: RP2040-style PIO clock domain, transfers finish on the first
    /// completion poll.
    pub fn new(width: LaneWidth, bus_id: u8, name: &'static str) -> Self {
        Self {
            width,
            bus_id,
            name,
            domain: PIO_SYS_125MHZ,
            consecutive_pins: false,
            config: None,
            divider: None,
            busy: false,
            completion_polls: 0,
            pending_polls: 0,
            stuck: false,
            fail_begin: None,
            scratch: ScratchBuffer::new(),
            transmissions: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Number of extra completion polls each transfer takes.
    #[must_use]
    pub fn with_completion_polls(mut self, polls: u32) -> Self {
        self.completion_polls = polls;
        self
    }

    /// Clock domain used for divider computation.
    #[must_use]
    pub fn with_clock_domain(mut self, domain: ClockDomain) -> Self {
        self.domain = domain;
        self
    }

    /// Require consecutive data GPIOs, like a PIO pin group.
    #[must_use]
    pub fn with_consecutive_pins(mut self) -> Self {
        self.consecutive_pins = true;
        self
    }

    /// Freeze (or unfreeze) the simulated hardware: while stuck, an active
    /// transfer never completes.
    pub fn set_stuck(&mut self, stuck: bool) {
        self.stuck = stuck;
    }

    /// Make the next `begin()` fail with `error`.
    pub fn fail_next_begin(&mut self, error: BackendError) {
        self.fail_begin = Some(error);
    }

    /// Advance the simulated hardware by one poll.
    ///
    /// Returns `true` once no transfer is active.
    pub fn poll_hardware(&mut self) -> bool {
        if !self.busy {
            return true;
        }
        if self.stuck {
            return false;
        }
        if let Some(remaining) = self.pending_polls.checked_sub(1) {
            self.pending_polls = remaining;
            return false;
        }
        self.busy = false;
        self.events.push(MockEvent::Complete);
        true
    }

    /// Every frame transmitted so far, oldest first.
    pub fn transmissions(&self) -> &[Vec<u8>] {
        &self.transmissions
    }

    /// Most recent frame, if any.
    pub fn last_transmission(&self) -> Option<&[u8]> {
        self.transmissions.last().map(Vec::as_slice)
    }

    /// Number of non-empty frames transmitted.
    pub fn transmit_count(&self) -> usize {
        self.transmissions.len()
    }

    /// Lifecycle log, oldest first.
    pub fn events(&self) -> &[MockEvent] {
        &self.events
    }

    /// Config accepted by the last successful `begin()`.
    pub fn config(&self) -> Option<&BackendConfig> {
        self.config.as_ref()
    }

    /// Divider computed by the last successful `begin()`.
    pub fn divider(&self) -> Option<ClockDivider> {
        self.divider
    }

    /// Bit clock the simulated hardware runs at.
    pub fn actual_clock_hz(&self) -> Option<u32> {
        self.divider.map(|divider| self.domain.actual_hz(divider))
    }

    /// Bytes reserved by the scratch buffer.
    pub fn scratch_capacity(&self) -> usize {
        self.scratch.capacity()
    }
}

impl SpiBackend for MockBackend {
    fn width(&self) -> LaneWidth {
        self.width
    }

    fn begin(&mut self, config: &BackendConfig) -> Result<(), BackendError> {
        if self.config.is_some() {
            return Ok(());
        }
        if let Some(error) = self.fail_begin.take() {
            return Err(error);
        }
        if config.bus_num != self.bus_id {
            return Err(BackendError::BusMismatch {
                expected: self.bus_id,
                requested: config.bus_num,
            });
        }
        gpio::validate_pins(config.clock_pin, &config.data_pins, self.width)?;
        if self.consecutive_pins {
            gpio::require_consecutive(&config.data_pins)?;
        }
        let divider = self.domain.divider_for(config.clock_speed_hz)?;

        self.divider = Some(divider);
        self.config = Some(*config);
        self.events.push(MockEvent::Begin {
            bus: config.bus_num,
        });
        Ok(())
    }

    async fn end(&mut self) {
        if self.config.is_none() {
            return;
        }
        self.wait_complete(WAIT_FOREVER).await;
        self.scratch.release();
        self.config = None;
        self.divider = None;
        self.events.push(MockEvent::End);
    }

    async fn transmit(&mut self, buffer: &[u8], mode: TransmitMode) -> Result<(), BackendError> {
        let Some(config) = self.config else {
            return Err(BackendError::NotInitialized);
        };
        self.wait_complete(WAIT_FOREVER).await;

        if !config.accepts_transfer(buffer.len()) {
            return Err(BackendError::TransferTooLarge {
                len: buffer.len(),
                max: config.max_transfer_sz,
            });
        }
        if buffer.is_empty() {
            return Ok(());
        }

        let frame = self.scratch.load(buffer)?;
        self.transmissions.push(frame.to_vec());
        self.events.push(MockEvent::Transmit { len: buffer.len() });
        self.busy = true;
        self.pending_polls = self.completion_polls;

        if mode == TransmitMode::Sync {
            self.wait_complete(WAIT_FOREVER).await;
        }
        Ok(())
    }

    async fn wait_complete(&mut self, timeout_ms: u32) -> bool {
        if !self.busy {
            return true;
        }
        dma::wait_until(timeout_ms, || self.poll_hardware()).await
    }

    fn is_busy(&self) -> bool {
        self.busy
    }

    fn is_initialized(&self) -> bool {
        self.config.is_some()
    }

    fn bus_id(&self) -> u8 {
        self.bus_id
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Instance names, two buses per family.
const MOCK_NAMES: [[&str; 2]; 4] = [
    ["mock-single-0", "mock-single-1"],
    ["mock-dual-0", "mock-dual-1"],
    ["mock-quad-0", "mock-quad-1"],
    ["mock-octal-0", "mock-octal-1"],
];

/// Factory producing two [`MockBackend`]s per enabled family.
///
/// Bus numbers are assigned in discovery order: Single 0–1, Dual 2–3,
/// Quad 4–5, Octal 6–7 (with all families enabled).
pub struct MockFactory {
    families: heapless::Vec<LaneWidth, 4>,
    completion_polls: u32,
}

impl Default for MockFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFactory {
    /// Every family available.
    pub fn new() -> Self {
        Self::only(&LaneWidth::ALL)
    }

    /// Only the listed families (duplicates ignored).
    pub fn only(widths: &[LaneWidth]) -> Self {
        let mut families = heapless::Vec::new();
        for width in LaneWidth::ALL {
            if widths.contains(&width) {
                // At most four families, matching the capacity
                let _ = families.push(width);
            }
        }
        Self {
            families,
            completion_polls: 0,
        }
    }

    /// Completion latency applied to every produced backend.
    #[must_use]
    pub fn with_completion_polls(mut self, polls: u32) -> Self {
        self.completion_polls = polls;
        self
    }
}

impl BackendFactory for MockFactory {
    type Backend = MockBackend;

    fn create_backends(&self, out: &mut heapless::Vec<MockBackend, MAX_BACKENDS>) {
        let mut bus_id = 0u8;
        for (width, names) in LaneWidth::ALL.iter().zip(MOCK_NAMES) {
            if !self.families.contains(width) {
                continue;
            }
            for name in names {
                let backend = MockBackend::new(*width, bus_id, name)
                    .with_completion_polls(self.completion_polls);
                if out.push(backend).is_err() {
                    return;
                }
                bus_id = bus_id.saturating_add(1);
            }
        }
    }
}
