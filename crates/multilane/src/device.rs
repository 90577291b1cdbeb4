//! Multi-lane SPI device
//!
//! Owns one backend, one [`Lane`] per data pin and a staging buffer for the
//! interleaved frame.
//!
//! # State Machine
//!
//! ```text
//! Uninitialized ──begin()──> Ready ──flush()──> Busy
//!       ^                      ^                  │
//!       │                      └──── complete ────┘
//!       └────────────── end() (waits) ────────────┘
//! ```
//!
//! There is no async drop: call [`MultiLaneDevice::end`] (or
//! [`MultiLaneDevice::release`]) before discarding a device, otherwise the
//! backend keeps its hardware claimed.

use alloc::vec::Vec;

use platform::{
    BackendRegistry, LaneWidth, SpiBackend, TransmitMode, MAX_LANES, WAIT_FOREVER,
};

use crate::config::Config;
use crate::error::{Error, WriteResult};
use crate::lane::Lane;
use crate::transaction::Transaction;
use crate::transpose::{interleaved_len, transpose, LaneSlot};

/// Device lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    /// `begin()` not called, failed, or `end()` called
    Uninitialized,
    /// Idle, ready for a frame
    Ready,
    /// A frame is clocking out
    Busy,
}

/// Lanes + transposer + backend.
pub struct MultiLaneDevice<B: SpiBackend> {
    config: Config,
    backend: B,
    lanes: heapless::Vec<Lane, MAX_LANES>,
    staging: Vec<u8>,
    initialized: bool,
    sequence: u32,
}

impl<B: SpiBackend> MultiLaneDevice<B> {
    /// Device driving `backend`. No hardware is touched until [`begin`](Self::begin).
    pub fn new(config: Config, backend: B) -> Self {
        let mut lanes = heapless::Vec::new();
        for index in 0..config.data_pins.len() {
            // data_pins holds at most MAX_LANES entries
            let index = u8::try_from(index).unwrap_or(u8::MAX);
            let _ = lanes.push(Lane::new(index));
        }
        Self {
            config,
            backend,
            lanes,
            staging: Vec::new(),
            initialized: false,
            sequence: 0,
        }
    }

    /// Claim a backend for `config` from `registry`.
    ///
    /// The family follows the data pin count: 1 → Single, 2 → Dual,
    /// 3–4 → Quad, 5–8 → Octal.
    ///
    /// # Errors
    ///
    /// [`Error::Backend`] with `Unsupported` when the platform has no such
    /// family, or `AllInUse` when every instance is taken.
    pub fn from_registry(config: Config, registry: &mut BackendRegistry<B>) -> Result<Self, Error> {
        let width = LaneWidth::for_lane_count(config.num_lanes())
            .ok_or(Error::Config("Data pin count must be 1 to 8"))?;
        let backend = registry.claim(width)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("multilane: claimed {} for {} lanes", backend.name(), config.num_lanes());
        #[cfg(feature = "tracing")]
        tracing::debug!(backend = backend.name(), lanes = config.num_lanes(), "claimed backend");

        Ok(Self::new(config, backend))
    }

    /// End the device and hand its backend back to `registry`.
    ///
    /// Returns the backend if the registry has no room for it.
    pub async fn release(mut self, registry: &mut BackendRegistry<B>) -> Result<(), B> {
        self.end().await;
        registry.release(self.backend)
    }

    /// Configure the backend. Idempotent.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the backend has fewer wires than data pins
    /// - [`Error::Backend`] if the backend rejects pins or clock
    pub fn begin(&mut self) -> Result<(), Error> {
        if self.initialized {
            return Ok(());
        }
        if self.backend.width().lanes() < self.num_lanes() {
            return Err(Error::Config("Backend has fewer lanes than data pins"));
        }
        let backend_config = self.config.backend_config(self.backend.bus_id());
        if let Err(err) = self.backend.begin(&backend_config) {
            #[cfg(feature = "defmt")]
            defmt::warn!("multilane: {} begin failed: {}", self.backend.name(), err);
            #[cfg(feature = "tracing")]
            tracing::warn!(backend = self.backend.name(), error = %err, "begin failed");
            return Err(err.into());
        }
        self.initialized = true;

        #[cfg(feature = "defmt")]
        defmt::debug!("multilane: {} ready, {} lanes", self.backend.name(), self.num_lanes());
        #[cfg(feature = "tracing")]
        tracing::debug!(backend = self.backend.name(), lanes = self.num_lanes(), "device ready");
        Ok(())
    }

    /// Wait for the active frame, release the backend and free lane memory.
    ///
    /// No-op when not initialized.
    pub async fn end(&mut self) {
        if !self.initialized {
            return;
        }
        self.backend.wait_complete(WAIT_FOREVER).await;
        self.backend.end().await;
        for lane in &mut self.lanes {
            lane.release();
        }
        self.staging = Vec::new();
        self.initialized = false;

        #[cfg(feature = "defmt")]
        defmt::debug!("multilane: {} shut down", self.backend.name());
        #[cfg(feature = "tracing")]
        tracing::debug!(backend = self.backend.name(), "device shut down");
    }

    /// Lane `index`.
    ///
    /// # Panics
    ///
    /// If `index >= num_lanes()`; use [`try_lane`](Self::try_lane) for a
    /// checked lookup.
    #[track_caller]
    #[allow(clippy::indexing_slicing)] // Out-of-range lane index is a caller bug
    pub fn lane(&mut self, index: usize) -> &mut Lane {
        &mut self.lanes[index]
    }

    /// Lane `index`, or `None` if out of range.
    pub fn try_lane(&mut self, index: usize) -> Option<&mut Lane> {
        self.lanes.get_mut(index)
    }

    /// Number of lanes (data pins)
    pub fn num_lanes(&self) -> usize {
        self.lanes.len()
    }

    /// Transpose the lanes and start transmitting.
    ///
    /// Waits for the previous frame if it is still clocking out. The lanes
    /// are empty when this returns successfully.
    ///
    /// # Errors
    ///
    /// [`Error::NotInitialized`], [`Error::Allocation`] for the staging
    /// buffer, [`Error::Transpose`] or [`Error::Backend`].
    pub async fn flush(&mut self) -> Result<Transaction<'_, B>, Error> {
        self.ensure_initialized()?;
        self.start_frame().await
    }

    /// Like [`flush`](Self::flush) but refuses to wait.
    ///
    /// # Errors
    ///
    /// [`Error::Busy`] if the previous frame is still active, otherwise as
    /// `flush`.
    pub async fn try_flush(&mut self) -> Result<Transaction<'_, B>, Error> {
        self.ensure_initialized()?;
        if self.backend.is_busy() {
            return Err(Error::Busy);
        }
        self.start_frame().await
    }

    /// Wait for the active frame; `false` on timeout or when not initialized.
    pub async fn wait_complete(&mut self, timeout_ms: u32) -> bool {
        if !self.initialized {
            return false;
        }
        self.backend.wait_complete(timeout_ms).await
    }

    /// Copy one span per lane, then flush.
    ///
    /// Waits for the previous frame first. Spans are appended to whatever
    /// the lanes already hold; if any lane cannot grow, no lane changes.
    /// Never panics.
    pub async fn write(&mut self, spans: &[&[u8]]) -> WriteResult {
        WriteResult::from(self.write_frame(spans).await)
    }

    async fn write_frame(&mut self, spans: &[&[u8]]) -> Result<(), Error> {
        self.ensure_initialized()?;
        if spans.len() > self.num_lanes() {
            #[cfg(feature = "defmt")]
            defmt::warn!("multilane: {} spans for {} lanes", spans.len(), self.num_lanes());
            #[cfg(feature = "tracing")]
            tracing::warn!(spans = spans.len(), lanes = self.num_lanes(), "too many spans");
            return Err(Error::Config("Too many lanes for this device"));
        }
        self.backend.wait_complete(WAIT_FOREVER).await;
        self.append_spans(spans)?;
        self.start_frame().await.map(drop)
    }

    fn append_spans(&mut self, spans: &[&[u8]]) -> Result<(), Error> {
        let mut previous = [0usize; MAX_LANES];
        for (len, lane) in previous.iter_mut().zip(&self.lanes) {
            *len = lane.len();
        }
        let result = self
            .lanes
            .iter_mut()
            .zip(spans)
            .try_for_each(|(lane, span)| lane.write(span));
        if result.is_err() {
            for (lane, len) in self.lanes.iter_mut().zip(previous) {
                lane.truncate(len);
            }
        }
        result
    }

    async fn start_frame(&mut self) -> Result<Transaction<'_, B>, Error> {
        let width = self.backend.width();
        let max_len = self.lanes.iter().map(Lane::len).max().unwrap_or(0);
        let total = interleaved_len(width, max_len);

        self.staging.clear();
        self.staging
            .try_reserve(total)
            .map_err(|_| Error::Allocation)?;
        self.staging.resize(total, 0);

        let mut slots = [LaneSlot::Absent; MAX_LANES];
        for (slot, lane) in slots.iter_mut().zip(&self.lanes) {
            *slot = LaneSlot::present(lane.data(), &self.config.padding);
        }
        let used = slots.get(..self.lanes.len()).unwrap_or(&[]);
        transpose(width, used, &mut self.staging)?;

        for lane in &mut self.lanes {
            lane.clear();
        }
        self.sequence = self.sequence.wrapping_add(1);

        if total > 0 {
            self.backend
                .transmit(&self.staging, TransmitMode::Async)
                .await?;
        }
        Ok(Transaction::new(&mut self.backend, total, self.sequence))
    }

    /// Transfer in flight (`false` when not initialized)
    pub fn is_busy(&self) -> bool {
        self.initialized && self.backend.is_busy()
    }

    /// Current lifecycle state
    pub fn state(&self) -> DeviceState {
        match (self.initialized, self.backend.is_busy()) {
            (false, _) => DeviceState::Uninitialized,
            (true, true) => DeviceState::Busy,
            (true, false) => DeviceState::Ready,
        }
    }

    /// Configuration the device was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Underlying backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Underlying backend, mutably (diagnostics and test doubles)
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn ensure_initialized(&self) -> Result<(), Error> {
        if self.initialized {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }
}
