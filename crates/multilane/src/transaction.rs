//! Handle for one in-flight frame

use embassy_time::Duration;
use platform::{SpiBackend, WAIT_FOREVER};

/// One queued frame, returned by `flush()`.
///
/// Dropping the handle does not cancel anything: the hardware keeps clocking
/// and the device waits for it before the next frame.
#[must_use = "call wait() or drop explicitly to ignore completion"]
pub struct Transaction<'d, B: SpiBackend> {
    backend: &'d mut B,
    len: usize,
    sequence: u32,
}

impl<'d, B: SpiBackend> Transaction<'d, B> {
    pub(crate) fn new(backend: &'d mut B, len: usize, sequence: u32) -> Self {
        Self {
            backend,
            len,
            sequence,
        }
    }

    /// Wait for the frame to finish clocking out.
    pub async fn wait(self) -> bool {
        self.wait_timeout(WAIT_FOREVER).await
    }

    /// Wait up to `timeout_ms`; `false` on timeout (the frame keeps going).
    pub async fn wait_timeout(self, timeout_ms: u32) -> bool {
        if self.len == 0 {
            return true;
        }
        self.backend.wait_complete(timeout_ms).await
    }

    /// [`wait_timeout`](Self::wait_timeout) with an `embassy_time` duration.
    pub async fn wait_for(self, timeout: Duration) -> bool {
        let timeout_ms = u32::try_from(timeout.as_millis())
            .unwrap_or(WAIT_FOREVER)
            .min(WAIT_FOREVER.saturating_sub(1));
        self.wait_timeout(timeout_ms).await
    }

    /// Non-blocking completion check.
    pub fn is_done(&self) -> bool {
        self.len == 0 || !self.backend.is_busy()
    }

    /// Interleaved bytes in this frame (0 when every lane was empty).
    pub fn len(&self) -> usize {
        self.len
    }

    /// Nothing was transmitted
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Per-device frame counter, starting at 1.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}
