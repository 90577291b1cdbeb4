//! Scratch (DMA-capable) buffer management and completion waits
//!
//! Backends copy each interleaved frame into memory the peripheral can read
//! while the caller goes on refilling its lanes. The scratch buffer grows to
//! the largest frame ever requested and keeps that size until `end()`, so a
//! steady animation loop allocates once.

use alloc::vec::Vec;

use embassy_time::{with_timeout, Duration};

use crate::backend::BackendError;
use crate::config::WAIT_FOREVER;

/// Grow-only transfer buffer owned by one backend instance.
#[derive(Debug, Default)]
pub struct ScratchBuffer {
    buf: Vec<u8>,
}

impl ScratchBuffer {
    /// Empty buffer; no memory is reserved until the first `acquire`.
    #[must_use]
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Borrow `len` bytes, growing the buffer if it is too small.
    ///
    /// Growth is fallible: an allocation failure leaves the previous buffer
    /// intact and returns [`BackendError::Allocation`].
    pub fn acquire(&mut self, len: usize) -> Result<&mut [u8], BackendError> {
        if let Some(extra) = len.checked_sub(self.buf.len()).filter(|extra| *extra > 0) {
            self.buf
                .try_reserve_exact(extra)
                .map_err(|_| BackendError::Allocation)?;
            self.buf.resize(len, 0);
        }
        self.buf.get_mut(..len).ok_or(BackendError::Allocation)
    }

    /// Acquire `data.len()` bytes and copy `data` into them.
    pub fn load(&mut self, data: &[u8]) -> Result<&[u8], BackendError> {
        let dst = self.acquire(data.len())?;
        dst.copy_from_slice(data);
        Ok(dst)
    }

    /// Bytes currently reserved (the largest size acquired since `release`).
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Free the buffer. Called from a backend's `end()`.
    pub fn release(&mut self) {
        self.buf = Vec::new();
    }
}

/// Poll `done` until it returns `true`, yielding to the executor between polls.
///
/// Returns `false` if `timeout_ms` elapses first. [`WAIT_FOREVER`] disables
/// the timeout. Timing out does not touch the hardware; the transfer keeps
/// running.
pub async fn wait_until<F>(timeout_ms: u32, mut done: F) -> bool
where
    F: FnMut() -> bool,
{
    let poll = async move {
        while !done() {
            embassy_futures::yield_now().await;
        }
    };

    if timeout_ms == WAIT_FOREVER {
        poll.await;
        return true;
    }
    with_timeout(Duration::from_millis(u64::from(timeout_ms)), poll)
        .await
        .is_ok()
}
