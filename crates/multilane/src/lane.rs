//! Per-lane byte accumulator

use alloc::vec::Vec;

use crate::error::Error;

/// Growable byte buffer for one data wire.
///
/// Bytes accumulate until the device flushes, which empties the lane but
/// keeps its capacity for the next frame.
#[derive(Debug)]
pub struct Lane {
    index: u8,
    buffer: Vec<u8>,
}

impl Lane {
    pub(crate) const fn new(index: u8) -> Self {
        Self {
            index,
            buffer: Vec::new(),
        }
    }

    /// Lane number (data wire D`index`).
    pub const fn index(&self) -> u8 {
        self.index
    }

    /// Append `data`.
    ///
    /// All-or-nothing: on allocation failure the lane is unchanged.
    pub fn write(&mut self, data: &[u8]) -> Result<(), Error> {
        self.buffer
            .try_reserve(data.len())
            .map_err(|_| Error::Allocation)?;
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    /// Append one byte.
    pub fn push(&mut self, byte: u8) -> Result<(), Error> {
        self.write(core::slice::from_ref(&byte))
    }

    /// Pre-allocate room for `additional` more bytes.
    pub fn reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.buffer
            .try_reserve(additional)
            .map_err(|_| Error::Allocation)
    }

    /// Bytes written since the last flush
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Number of bytes written since the last flush
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Nothing written since the last flush
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes the lane can hold without reallocating
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Drop the contents, keeping capacity.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Cut back to `len` bytes; used to roll back a partial multi-lane write.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.buffer.truncate(len);
    }

    /// Free the buffer memory.
    pub(crate) fn release(&mut self) {
        self.buffer = Vec::new();
    }
}
