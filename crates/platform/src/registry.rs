//! Backend discovery and allocation
//!
//! A platform exposes a fixed set of backend instances (e.g. two general
//! purpose SPI hosts, a handful of PIO state machines). A [`BackendFactory`]
//! enumerates them once; the [`BackendRegistry`] then hands them out to
//! devices by lane-count family and takes them back on release.
//!
//! The registry is a plain value. Firmware places it in a `StaticCell` at
//! boot via [`BackendRegistry::init_static`]; tests build one per test.

use heapless::Vec;
use static_cell::StaticCell;

use crate::backend::{BackendError, LaneWidth, SpiBackend};
use crate::config::MAX_BACKENDS;

/// Produces the backend instances available on the running platform.
pub trait BackendFactory {
    /// Concrete backend type
    type Backend: SpiBackend;

    /// Push every available instance into `out`.
    ///
    /// Platforms without multi-lane hardware push nothing.
    fn create_backends(&self, out: &mut Vec<Self::Backend, MAX_BACKENDS>);
}

/// Owning pool of backend instances.
pub struct BackendRegistry<B: SpiBackend> {
    backends: Vec<B, MAX_BACKENDS>,
    // Bit set of `LaneWidth` discriminants ever present on this platform.
    families: u8,
}

impl<B: SpiBackend> Default for BackendRegistry<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: SpiBackend> BackendRegistry<B> {
    /// Empty registry (a platform with no multi-lane hardware).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            backends: Vec::new(),
            families: 0,
        }
    }

    /// Enumerate the platform's backends through `factory`.
    pub fn discover<F>(factory: &F) -> Self
    where
        F: BackendFactory<Backend = B>,
    {
        let mut registry = Self::new();
        factory.create_backends(&mut registry.backends);
        registry.families = registry
            .backends
            .iter()
            .fold(0, |mask, backend| mask | family_bit(backend.width()));
        registry
    }

    /// Place a discovered registry in `cell` for the rest of the program.
    ///
    /// Returns `None` if the cell was already initialized.
    pub fn init_static<F>(cell: &'static StaticCell<Self>, factory: &F) -> Option<&'static mut Self>
    where
        F: BackendFactory<Backend = B>,
    {
        cell.try_init(Self::discover(factory))
    }

    /// Instances currently held (not claimed), in discovery order.
    #[must_use]
    pub fn get_all(&self) -> &[B] {
        &self.backends
    }

    /// Mutable view of the held instances.
    pub fn get_all_mut(&mut self) -> &mut [B] {
        &mut self.backends
    }

    /// Number of held instances
    #[must_use]
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// No instances held
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// The platform has (or had, before claims) a backend of `width`.
    #[must_use]
    pub const fn supports(&self, width: LaneWidth) -> bool {
        self.families & family_bit(width) != 0
    }

    /// Held, uninitialized instances of `width`.
    #[must_use]
    pub fn available(&self, width: LaneWidth) -> usize {
        self.backends
            .iter()
            .filter(|backend| backend.width() == width && !backend.is_initialized())
            .count()
    }

    /// Take the first uninitialized instance of `width` out of the pool.
    ///
    /// # Errors
    ///
    /// - [`BackendError::Unsupported`] if the platform never had that family
    /// - [`BackendError::AllInUse`] if every instance of it is claimed or
    ///   already initialized
    pub fn claim(&mut self, width: LaneWidth) -> Result<B, BackendError> {
        if !self.supports(width) {
            return Err(BackendError::Unsupported(width));
        }
        let index = self
            .backends
            .iter()
            .position(|backend| backend.width() == width && !backend.is_initialized())
            .ok_or(BackendError::AllInUse(width))?;
        Ok(self.backends.remove(index))
    }

    /// Return a claimed instance to the pool.
    ///
    /// Hands the backend back if the pool is full, which only happens when
    /// releasing an instance this registry never produced.
    pub fn release(&mut self, backend: B) -> Result<(), B> {
        self.families |= family_bit(backend.width());
        self.backends.push(backend)
    }
}

const fn family_bit(width: LaneWidth) -> u8 {
    // Discriminants are 1, 2, 4, 8
    width as u8
}
