//! Hardware abstraction for multi-lane SPI LED output
//!
//! This crate defines the contract between the device layer (`multilane`)
//! and platform drivers that clock interleaved data out over 1, 2, 4 or 8
//! data wires sharing one clock.
//!
//! # Architecture Layers
//!
//! ```text
//! Application (fills lanes, flushes frames)
//!         ↓
//! multilane (lanes, bit transposer, device lifecycle)
//!         ↓
//! Platform contract (this crate - SpiBackend, registry)
//!         ↓
//! Platform drivers (DMA SPI peripheral, PIO state machine, ...)
//! ```
//!
//! # Modules
//!
//! - [`backend`] - [`SpiBackend`] trait, [`BackendConfig`], [`BackendError`]
//! - [`registry`] - backend discovery and allocation by lane-count family
//! - [`gpio`] - pin assignment validation
//! - [`clock_config`] - fixed-point clock divider math
//! - [`dma`] - grow-only scratch buffer and completion waits
//! - [`config`] - crate-wide limits and sentinels
//!
//! # Features
//!
//! - `std`: `std::error::Error` impls and the [`mocks`] module
//! - `defmt`: `defmt::Format` derives on all public types
//!
//! # Example
//!
//! ```no_run
//! use platform::{SpiBackend, TransmitMode, WAIT_FOREVER};
//!
//! async fn send<B: SpiBackend>(backend: &mut B, frame: &[u8]) {
//!     if backend.transmit(frame, TransmitMode::Async).await.is_ok() {
//!         backend.wait_complete(WAIT_FOREVER).await;
//!     }
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![allow(clippy::doc_markdown)] // register and GPIO names in doc comments
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)] // accessors on config types
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)] // Embassy no_std: single-threaded, Send bounds not needed

extern crate alloc;

pub mod backend;
pub mod clock_config;
pub mod config;
pub mod dma;
pub mod gpio;
pub mod peripheral;
pub mod registry;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

pub use backend::{BackendConfig, BackendError, LaneWidth, SpiBackend, TransmitMode};
pub use clock_config::{ClockDivider, ClockDomain};
pub use config::{FASTEST_CLOCK_HZ, MAX_BACKENDS, MAX_LANES, UNLIMITED_TRANSFER, WAIT_FOREVER};
pub use dma::ScratchBuffer;
pub use peripheral::SpiMode;
pub use registry::{BackendFactory, BackendRegistry};
