//! Multi-lane SPI output for clocked LED strips
//!
//! Up to eight strips share one clock line and are driven in parallel from a
//! single SPI/PIO peripheral. Each strip gets a [`Lane`]; on
//! [`MultiLaneDevice::flush`] the lanes are bit-transposed into one
//! interleaved frame and handed to the platform backend, which clocks it out
//! asynchronously while the caller prepares the next frame.
//!
//! # Example
//!
//! ```no_run
//! use multilane::{padding, Config, MultiLaneDevice};
//! use platform::SpiBackend;
//!
//! async fn show<B: SpiBackend>(backend: B) -> Result<(), multilane::Error> {
//!     let config = Config::new(18, &[23, 22, 21, 19])?.with_padding(padding::APA102)?;
//!     let mut device = MultiLaneDevice::new(config, backend);
//!     device.begin()?;
//!
//!     device.lane(0).write(&[0xE0, 0x00, 0x00, 0xFF])?;
//!     device.lane(1).write(&[0xE0, 0x00, 0xFF, 0x00])?;
//!     device.flush().await?.wait().await;
//!
//!     device.end().await;
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `std`: `std::error::Error` impls
//! - `defmt`: defmt logging and `defmt::Format` derives (firmware)
//! - `tracing`: `tracing` logging (host builds)

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

extern crate alloc;

pub mod config;
pub mod device;
pub mod error;
pub mod lane;
pub mod transaction;
pub mod transpose;

pub use config::{padding, Config, MAX_PADDING_LEN};
pub use device::{DeviceState, MultiLaneDevice};
pub use error::{Error, WriteResult};
pub use lane::Lane;
pub use transaction::Transaction;
pub use transpose::{deinterleave, interleaved_len, max_payload_len, transpose, LaneSlot, TransposeError};

pub use platform::{LaneWidth, SpiMode, FASTEST_CLOCK_HZ, WAIT_FOREVER};
