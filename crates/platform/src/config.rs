//! Crate-wide limits and sentinel values
//!
//! Every driver, test double and device layer references these constants
//! rather than hardcoding the numbers.

/// Maximum number of data lanes a single backend can drive (octal SPI).
pub const MAX_LANES: usize = 8;

/// Requested clock speed meaning "as fast as the platform safely allows".
///
/// Backends resolve this against their clock domain's maximum output rate.
pub const FASTEST_CLOCK_HZ: u32 = u32::MAX;

/// Timeout value meaning "wait until the transfer completes, however long".
pub const WAIT_FOREVER: u32 = u32::MAX;

/// Upper bound on the number of backend instances a platform may expose.
pub const MAX_BACKENDS: usize = 8;

/// `max_transfer_sz` value meaning "no driver-imposed transfer limit".
pub const UNLIMITED_TRANSFER: usize = 0;

/// Crate version (synchronized with Cargo.toml)
pub const PLATFORM_VERSION: &str = env!("CARGO_PKG_VERSION");
