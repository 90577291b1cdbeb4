//! Device errors and the `write()` result type

use platform::BackendError;

use crate::transpose::TransposeError;

/// Multi-lane device errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Invalid device configuration or API misuse (e.g. too many lanes)
    Config(&'static str),
    /// Interleaving failed
    Transpose(TransposeError),
    /// `begin()` has not succeeded (or `end()` was called)
    NotInitialized,
    /// A transmission is still active and the call does not wait
    Busy,
    /// Lane or staging buffer growth failed
    Allocation,
    /// Backend rejected the request
    Backend(BackendError),
}

impl Error {
    /// Short static diagnostic.
    pub const fn message(&self) -> &'static str {
        match *self {
            Self::Config(msg) => msg,
            Self::Transpose(err) => err.message(),
            Self::NotInitialized => "Device not initialized",
            Self::Busy => "Transmission still in progress",
            Self::Allocation => "Failed to allocate lane buffer",
            Self::Backend(err) => err.message(),
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Transpose(err) => write!(f, "Transpose failed: {err}"),
            Self::Backend(err) => write!(f, "Backend error: {err}"),
            other => f.write_str(other.message()),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transpose(err) => Some(err),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TransposeError> for Error {
    fn from(err: TransposeError) -> Self {
        Self::Transpose(err)
    }
}

impl From<BackendError> for Error {
    fn from(err: BackendError) -> Self {
        Self::Backend(err)
    }
}

/// Outcome of [`MultiLaneDevice::write`](crate::MultiLaneDevice::write).
///
/// Branch on `ok`; `error` is a diagnostic for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use]
pub struct WriteResult {
    /// The data was queued for transmission
    pub ok: bool,
    /// Why not, when `ok` is false
    pub error: Option<Error>,
}

impl WriteResult {
    /// Successful write
    pub const fn success() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    /// Failed write
    pub const fn failure(error: Error) -> Self {
        Self {
            ok: false,
            error: Some(error),
        }
    }

    /// Same as reading `ok`
    pub const fn is_ok(&self) -> bool {
        self.ok
    }

    /// Diagnostic text, empty on success.
    pub const fn message(&self) -> &'static str {
        match &self.error {
            Some(err) => err.message(),
            None => "",
        }
    }

    /// Convert into a `Result` for `?` propagation.
    pub fn into_result(self) -> Result<(), Error> {
        match self.error {
            Some(err) if !self.ok => Err(err),
            _ => Ok(()),
        }
    }
}

impl From<Result<(), Error>> for WriteResult {
    fn from(result: Result<(), Error>) -> Self {
        match result {
            Ok(()) => Self::success(),
            Err(err) => Self::failure(err),
        }
    }
}
