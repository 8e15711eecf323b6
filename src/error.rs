//! Common error definitions.

use crate::{clocks::ClockError, gpio::PinError, vectors::VectorError};

macro_rules! impl_from_error {
    ($error:ident) => {
        impl From<$error> for Error {
            fn from(error: $error) -> Self {
                Self::$error(error)
            }
        }
    };
}

/// Alias for Result<T, Error>.
pub type Result<T> = core::result::Result<T, Error>;

/// Collection of all errors that can occur.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Clock configuration errors.
    ClockError(ClockError),
    /// Pin map errors.
    PinError(PinError),
    VectorError(VectorError),
}

impl_from_error!(ClockError);
impl_from_error!(PinError);
impl_from_error!(VectorError);

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ClockError(e) => write!(f, "clocks: {e}"),
            Self::PinError(e) => write!(f, "pins: {e}"),
            Self::VectorError(e) => write!(f, "vectors: {e}"),
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::ClockError(e) => Some(e),
            Self::PinError(e) => Some(e),
            Self::VectorError(e) => Some(e),
        }
    }
}
