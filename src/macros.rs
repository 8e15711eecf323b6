//! This module contains utility macros that are internal to this library. The logging
//! macros forward to `defmt` when the `defmt` feature is enabled, and otherwise compile
//! to nothing, so host builds (eg a build script running the resolver) don't need a
//! global logger.
//!
//! Arguments are still referenced when logging is off, so call sites don't trip
//! unused-variable lints.

/// Log at `trace` level. Used for per-candidate detail, eg each PLL multiplier tried.
macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt")]
            ::defmt::trace!($s $(, $x)*);
            #[cfg(not(feature = "defmt"))]
            let _ = ($( & $x ),*);
        }
    };
}

/// Log at `debug` level.
macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt")]
            ::defmt::debug!($s $(, $x)*);
            #[cfg(not(feature = "defmt"))]
            let _ = ($( & $x ),*);
        }
    };
}

/// Log at `warn` level. Used for rejected descriptions, and for resolutions that
/// succeed but don't hit what was asked for.
macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt")]
            ::defmt::warn!($s $(, $x)*);
            #[cfg(not(feature = "defmt"))]
            let _ = ($( & $x ),*);
        }
    };
}

/// Syntax helper for the `Display` impls of our error enums: maps each variant pattern
/// to a format string and its arguments.
///
/// Example:
/// ```ignore
/// impl_display!(ClockError, self, f, {
///     Self::MissingExternalFrequency => ("external oscillator requested without a frequency"),
/// });
/// ```
macro_rules! impl_display {
    ($t:ty, $self:ident, $f:ident, { $($pat:pat => ($($fmt:tt)+)),+ $(,)? }) => {
        impl core::fmt::Display for $t {
            fn fmt(&$self, $f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                match $self {
                    $(
                        $pat => write!($f, $($fmt)+),
                    )+
                }
            }
        }

        impl core::error::Error for $t {}
    };
}
