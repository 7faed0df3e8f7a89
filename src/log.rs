//! Logging facade
//!
//! Forwards to [`defmt`] when the `defmt` feature is enabled and compiles
//! to nothing otherwise, so the core builds and tests on the host.
//!
//! Only pass `Copy` values or references: the no-op variants evaluate the
//! arguments into a tuple.

#[cfg(feature = "defmt")]
macro_rules! debug {
    ($($arg:tt)*) => {{
        defmt::debug!($($arg)*);
    }};
}

#[cfg(feature = "defmt")]
macro_rules! info {
    ($($arg:tt)*) => {{
        defmt::info!($($arg)*);
    }};
}

#[cfg(feature = "defmt")]
macro_rules! warn {
    ($($arg:tt)*) => {{
        defmt::warn!($($arg)*);
    }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! debug {
    ($($arg:tt)*) => {{
        let _ = ($($arg)*);
    }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! info {
    ($($arg:tt)*) => {{
        let _ = ($($arg)*);
    }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! warn {
    ($($arg:tt)*) => {{
        let _ = ($($arg)*);
    }};
}
