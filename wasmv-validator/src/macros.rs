//! Logging shims.
//!
//! The `log` facade is only linked with the `std` feature; in `no_std`
//! builds these expand to nothing.

macro_rules! vtrace {
    ($($arg:tt)*) => {
        #[cfg(feature = "std")]
        {
            log::trace!($($arg)*);
        }
    };
}

macro_rules! vdebug {
    ($($arg:tt)*) => {
        #[cfg(feature = "std")]
        {
            log::debug!($($arg)*);
        }
    };
}
