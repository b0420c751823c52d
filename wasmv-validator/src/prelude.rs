//! Prelude module for wasmv-validator
//!
//! Unified imports for std and `no_std` + alloc builds.

pub use core::{
    fmt,
    fmt::{Debug, Display},
    str::FromStr,
};

#[cfg(feature = "std")]
pub use std::{
    borrow::ToOwned,
    format,
    string::{String, ToString},
    vec,
    vec::Vec,
};

#[cfg(all(not(feature = "std"), feature = "alloc"))]
pub use alloc::{
    borrow::ToOwned,
    format,
    string::{String, ToString},
    vec,
    vec::Vec,
};

pub use wasmv_error::{codes, Error, ErrorCategory, Result, ValidationErrorKind};
