// wasmv - wasmv-error
// Module: Validation Error Handling
//
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! wasmv error handling library
//!
//! This library provides the error type shared by every wasmv crate. A
//! validation failure is a small `Copy` value: a category, a numeric code,
//! a static message and, once the engine knows it, the index of the
//! offending instruction.
//!
//! # Error Categories
//!
//! ## Validation Errors (5000-5999)
//! - Operand stack underflow and height mismatches
//! - Empty control stack, misplaced `else`
//! - Invalid local, global, function and type indices
//! - Writes to immutable globals, invalid branch depths
//! - Non-constant global initializers, over-aligned memory accesses
//! - Function bodies that end inside an open block
//!
//! ## Type Errors (6000-6999)
//! - Concrete type disagreement on pop, set or block result check
//!
//! ## Parse Errors (7000-7999)
//! - Malformed instruction text
//!
//! ## Capacity Errors (8000-8999)
//! - Configured operand/control stack limits exceeded
//!
//! ## Not Supported Errors (9000-9999)
//! - Instruction mnemonics with no validation rule
//!
//! # Usage
//!
//! ```
//! use wasmv_error::{codes, Error, ErrorCategory, ValidationErrorKind};
//!
//! let error = Error::new(
//!     ErrorCategory::Validation,
//!     codes::VALIDATION_INVALID_LOCAL_INDEX,
//!     "local index out of range",
//! )
//! .at(3);
//!
//! assert_eq!(error.kind(), Some(ValidationErrorKind::InvalidLocalIndex));
//! assert_eq!(error.instr_index(), Some(3));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

#[cfg(feature = "std")]
extern crate std;

/// Error codes for wasmv
pub mod codes;
/// Error and error category types
pub mod errors;
/// Validation failure kinds
pub mod kinds;

pub use errors::{Error, ErrorCategory, ErrorSource};
pub use kinds::ValidationErrorKind;

/// A specialized `Result` type for wasmv operations.
pub type Result<T> = core::result::Result<T, Error>;
