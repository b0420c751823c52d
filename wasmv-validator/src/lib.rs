// wasmv - wasmv-validator
// Module: WebAssembly Function Body Validation
//
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![forbid(unsafe_code)]

//! Static validation of WebAssembly function bodies.
//!
//! This crate type-checks already-decoded instruction sequences without
//! executing them. It mirrors the abstract stack machine of the WebAssembly
//! validation algorithm: an operand stack of value types, a control stack of
//! frames that each record their label/result types and a height floor, and
//! a rule table mapping every instruction to its effect on both.
//!
//! # Architecture
//!
//! - `types`: value, stack, function, global and block types
//! - `instruction`: the decoded instruction set and its fixed signatures
//! - `text`: reading instructions from their text mnemonics (`std` only)
//! - `stack`: the operand stack with polymorphic pops
//! - `control`: control frames and the control stack
//! - `context`: module tables (types, functions, globals) and local tables
//! - `rules`: the per-instruction rule table
//! - `validator`: the per-function engine and its entry point
//! - `module`: a driver that validates every function and global initializer
//!   of a decoded module
//!
//! # Example
//!
//! ```
//! use wasmv_validator::{FuncValidator, Instruction, ModuleContext, NumericOp, ValueType};
//!
//! let ctx = ModuleContext::new();
//! let mut validator = FuncValidator::new(&ctx);
//! validator.add_local(ValueType::I32).unwrap();
//!
//! let body = [
//!     Instruction::LocalGet(0),
//!     Instruction::I32Const(1),
//!     Instruction::Numeric(NumericOp::I32Add),
//! ];
//! validator.validate(&body, &[ValueType::I32]).unwrap();
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::missing_panics_doc)]

// Verify required features when using no_std
#[cfg(all(not(feature = "std"), not(feature = "alloc")))]
compile_error!("The 'alloc' feature must be enabled when using no_std");

#[cfg(all(not(feature = "std"), feature = "alloc"))]
extern crate alloc;

#[macro_use]
mod macros;

pub mod prelude;

pub mod config;
pub mod context;
pub mod control;
pub mod instruction;
pub mod module;
mod rules;
pub mod stack;
#[cfg(feature = "std")]
pub mod text;
pub mod types;
pub mod validator;

pub use wasmv_error::{codes, Error, ErrorCategory, Result, ValidationErrorKind};

pub use crate::config::{FailurePolicy, ValidatorConfig};
pub use crate::context::{Locals, ModuleContext};
pub use crate::control::{ControlFrame, ControlKind, ControlStack};
pub use crate::instruction::{Instruction, MemArg, MemoryOp, NumericOp};
pub use crate::module::{
    Function, Global, Import, ImportDesc, LocalDecl, Module, ModuleValidator, UnitFailure,
    ValidatedUnit, ValidationReport,
};
pub use crate::stack::OperandStack;
pub use crate::types::{BlockType, FuncType, GlobalType, StackType, ValueType};
pub use crate::validator::FuncValidator;
