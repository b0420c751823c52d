// wasmv - wasmv-error
// Module: Validation Failure Kinds
//
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Failure kinds reported by the validator.
//!
//! Every kind owns exactly one code in [`crate::codes`], so an [`crate::Error`]
//! can always be mapped back to the kind that produced it.

use core::fmt;

use crate::{codes, ErrorCategory};

/// The specific reason a function body or module was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// Pop beyond a non-polymorphic frame floor
    StackUnderflow,
    /// Concrete type disagreement on pop, set or block-result check
    TypeMismatch,
    /// Operand stack not drained to exactly a frame's floor at its end
    StackHeightMismatch,
    /// Pop or branch with no enclosing frame
    ControlStackEmpty,
    /// Local index outside the registered range
    InvalidLocalIndex,
    /// Global index outside the registered range
    InvalidGlobalIndex,
    /// Function index outside the registered range
    InvalidFunctionIndex,
    /// Type index outside the registered range
    InvalidTypeIndex,
    /// Write to a non-mutable global
    ImmutableGlobal,
    /// Branch depth exceeds current nesting
    InvalidBranchDepth,
    /// No rule for the decoded opcode
    UnsupportedOpcode,
    /// `else` whose innermost frame is not an `if`
    UnexpectedElse,
    /// Operand or control stack exceeded the configured limit
    StackOverflow,
    /// Global initializer uses a non-constant instruction
    NonConstantExpression,
    /// Instruction text could not be read
    MalformedInstruction,
    /// Memory access alignment exceeds the natural alignment
    InvalidAlignment,
    /// Function body ended with blocks still open
    UnclosedBlock,
}

impl ValidationErrorKind {
    /// Every kind, for iteration and code lookup.
    pub const ALL: [Self; 17] = [
        Self::StackUnderflow,
        Self::TypeMismatch,
        Self::StackHeightMismatch,
        Self::ControlStackEmpty,
        Self::InvalidLocalIndex,
        Self::InvalidGlobalIndex,
        Self::InvalidFunctionIndex,
        Self::InvalidTypeIndex,
        Self::ImmutableGlobal,
        Self::InvalidBranchDepth,
        Self::UnsupportedOpcode,
        Self::UnexpectedElse,
        Self::StackOverflow,
        Self::NonConstantExpression,
        Self::MalformedInstruction,
        Self::InvalidAlignment,
        Self::UnclosedBlock,
    ];

    /// Numeric code of this kind.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::StackUnderflow => codes::VALIDATION_STACK_UNDERFLOW,
            Self::TypeMismatch => codes::TYPE_MISMATCH_ERROR,
            Self::StackHeightMismatch => codes::VALIDATION_STACK_HEIGHT_MISMATCH,
            Self::ControlStackEmpty => codes::VALIDATION_CONTROL_STACK_EMPTY,
            Self::InvalidLocalIndex => codes::VALIDATION_INVALID_LOCAL_INDEX,
            Self::InvalidGlobalIndex => codes::VALIDATION_INVALID_GLOBAL_INDEX,
            Self::InvalidFunctionIndex => codes::VALIDATION_INVALID_FUNCTION_INDEX,
            Self::InvalidTypeIndex => codes::VALIDATION_INVALID_TYPE_INDEX,
            Self::ImmutableGlobal => codes::VALIDATION_IMMUTABLE_GLOBAL,
            Self::InvalidBranchDepth => codes::VALIDATION_INVALID_BRANCH_DEPTH,
            Self::UnsupportedOpcode => codes::NOT_SUPPORTED_OPCODE,
            Self::UnexpectedElse => codes::VALIDATION_UNEXPECTED_ELSE,
            Self::StackOverflow => codes::CAPACITY_STACK_OVERFLOW,
            Self::NonConstantExpression => codes::VALIDATION_NON_CONSTANT_EXPRESSION,
            Self::MalformedInstruction => codes::PARSE_MALFORMED_INSTRUCTION,
            Self::InvalidAlignment => codes::VALIDATION_INVALID_ALIGNMENT,
            Self::UnclosedBlock => codes::VALIDATION_UNCLOSED_BLOCK,
        }
    }

    /// Category this kind is reported under.
    #[must_use]
    pub const fn category(self) -> ErrorCategory {
        match self {
            Self::TypeMismatch => ErrorCategory::Type,
            Self::MalformedInstruction => ErrorCategory::Parse,
            Self::StackOverflow => ErrorCategory::Capacity,
            Self::UnsupportedOpcode => ErrorCategory::NotSupported,
            _ => ErrorCategory::Validation,
        }
    }

    /// Message used when the caller does not supply a more specific one.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::StackUnderflow => "operand stack underflow",
            Self::TypeMismatch => "type mismatch",
            Self::StackHeightMismatch => "operand stack height mismatch at end of block",
            Self::ControlStackEmpty => "control stack is empty",
            Self::InvalidLocalIndex => "unknown local",
            Self::InvalidGlobalIndex => "unknown global",
            Self::InvalidFunctionIndex => "unknown function",
            Self::InvalidTypeIndex => "unknown type",
            Self::ImmutableGlobal => "global is immutable",
            Self::InvalidBranchDepth => "unknown label",
            Self::UnsupportedOpcode => "unsupported opcode",
            Self::UnexpectedElse => "else without matching if",
            Self::StackOverflow => "stack limit exceeded",
            Self::NonConstantExpression => "constant expression required",
            Self::MalformedInstruction => "malformed instruction",
            Self::InvalidAlignment => "alignment must not be larger than natural",
            Self::UnclosedBlock => "function body ended inside an open block",
        }
    }

    /// Look up the kind owning `code`.
    #[must_use]
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.code() == code)
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_message())
    }
}
