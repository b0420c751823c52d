// wasmv - wasmv-error
// Module: Error Types
//
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

use core::fmt;

use crate::ValidationErrorKind;

/// `Error` categories for wasmv operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCategory {
    /// Structural validation errors (stacks, indices, control flow)
    Validation   = 5,
    /// Type errors
    Type         = 6,
    /// Instruction text errors
    Parse        = 10,
    /// Configured limits exceeded
    Capacity     = 12,
    /// Opcodes without a rule
    NotSupported = 15,
}

/// Base trait for error types that expose a code, message and category
pub trait ErrorSource: fmt::Debug + Send + Sync {
    /// Get the error code
    fn code(&self) -> u16;

    /// Get the error message
    fn message(&self) -> &'static str;

    /// Get the error category
    fn category(&self) -> ErrorCategory;
}

/// wasmv `Error` type
///
/// Categorized error with a numeric code, a static message and, when the
/// failure was raised while dispatching a body, the index of the offending
/// instruction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Error {
    /// `Error` category
    pub category:    ErrorCategory,
    /// `Error` code
    pub code:        u16,
    /// `Error` message
    pub message:     &'static str,
    /// Index of the instruction that failed, if known
    pub instr_index: Option<usize>,
}

impl Error {
    /// Create a new error.
    #[must_use]
    pub const fn new(category: ErrorCategory, code: u16, message: &'static str) -> Self {
        Self {
            category,
            code,
            message,
            instr_index: None,
        }
    }

    /// Create an error of the given kind with a specific message.
    #[must_use]
    pub const fn from_kind(kind: ValidationErrorKind, message: &'static str) -> Self {
        Self::new(kind.category(), kind.code(), message)
    }

    /// Attach the offending instruction index. An index that is already set
    /// is kept, so the innermost location wins.
    #[must_use]
    pub const fn at(mut self, index: usize) -> Self {
        if self.instr_index.is_none() {
            self.instr_index = Some(index);
        }
        self
    }

    /// Index of the offending instruction, if known.
    #[must_use]
    pub const fn instr_index(&self) -> Option<usize> {
        self.instr_index
    }

    /// The failure kind this error was created from.
    #[must_use]
    pub fn kind(&self) -> Option<ValidationErrorKind> {
        ValidationErrorKind::from_code(self.code)
    }

    /// Check whether this error has the given kind
    #[must_use]
    pub fn is(&self, kind: ValidationErrorKind) -> bool {
        self.code == kind.code()
    }

    /// Check if this is a validation error
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        self.category == ErrorCategory::Validation
    }

    /// Check if this is a type error
    #[must_use]
    pub fn is_type_error(&self) -> bool {
        self.category == ErrorCategory::Type
    }

    // Factory methods

    /// Create a stack underflow error
    #[must_use]
    pub const fn stack_underflow(message: &'static str) -> Self {
        Self::from_kind(ValidationErrorKind::StackUnderflow, message)
    }

    /// Create a type mismatch error
    #[must_use]
    pub const fn type_mismatch(message: &'static str) -> Self {
        Self::from_kind(ValidationErrorKind::TypeMismatch, message)
    }

    /// Create a stack height mismatch error
    #[must_use]
    pub const fn stack_height_mismatch(message: &'static str) -> Self {
        Self::from_kind(ValidationErrorKind::StackHeightMismatch, message)
    }

    /// Create a control stack empty error
    #[must_use]
    pub const fn control_stack_empty(message: &'static str) -> Self {
        Self::from_kind(ValidationErrorKind::ControlStackEmpty, message)
    }

    /// Create an invalid local index error
    #[must_use]
    pub const fn invalid_local_index(message: &'static str) -> Self {
        Self::from_kind(ValidationErrorKind::InvalidLocalIndex, message)
    }

    /// Create an invalid global index error
    #[must_use]
    pub const fn invalid_global_index(message: &'static str) -> Self {
        Self::from_kind(ValidationErrorKind::InvalidGlobalIndex, message)
    }

    /// Create an invalid function index error
    #[must_use]
    pub const fn invalid_function_index(message: &'static str) -> Self {
        Self::from_kind(ValidationErrorKind::InvalidFunctionIndex, message)
    }

    /// Create an invalid type index error
    #[must_use]
    pub const fn invalid_type_index(message: &'static str) -> Self {
        Self::from_kind(ValidationErrorKind::InvalidTypeIndex, message)
    }

    /// Create an immutable global error
    #[must_use]
    pub const fn immutable_global(message: &'static str) -> Self {
        Self::from_kind(ValidationErrorKind::ImmutableGlobal, message)
    }

    /// Create an invalid branch depth error
    #[must_use]
    pub const fn invalid_branch_depth(message: &'static str) -> Self {
        Self::from_kind(ValidationErrorKind::InvalidBranchDepth, message)
    }

    /// Create an unsupported opcode error
    #[must_use]
    pub const fn unsupported_opcode(message: &'static str) -> Self {
        Self::from_kind(ValidationErrorKind::UnsupportedOpcode, message)
    }

    /// Create an unexpected else error
    #[must_use]
    pub const fn unexpected_else(message: &'static str) -> Self {
        Self::from_kind(ValidationErrorKind::UnexpectedElse, message)
    }

    /// Create a stack overflow error
    #[must_use]
    pub const fn stack_overflow(message: &'static str) -> Self {
        Self::from_kind(ValidationErrorKind::StackOverflow, message)
    }

    /// Create a non-constant expression error
    #[must_use]
    pub const fn non_constant_expression(message: &'static str) -> Self {
        Self::from_kind(ValidationErrorKind::NonConstantExpression, message)
    }

    /// Create a malformed instruction error
    #[must_use]
    pub const fn malformed_instruction(message: &'static str) -> Self {
        Self::from_kind(ValidationErrorKind::MalformedInstruction, message)
    }

    /// Create an invalid alignment error
    #[must_use]
    pub const fn invalid_alignment(message: &'static str) -> Self {
        Self::from_kind(ValidationErrorKind::InvalidAlignment, message)
    }

    /// Create an unclosed block error
    #[must_use]
    pub const fn unclosed_block(message: &'static str) -> Self {
        Self::from_kind(ValidationErrorKind::UnclosedBlock, message)
    }
}

impl From<ValidationErrorKind> for Error {
    fn from(kind: ValidationErrorKind) -> Self {
        Self::from_kind(kind, kind.default_message())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}][E{:04X}] {}", self.category, self.code, self.message)?;
        if let Some(index) = self.instr_index {
            write!(f, " (instruction {index})")?;
        }
        Ok(())
    }
}

impl ErrorSource for Error {
    fn code(&self) -> u16 {
        self.code
    }

    fn message(&self) -> &'static str {
        self.message
    }

    fn category(&self) -> ErrorCategory {
        self.category
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
