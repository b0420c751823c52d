// wasmv - wasmv-error
// Module: Error Codes
//
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Error codes for wasmv

// Validation error codes (5000-5999)
/// Immutable global written by `global.set`
pub const VALIDATION_IMMUTABLE_GLOBAL: u16 = 5007;
/// Control stack empty on pop or branch
pub const VALIDATION_CONTROL_STACK_EMPTY: u16 = 5010;
/// Operand stack not drained to the frame floor at `end`
pub const VALIDATION_STACK_HEIGHT_MISMATCH: u16 = 5011;
/// Function index outside the registered range
pub const VALIDATION_INVALID_FUNCTION_INDEX: u16 = 5013;
/// Type index outside the registered range
pub const VALIDATION_INVALID_TYPE_INDEX: u16 = 5015;
/// Branch depth exceeds current nesting
pub const VALIDATION_INVALID_BRANCH_DEPTH: u16 = 5020;
/// Pop beyond a non-polymorphic frame floor
pub const VALIDATION_STACK_UNDERFLOW: u16 = 5021;
/// Global index outside the registered range
pub const VALIDATION_INVALID_GLOBAL_INDEX: u16 = 5028;
/// Local index outside the registered range
pub const VALIDATION_INVALID_LOCAL_INDEX: u16 = 5029;
/// `else` without a matching `if`
pub const VALIDATION_UNEXPECTED_ELSE: u16 = 5030;
/// Instruction not allowed in a constant expression
pub const VALIDATION_NON_CONSTANT_EXPRESSION: u16 = 5031;
/// Memory access alignment larger than the natural alignment
pub const VALIDATION_INVALID_ALIGNMENT: u16 = 5032;
/// Function body ended with blocks still open
pub const VALIDATION_UNCLOSED_BLOCK: u16 = 5033;

// Type error codes (6000-6999)
/// Type mismatch error
pub const TYPE_MISMATCH_ERROR: u16 = 6001;

// Parse error codes (7000-7999)
/// Instruction text could not be read
pub const PARSE_MALFORMED_INSTRUCTION: u16 = 7001;

// Capacity error codes (8000-8999)
/// Operand or control stack grew past the configured limit
pub const CAPACITY_STACK_OVERFLOW: u16 = 8209;

// Not supported error codes (9000-9999)
/// Opcode without a validation rule
pub const NOT_SUPPORTED_OPCODE: u16 = 9001;
