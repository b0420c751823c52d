// wasmv - wasmv-validator
// Module: Operand Stack
//
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The abstract operand stack.
//!
//! Pops are checked against the innermost control frame: a pop at the
//! frame's height floor fails, unless the frame is unreachable, in which case
//! it yields [`StackType::Unknown`] and leaves the stack untouched.

use crate::control::ControlFrame;
use crate::prelude::{Error, Result, Vec};
use crate::types::{StackType, ValueType};

/// Stack of operand types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperandStack {
    values: Vec<StackType>,
    limit:  usize,
}

impl OperandStack {
    /// Empty stack holding at most `limit` values.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            values: Vec::new(),
            limit,
        }
    }

    /// Push one type.
    ///
    /// # Errors
    ///
    /// Returns `StackOverflow` if the height limit is reached.
    pub fn push(&mut self, ty: StackType) -> Result<()> {
        if self.values.len() >= self.limit {
            return Err(Error::stack_overflow("Operand stack limit exceeded"));
        }
        self.values.push(ty);
        Ok(())
    }

    /// Push each type in order.
    ///
    /// # Errors
    ///
    /// Returns `StackOverflow` if the height limit is reached.
    pub fn push_many(&mut self, types: &[ValueType]) -> Result<()> {
        for ty in types {
            self.push(StackType::from(*ty))?;
        }
        Ok(())
    }

    /// Pop one type of any kind.
    ///
    /// # Errors
    ///
    /// Returns `StackUnderflow` when the stack is at `frame`'s floor and the
    /// frame is reachable.
    pub fn pop(&mut self, frame: &ControlFrame) -> Result<StackType> {
        if self.values.len() <= frame.height {
            if frame.unreachable {
                return Ok(StackType::Unknown);
            }
            return Err(Error::stack_underflow("Pop below the enclosing block's stack floor"));
        }
        self.values.pop().ok_or_else(|| Error::stack_underflow("Operand stack is empty"))
    }

    /// Pop one type and check it against `expected`.
    ///
    /// Returns `expected` when the popped type is the wildcard.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if both types are concrete and differ, or any
    /// error of [`Self::pop`].
    pub fn pop_expect(&mut self, frame: &ControlFrame, expected: StackType) -> Result<StackType> {
        let actual = self.pop(frame)?;
        StackType::resolve(actual, expected).ok_or_else(|| Error::type_mismatch("Operand type mismatch"))
    }

    /// Pop `expected.len()` types, checking the last element first.
    ///
    /// # Errors
    ///
    /// Stops at the first error of [`Self::pop_expect`].
    pub fn pop_many(&mut self, frame: &ControlFrame, expected: &[ValueType]) -> Result<()> {
        for ty in expected.iter().rev() {
            self.pop_expect(frame, StackType::from(*ty))?;
        }
        Ok(())
    }

    /// Discard everything above `height`.
    pub fn truncate(&mut self, height: usize) {
        self.values.truncate(height);
    }

    /// Current height.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the stack is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The stack contents, bottom first.
    #[must_use]
    pub fn as_slice(&self) -> &[StackType] {
        &self.values
    }

    /// Remove every value.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ControlKind;
    use crate::prelude::{vec, ValidationErrorKind};

    fn block_at(height: usize) -> ControlFrame {
        ControlFrame::new(ControlKind::Block, vec![], vec![], height)
    }

    #[test]
    fn pop_respects_the_frame_floor() {
        let mut stack = OperandStack::with_limit(16);
        stack.push(StackType::I32).unwrap();
        let frame = block_at(1);

        let err = stack.pop(&frame).unwrap_err();
        assert!(err.is(ValidationErrorKind::StackUnderflow));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn unreachable_floor_yields_unknown_forever() {
        let mut stack = OperandStack::with_limit(16);
        let mut frame = block_at(0);
        frame.unreachable = true;

        for _ in 0..3 {
            assert_eq!(stack.pop(&frame).unwrap(), StackType::Unknown);
        }
        assert_eq!(stack.pop_expect(&frame, StackType::F64).unwrap(), StackType::F64);
        assert!(stack.is_empty());
    }

    #[test]
    fn pop_expect_detects_mismatch() {
        let mut stack = OperandStack::with_limit(16);
        stack.push(StackType::F64).unwrap();
        let err = stack.pop_expect(&block_at(0), StackType::I32).unwrap_err();
        assert!(err.is(ValidationErrorKind::TypeMismatch));
    }

    #[test]
    fn pop_many_checks_in_reverse() {
        let mut stack = OperandStack::with_limit(16);
        stack.push_many(&[ValueType::I32, ValueType::F32]).unwrap();
        stack.pop_many(&block_at(0), &[ValueType::I32, ValueType::F32]).unwrap();
        assert!(stack.is_empty());

        stack.push_many(&[ValueType::I32, ValueType::F32]).unwrap();
        let err = stack.pop_many(&block_at(0), &[ValueType::F32, ValueType::I32]).unwrap_err();
        assert!(err.is(ValidationErrorKind::TypeMismatch));
    }

    #[test]
    fn push_limit() {
        let mut stack = OperandStack::with_limit(2);
        stack.push_many(&[ValueType::I32, ValueType::I32]).unwrap();
        let err = stack.push(StackType::I64).unwrap_err();
        assert!(err.is(ValidationErrorKind::StackOverflow));
    }
}
