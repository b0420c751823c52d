// wasmv - wasmv-validator
// Module: Control Stack
//
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Control frames and the control stack.

use crate::prelude::{Error, Result, Vec};
use crate::types::ValueType;

/// The construct that opened a control frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    /// The implicit outermost frame of a function body
    Function,
    /// `block`
    Block,
    /// `loop`
    Loop,
    /// Then-arm of an `if`
    If,
    /// Else-arm of an `if`
    Else,
}

/// One open structured-control construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlFrame {
    /// Construct that opened the frame
    pub kind:        ControlKind,
    /// Operand types the frame starts with
    pub start_types: Vec<ValueType>,
    /// Operand types a branch to this frame carries
    pub label_types: Vec<ValueType>,
    /// Operand types left on the stack when the frame ends
    pub end_types:   Vec<ValueType>,
    /// Operand stack height when the frame was entered
    pub height:      usize,
    /// Set once the rest of the frame is statically unreachable
    pub unreachable: bool,
}

impl ControlFrame {
    /// Create a frame. The branch label is the start types for `loop` and
    /// the end types otherwise.
    #[must_use]
    pub fn new(
        kind: ControlKind,
        start_types: Vec<ValueType>,
        end_types: Vec<ValueType>,
        height: usize,
    ) -> Self {
        let label_types = match kind {
            ControlKind::Loop => start_types.clone(),
            _ => end_types.clone(),
        };
        Self {
            kind,
            start_types,
            label_types,
            end_types,
            height,
            unreachable: false,
        }
    }
}

/// Stack of open control frames. Depth 0 is the innermost frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlStack {
    frames: Vec<ControlFrame>,
    limit:  usize,
}

impl ControlStack {
    /// Empty stack holding at most `limit` frames.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            frames: Vec::new(),
            limit,
        }
    }

    /// Push a frame.
    ///
    /// # Errors
    ///
    /// Returns `StackOverflow` if the nesting limit is reached.
    pub fn push(&mut self, frame: ControlFrame) -> Result<()> {
        if self.frames.len() >= self.limit {
            return Err(Error::stack_overflow("Control nesting limit exceeded"));
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Pop the innermost frame.
    ///
    /// # Errors
    ///
    /// Returns `ControlStackEmpty` if there is no open frame.
    pub fn pop(&mut self) -> Result<ControlFrame> {
        self.frames.pop().ok_or_else(|| Error::control_stack_empty("No open control frame"))
    }

    /// Innermost frame.
    ///
    /// # Errors
    ///
    /// Returns `ControlStackEmpty` if there is no open frame.
    pub fn top(&self) -> Result<&ControlFrame> {
        self.frames.last().ok_or_else(|| Error::control_stack_empty("No open control frame"))
    }

    /// Innermost frame, mutably.
    ///
    /// # Errors
    ///
    /// Returns `ControlStackEmpty` if there is no open frame.
    pub fn top_mut(&mut self) -> Result<&mut ControlFrame> {
        self.frames.last_mut().ok_or_else(|| Error::control_stack_empty("No open control frame"))
    }

    /// Frame `depth` levels out from the innermost one.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBranchDepth` if `depth` is not less than the number
    /// of open frames.
    pub fn frame_at(&self, depth: u32) -> Result<&ControlFrame> {
        let depth = depth as usize;
        if depth >= self.frames.len() {
            return Err(Error::invalid_branch_depth("Branch depth exceeds control nesting"));
        }
        Ok(&self.frames[self.frames.len() - 1 - depth])
    }

    /// The outermost frame.
    ///
    /// # Errors
    ///
    /// Returns `ControlStackEmpty` if there is no open frame.
    pub fn function_frame(&self) -> Result<&ControlFrame> {
        self.frames.first().ok_or_else(|| Error::control_stack_empty("No open control frame"))
    }

    /// Number of open frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether no frame is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Remove every frame.
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::{vec, ValidationErrorKind};

    fn frame(kind: ControlKind) -> ControlFrame {
        ControlFrame::new(kind, vec![ValueType::I32], vec![ValueType::F64], 0)
    }

    #[test]
    fn label_types_follow_the_frame_kind() {
        assert_eq!(frame(ControlKind::Loop).label_types, vec![ValueType::I32]);
        assert_eq!(frame(ControlKind::Block).label_types, vec![ValueType::F64]);
        assert_eq!(frame(ControlKind::If).label_types, vec![ValueType::F64]);
        assert_eq!(frame(ControlKind::Function).label_types, vec![ValueType::F64]);
    }

    #[test]
    fn depth_is_counted_from_the_innermost_frame() {
        let mut stack = ControlStack::with_limit(8);
        stack.push(frame(ControlKind::Function)).unwrap();
        stack.push(frame(ControlKind::Block)).unwrap();
        stack.push(frame(ControlKind::Loop)).unwrap();

        assert_eq!(stack.frame_at(0).unwrap().kind, ControlKind::Loop);
        assert_eq!(stack.frame_at(2).unwrap().kind, ControlKind::Function);
        assert!(stack.frame_at(3).unwrap_err().is(ValidationErrorKind::InvalidBranchDepth));
        assert_eq!(stack.function_frame().unwrap().kind, ControlKind::Function);
    }

    #[test]
    fn empty_stack() {
        let mut stack = ControlStack::with_limit(8);
        assert!(stack.pop().unwrap_err().is(ValidationErrorKind::ControlStackEmpty));
        assert!(stack.top().unwrap_err().is(ValidationErrorKind::ControlStackEmpty));
        assert!(stack.frame_at(0).unwrap_err().is(ValidationErrorKind::InvalidBranchDepth));
    }

    #[test]
    fn nesting_limit() {
        let mut stack = ControlStack::with_limit(1);
        stack.push(frame(ControlKind::Function)).unwrap();
        assert!(stack.push(frame(ControlKind::Block)).unwrap_err().is(ValidationErrorKind::StackOverflow));
    }
}
