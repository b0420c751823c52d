// wasmv - wasmv-validator
// Module: Function Body Validator
//
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The per-function validation engine.
//!
//! A [`FuncValidator`] borrows a frozen [`ModuleContext`] and owns everything
//! that changes while a body is checked: its locals, the operand stack and the
//! control stack. Independent functions of one module can therefore be
//! validated in parallel, each with its own validator over a shared context.

use crate::config::ValidatorConfig;
use crate::context::{Locals, ModuleContext};
use crate::control::{ControlFrame, ControlKind, ControlStack};
use crate::instruction::Instruction;
use crate::prelude::{Error, Result, Vec};
use crate::rules;
use crate::stack::OperandStack;
use crate::types::{BlockType, GlobalType, StackType, ValueType};

/// Validates one function body or constant expression at a time.
#[derive(Debug, Clone)]
pub struct FuncValidator<'a> {
    ctx:    &'a ModuleContext,
    locals: Locals,
    opds:   OperandStack,
    ctrls:  ControlStack,
    config: ValidatorConfig,
}

impl<'a> FuncValidator<'a> {
    /// Validator with the default configuration.
    #[must_use]
    pub fn new(ctx: &'a ModuleContext) -> Self {
        Self::with_config(ctx, ValidatorConfig::default())
    }

    /// Validator with explicit limits.
    #[must_use]
    pub fn with_config(ctx: &'a ModuleContext, config: ValidatorConfig) -> Self {
        Self {
            ctx,
            locals: Locals::new(),
            opds: OperandStack::with_limit(config.max_operand_stack),
            ctrls: ControlStack::with_limit(config.max_control_depth),
            config,
        }
    }

    /// The module context.
    #[must_use]
    pub fn context(&self) -> &'a ModuleContext {
        self.ctx
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Locals of the current function.
    #[must_use]
    pub fn locals(&self) -> &Locals {
        &self.locals
    }

    /// Operand stack contents, bottom first.
    ///
    /// After a successful [`Self::validate`] this is exactly the result
    /// types of the body.
    #[must_use]
    pub fn operand_stack(&self) -> &[StackType] {
        self.opds.as_slice()
    }

    /// Number of open control frames.
    #[must_use]
    pub fn control_depth(&self) -> usize {
        self.ctrls.len()
    }

    /// Clear locals and both stacks for the next function.
    pub fn reset(&mut self) {
        self.locals.clear();
        self.opds.clear();
        self.ctrls.clear();
    }

    // ---- locals and globals ----

    /// Register the next local. Parameters come first.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLocalIndex` if the local index space is exhausted.
    pub fn add_local(&mut self, ty: ValueType) -> Result<u32> {
        self.locals.add(ty)
    }

    /// Register `count` locals of one type.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLocalIndex` if the local index space is exhausted.
    pub fn add_locals(&mut self, count: u32, ty: ValueType) -> Result<()> {
        self.locals.add_many(count, ty)
    }

    /// Declared type of local `idx`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLocalIndex` if unregistered.
    pub fn get_local(&self, idx: u32) -> Result<ValueType> {
        self.locals.get(idx)
    }

    /// Check that a value of type `value` may be written to local `idx`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLocalIndex` if unregistered and `TypeMismatch` if
    /// `value` differs from the declared type.
    pub fn set_local(&self, idx: u32, value: StackType) -> Result<()> {
        let declared = self.locals.get(idx)?;
        if !value.matches(declared.into()) {
            return Err(Error::type_mismatch("Value does not match the local's type"));
        }
        Ok(())
    }

    /// Declared type of global `idx`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGlobalIndex` if unregistered.
    pub fn get_global(&self, idx: u32) -> Result<GlobalType> {
        self.ctx.global(idx)
    }

    /// Check that a value of type `value` may be written to global `idx`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGlobalIndex` if unregistered, `ImmutableGlobal` if the
    /// global is not mutable and `TypeMismatch` if `value` differs from the
    /// declared type.
    pub fn set_global(&self, idx: u32, value: StackType) -> Result<()> {
        let global = self.writable_global(idx)?;
        if !value.matches(global.value_type.into()) {
            return Err(Error::type_mismatch("Value does not match the global's type"));
        }
        Ok(())
    }

    /// Global `idx`, provided it is mutable.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGlobalIndex` if unregistered and `ImmutableGlobal` if
    /// the global is not mutable.
    pub fn writable_global(&self, idx: u32) -> Result<GlobalType> {
        let global = self.ctx.global(idx)?;
        if !global.mutable {
            return Err(Error::immutable_global("Write to an immutable global"));
        }
        Ok(global)
    }

    // ---- operand stack ----

    /// Push one operand type.
    ///
    /// # Errors
    ///
    /// Returns `StackOverflow` if the operand limit is reached.
    pub fn push_opd(&mut self, ty: StackType) -> Result<()> {
        self.opds.push(ty)
    }

    /// Push operand types in order.
    ///
    /// # Errors
    ///
    /// Returns `StackOverflow` if the operand limit is reached.
    pub fn push_opds(&mut self, types: &[ValueType]) -> Result<()> {
        self.opds.push_many(types)
    }

    /// Pop one operand of any type.
    ///
    /// # Errors
    ///
    /// Returns `StackUnderflow` at a reachable frame floor and
    /// `ControlStackEmpty` outside any frame.
    pub fn pop_opd(&mut self) -> Result<StackType> {
        let frame = self.ctrls.top()?;
        self.opds.pop(frame)
    }

    /// Pop one operand and check it against `expected`.
    ///
    /// # Errors
    ///
    /// As [`Self::pop_opd`], plus `TypeMismatch`.
    pub fn pop_expect(&mut self, expected: StackType) -> Result<StackType> {
        let frame = self.ctrls.top()?;
        self.opds.pop_expect(frame, expected)
    }

    /// Pop operands matching `expected`, last element first.
    ///
    /// # Errors
    ///
    /// As [`Self::pop_expect`].
    pub fn pop_opds(&mut self, expected: &[ValueType]) -> Result<()> {
        let frame = self.ctrls.top()?;
        self.opds.pop_many(frame, expected)
    }

    // ---- control stack ----

    /// Open a control frame at the current operand height and push its start
    /// types.
    ///
    /// # Errors
    ///
    /// Returns `StackOverflow` if a nesting or operand limit is reached.
    pub fn push_ctrl(
        &mut self,
        kind: ControlKind,
        start_types: Vec<ValueType>,
        end_types: Vec<ValueType>,
    ) -> Result<()> {
        self.ctrls.push(ControlFrame::new(kind, start_types, end_types, self.opds.len()))?;
        let frame = self.ctrls.top()?;
        self.opds.push_many(&frame.start_types)
    }

    /// Close the innermost frame after checking its end types and that the
    /// operand stack is back at the frame's floor.
    ///
    /// # Errors
    ///
    /// Returns `ControlStackEmpty` if no frame is open, `TypeMismatch` or
    /// `StackUnderflow` if the end types are not on the stack and
    /// `StackHeightMismatch` if values are left over.
    pub fn pop_ctrl(&mut self) -> Result<ControlFrame> {
        let frame = self.ctrls.top()?;
        self.opds.pop_many(frame, &frame.end_types)?;
        if self.opds.len() != frame.height {
            return Err(Error::stack_height_mismatch("Values left on the stack at the end of a block"));
        }
        self.ctrls.pop()
    }

    /// Mark the rest of the innermost frame as unreachable and drop the
    /// operands it pushed.
    ///
    /// # Errors
    ///
    /// Returns `ControlStackEmpty` if no frame is open.
    pub fn unreachable(&mut self) -> Result<()> {
        let frame = self.ctrls.top_mut()?;
        self.opds.truncate(frame.height);
        frame.unreachable = true;
        Ok(())
    }

    /// Kind of the innermost frame.
    ///
    /// # Errors
    ///
    /// Returns `ControlStackEmpty` if no frame is open.
    pub fn top_kind(&self) -> Result<ControlKind> {
        Ok(self.ctrls.top()?.kind)
    }

    /// Label types of the frame `depth` levels out.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBranchDepth` if `depth` exceeds the nesting.
    pub fn label_types(&self, depth: u32) -> Result<&[ValueType]> {
        Ok(&self.ctrls.frame_at(depth)?.label_types)
    }

    /// Pop the operands carried by a branch to `depth`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBranchDepth` if `depth` exceeds the nesting, or any
    /// error of [`Self::pop_opds`].
    pub fn pop_label(&mut self, depth: u32) -> Result<()> {
        let label = &self.ctrls.frame_at(depth)?.label_types;
        let frame = self.ctrls.top()?;
        self.opds.pop_many(frame, label)
    }

    /// Push the label types of the frame `depth` levels out.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBranchDepth` if `depth` exceeds the nesting and
    /// `StackOverflow` if the operand limit is reached.
    pub fn push_label(&mut self, depth: u32) -> Result<()> {
        let label = &self.ctrls.frame_at(depth)?.label_types;
        self.opds.push_many(label)
    }

    /// Pop the function's result types, as `return` does.
    ///
    /// # Errors
    ///
    /// Returns `ControlStackEmpty` if no frame is open, or any error of
    /// [`Self::pop_opds`].
    pub fn pop_return(&mut self) -> Result<()> {
        let results = &self.ctrls.function_frame()?.end_types;
        let frame = self.ctrls.top()?;
        self.opds.pop_many(frame, results)
    }

    /// Start and end types of a block annotation.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTypeIndex` for an unknown type index.
    pub fn block_signature(&self, bt: BlockType) -> Result<(Vec<ValueType>, Vec<ValueType>)> {
        match bt {
            BlockType::Empty => Ok((Vec::new(), Vec::new())),
            BlockType::Value(ty) => {
                let mut results = Vec::with_capacity(1);
                results.push(ty);
                Ok((Vec::new(), results))
            }
            BlockType::FuncType(idx) => {
                let ty = self.ctx.func_type(idx)?;
                Ok((ty.params.clone(), ty.results.clone()))
            }
        }
    }

    // ---- entry points ----

    /// Validate a function body against its result types.
    ///
    /// Locals (parameters first) must already be registered. The trailing
    /// `end` of the body is optional. On success the operand stack holds
    /// exactly `results`.
    ///
    /// # Errors
    ///
    /// The first violation found, tagged with the index of the offending
    /// instruction. Problems found after the last instruction carry
    /// `body.len()` as their index.
    pub fn validate(&mut self, body: &[Instruction], results: &[ValueType]) -> Result<()> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("validate", instructions = body.len()).entered();
        vdebug!("validating {} instructions, locals={}", body.len(), self.locals.len());

        self.opds.clear();
        self.ctrls.clear();
        self.push_ctrl(ControlKind::Function, Vec::new(), results.to_vec())
            .map_err(|e| e.at(0))?;

        for (index, instr) in body.iter().enumerate() {
            vtrace!("{index:>5}: {instr}");
            if self.ctrls.is_empty() {
                return Err(Error::control_stack_empty("Instruction after the end of the function body").at(index));
            }
            rules::dispatch(self, instr).map_err(|e| e.at(index))?;
        }

        let end = body.len();
        if !self.ctrls.is_empty() {
            if self.ctrls.len() > 1 {
                return Err(Error::unclosed_block("Function body ends inside a block").at(end));
            }
            let frame = self.pop_ctrl().map_err(|e| e.at(end))?;
            self.push_opds(&frame.end_types).map_err(|e| e.at(end))?;
        }

        vdebug!("validation succeeded, results={}", self.opds.len());
        Ok(())
    }

    /// Validate a constant expression producing a value of type `ty`.
    ///
    /// Only `*.const`, `global.get` of an immutable global and a trailing
    /// `end` are accepted.
    ///
    /// # Errors
    ///
    /// Returns `NonConstantExpression` for any other instruction or a read
    /// of a mutable global, `InvalidGlobalIndex` for an unknown global, or
    /// any error of [`Self::validate`].
    pub fn validate_const_expr(&mut self, expr: &[Instruction], ty: ValueType) -> Result<()> {
        for (index, instr) in expr.iter().enumerate() {
            if !instr.is_constant() {
                return Err(Error::non_constant_expression("Instruction not allowed in a constant expression").at(index));
            }
            if let Instruction::GlobalGet(idx) = instr {
                let global = self.ctx.global(*idx).map_err(|e| e.at(index))?;
                if global.mutable {
                    return Err(Error::non_constant_expression("Constant expression reads a mutable global").at(index));
                }
            }
        }
        self.validate(expr, &[ty])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{MemArg, MemoryOp, NumericOp};
    use crate::prelude::{vec, ValidationErrorKind};
    use crate::types::FuncType;

    fn kind_of(result: Result<()>) -> ValidationErrorKind {
        result.unwrap_err().kind().unwrap()
    }

    #[test]
    fn empty_body_with_no_results() {
        let ctx = ModuleContext::new();
        let mut v = FuncValidator::new(&ctx);
        v.validate(&[], &[]).unwrap();
        assert!(v.operand_stack().is_empty());
        assert_eq!(v.control_depth(), 0);
    }

    #[test]
    fn empty_body_missing_result() {
        let ctx = ModuleContext::new();
        let mut v = FuncValidator::new(&ctx);
        let err = v.validate(&[], &[ValueType::I32]).unwrap_err();
        assert!(err.is(ValidationErrorKind::StackUnderflow));
        assert_eq!(err.instr_index(), Some(0));
    }

    #[test]
    fn explicit_trailing_end() {
        let ctx = ModuleContext::new();
        let mut v = FuncValidator::new(&ctx);
        v.validate(&[Instruction::I64Const(1), Instruction::End], &[ValueType::I64]).unwrap();
        assert_eq!(v.operand_stack(), &[StackType::I64]);
    }

    #[test]
    fn instruction_after_function_end() {
        let ctx = ModuleContext::new();
        let mut v = FuncValidator::new(&ctx);
        let err = v.validate(&[Instruction::End, Instruction::Nop], &[]).unwrap_err();
        assert!(err.is(ValidationErrorKind::ControlStackEmpty));
        assert_eq!(err.instr_index(), Some(1));
    }

    #[test]
    fn unclosed_block() {
        let ctx = ModuleContext::new();
        let mut v = FuncValidator::new(&ctx);
        let err = v.validate(&[Instruction::Block(BlockType::Empty)], &[]).unwrap_err();
        assert!(err.is(ValidationErrorKind::UnclosedBlock));
        assert_eq!(err.instr_index(), Some(1));
    }

    #[test]
    fn leftover_values_are_a_height_mismatch() {
        let ctx = ModuleContext::new();
        let mut v = FuncValidator::new(&ctx);
        let body = [Instruction::I32Const(1), Instruction::I32Const(2)];
        assert_eq!(kind_of(v.validate(&body, &[ValueType::I32])), ValidationErrorKind::StackHeightMismatch);
    }

    #[test]
    fn multi_value_block_params() {
        let mut ctx = ModuleContext::new();
        let sig = ctx.add_type(FuncType::new(vec![ValueType::I32, ValueType::I32], vec![ValueType::I32]));
        let mut v = FuncValidator::new(&ctx);
        let body = [
            Instruction::I32Const(1),
            Instruction::I32Const(2),
            Instruction::Block(BlockType::FuncType(sig)),
            Instruction::Numeric(NumericOp::I32Add),
            Instruction::End,
        ];
        v.validate(&body, &[ValueType::I32]).unwrap();
    }

    #[test]
    fn loop_label_is_its_params() {
        let mut ctx = ModuleContext::new();
        let sig = ctx.add_type(FuncType::new(vec![ValueType::I32], vec![]));
        let mut v = FuncValidator::new(&ctx);
        let body = [
            Instruction::I32Const(10),
            Instruction::Loop(BlockType::FuncType(sig)),
            Instruction::I32Const(1),
            Instruction::Numeric(NumericOp::I32Sub),
            Instruction::Br(0),
            Instruction::End,
        ];
        v.validate(&body, &[]).unwrap();
    }

    #[test]
    fn if_without_else_must_preserve_types() {
        let ctx = ModuleContext::new();
        let mut v = FuncValidator::new(&ctx);
        let body = [
            Instruction::I32Const(1),
            Instruction::If(BlockType::Value(ValueType::I32)),
            Instruction::I32Const(2),
            Instruction::End,
            Instruction::Drop,
        ];
        let err = v.validate(&body, &[]).unwrap_err();
        assert!(err.is(ValidationErrorKind::TypeMismatch));
        assert_eq!(err.instr_index(), Some(3));
    }

    #[test]
    fn if_else_arms() {
        let ctx = ModuleContext::new();
        let mut v = FuncValidator::new(&ctx);
        let body = [
            Instruction::I32Const(1),
            Instruction::If(BlockType::Value(ValueType::F32)),
            Instruction::f32_const(1.5),
            Instruction::Else,
            Instruction::f32_const(2.5),
            Instruction::End,
        ];
        v.validate(&body, &[ValueType::F32]).unwrap();

        let bad_else = [
            Instruction::I32Const(1),
            Instruction::If(BlockType::Value(ValueType::F32)),
            Instruction::f32_const(1.5),
            Instruction::Else,
            Instruction::I32Const(2),
            Instruction::End,
        ];
        assert_eq!(kind_of(v.validate(&bad_else, &[ValueType::F32])), ValidationErrorKind::TypeMismatch);
    }

    #[test]
    fn else_outside_if() {
        let ctx = ModuleContext::new();
        let mut v = FuncValidator::new(&ctx);
        let body = [Instruction::Block(BlockType::Empty), Instruction::Else, Instruction::End];
        assert_eq!(kind_of(v.validate(&body, &[])), ValidationErrorKind::UnexpectedElse);
    }

    #[test]
    fn br_if_keeps_label_values() {
        let ctx = ModuleContext::new();
        let mut v = FuncValidator::new(&ctx);
        let body = [
            Instruction::Block(BlockType::Value(ValueType::I64)),
            Instruction::I64Const(7),
            Instruction::I32Const(0),
            Instruction::BrIf(0),
            Instruction::End,
        ];
        v.validate(&body, &[ValueType::I64]).unwrap();
    }

    #[test]
    fn br_table_requires_equal_labels() {
        let ctx = ModuleContext::new();
        let mut v = FuncValidator::new(&ctx);
        let body = [
            Instruction::Block(BlockType::Empty),
            Instruction::Block(BlockType::Value(ValueType::I32)),
            Instruction::I32Const(1),
            Instruction::I32Const(0),
            Instruction::BrTable {
                targets: vec![0],
                default: 1,
            },
            Instruction::End,
            Instruction::Drop,
            Instruction::End,
        ];
        let err = v.validate(&body, &[]).unwrap_err();
        assert!(err.is(ValidationErrorKind::TypeMismatch));
        assert_eq!(err.instr_index(), Some(4));
    }

    #[test]
    fn return_in_nested_block() {
        let ctx = ModuleContext::new();
        let mut v = FuncValidator::new(&ctx);
        let body = [
            Instruction::Block(BlockType::Empty),
            Instruction::F64Const(0),
            Instruction::Return,
            Instruction::End,
            Instruction::F64Const(0),
        ];
        v.validate(&body, &[ValueType::F64]).unwrap();
    }

    #[test]
    fn branch_depth_out_of_range() {
        let ctx = ModuleContext::new();
        let mut v = FuncValidator::new(&ctx);
        let err = v.validate(&[Instruction::Br(1)], &[]).unwrap_err();
        assert!(err.is(ValidationErrorKind::InvalidBranchDepth));
        assert_eq!(err.instr_index(), Some(0));
    }

    #[test]
    fn select_resolves_wildcards() {
        let ctx = ModuleContext::new();
        let mut v = FuncValidator::new(&ctx);
        let body = [
            Instruction::Unreachable,
            Instruction::I64Const(3),
            Instruction::I32Const(1),
            Instruction::Select,
        ];
        v.validate(&body, &[ValueType::I64]).unwrap();

        let mismatched = [
            Instruction::I64Const(3),
            Instruction::F64Const(0),
            Instruction::I32Const(1),
            Instruction::Select,
        ];
        assert_eq!(kind_of(v.validate(&mismatched, &[ValueType::I64])), ValidationErrorKind::TypeMismatch);
    }

    #[test]
    fn calls() {
        let mut ctx = ModuleContext::new();
        let sig = ctx.add_type(FuncType::new(vec![ValueType::I32, ValueType::F64], vec![ValueType::I64]));
        let callee = ctx.add_func(sig).unwrap();
        let mut v = FuncValidator::new(&ctx);

        let direct = [Instruction::I32Const(1), Instruction::F64Const(0), Instruction::Call(callee)];
        v.validate(&direct, &[ValueType::I64]).unwrap();

        let indirect = [
            Instruction::I32Const(1),
            Instruction::F64Const(0),
            Instruction::I32Const(0),
            Instruction::CallIndirect(sig),
        ];
        v.validate(&indirect, &[ValueType::I64]).unwrap();

        assert_eq!(kind_of(v.validate(&[Instruction::Call(5)], &[])), ValidationErrorKind::InvalidFunctionIndex);
        assert_eq!(kind_of(v.validate(&[Instruction::CallIndirect(5)], &[])), ValidationErrorKind::InvalidTypeIndex);
    }

    #[test]
    fn locals_and_tee() {
        let ctx = ModuleContext::new();
        let mut v = FuncValidator::new(&ctx);
        v.add_local(ValueType::I32).unwrap();
        v.add_locals(2, ValueType::F32).unwrap();

        let body = [
            Instruction::f32_const(1.0),
            Instruction::LocalTee(2),
            Instruction::LocalSet(1),
            Instruction::LocalGet(0),
        ];
        v.validate(&body, &[ValueType::I32]).unwrap();

        let wrong = [Instruction::I32Const(0), Instruction::LocalSet(1)];
        assert_eq!(kind_of(v.validate(&wrong, &[])), ValidationErrorKind::TypeMismatch);
        assert_eq!(kind_of(v.validate(&[Instruction::LocalTee(3)], &[])), ValidationErrorKind::InvalidLocalIndex);
    }

    #[test]
    fn globals() {
        let mut ctx = ModuleContext::new();
        let counter = ctx.add_global(GlobalType::mutable(ValueType::I64));
        let mut v = FuncValidator::new(&ctx);

        let body = [
            Instruction::GlobalGet(counter),
            Instruction::I64Const(1),
            Instruction::Numeric(NumericOp::I64Add),
            Instruction::GlobalSet(counter),
        ];
        v.validate(&body, &[]).unwrap();

        let wrong = [Instruction::I32Const(1), Instruction::GlobalSet(counter)];
        assert_eq!(kind_of(v.validate(&wrong, &[])), ValidationErrorKind::TypeMismatch);
        assert_eq!(kind_of(v.validate(&[Instruction::GlobalGet(1)], &[])), ValidationErrorKind::InvalidGlobalIndex);
    }

    #[test]
    fn memory_access() {
        let ctx = ModuleContext::new();
        let mut v = FuncValidator::new(&ctx);
        let body = [
            Instruction::I32Const(0),
            Instruction::I32Const(0),
            Instruction::Memory(MemoryOp::I64Load32U, MemArg::natural(MemoryOp::I64Load32U)),
            Instruction::Memory(MemoryOp::I64Store, MemArg { align: 3, offset: 8 }),
            Instruction::MemorySize,
            Instruction::MemoryGrow,
        ];
        v.validate(&body, &[ValueType::I32]).unwrap();

        let overaligned = [
            Instruction::I32Const(0),
            Instruction::Memory(MemoryOp::I32Load8U, MemArg { align: 1, offset: 0 }),
        ];
        let err = v.validate(&overaligned, &[ValueType::I32]).unwrap_err();
        assert!(err.is(ValidationErrorKind::InvalidAlignment));
        assert_eq!(err.instr_index(), Some(1));
    }

    #[test]
    fn operand_limit() {
        let ctx = ModuleContext::new();
        let config = ValidatorConfig::new().with_max_operand_stack(2);
        let mut v = FuncValidator::with_config(&ctx, config);
        let body = [Instruction::I32Const(0), Instruction::I32Const(0), Instruction::I32Const(0)];
        let err = v.validate(&body, &[]).unwrap_err();
        assert!(err.is(ValidationErrorKind::StackOverflow));
        assert_eq!(err.instr_index(), Some(2));
    }

    #[test]
    fn nesting_limit() {
        let ctx = ModuleContext::new();
        let config = ValidatorConfig::new().with_max_control_depth(2);
        let mut v = FuncValidator::with_config(&ctx, config);
        let body = [
            Instruction::Block(BlockType::Empty),
            Instruction::Block(BlockType::Empty),
            Instruction::End,
            Instruction::End,
        ];
        let err = v.validate(&body, &[]).unwrap_err();
        assert!(err.is(ValidationErrorKind::StackOverflow));
        assert_eq!(err.instr_index(), Some(1));
    }

    #[test]
    fn zero_nesting_limit_rejects_the_function_frame() {
        let ctx = ModuleContext::new();
        let config = ValidatorConfig::new().with_max_control_depth(0);
        let mut v = FuncValidator::with_config(&ctx, config);
        let err = v.validate(&[Instruction::Nop], &[]).unwrap_err();
        assert!(err.is(ValidationErrorKind::StackOverflow));
        assert_eq!(err.instr_index(), Some(0));
    }

    #[test]
    fn const_expressions() {
        let mut ctx = ModuleContext::new();
        let frozen = ctx.add_global(GlobalType::immutable(ValueType::I32));
        let counter = ctx.add_global(GlobalType::mutable(ValueType::I32));
        let mut v = FuncValidator::new(&ctx);

        v.validate_const_expr(&[Instruction::GlobalGet(frozen), Instruction::End], ValueType::I32).unwrap();
        v.validate_const_expr(&[Instruction::f64_const(2.0)], ValueType::F64).unwrap();

        let err = v.validate_const_expr(&[Instruction::GlobalGet(counter)], ValueType::I32).unwrap_err();
        assert!(err.is(ValidationErrorKind::NonConstantExpression));

        let err = v
            .validate_const_expr(
                &[Instruction::I32Const(1), Instruction::I32Const(2), Instruction::Numeric(NumericOp::I32Add)],
                ValueType::I32,
            )
            .unwrap_err();
        assert!(err.is(ValidationErrorKind::NonConstantExpression));
        assert_eq!(err.instr_index(), Some(2));

        let err = v.validate_const_expr(&[Instruction::I64Const(0)], ValueType::I32).unwrap_err();
        assert!(err.is(ValidationErrorKind::TypeMismatch));
    }

    #[test]
    fn reset_clears_locals() {
        let ctx = ModuleContext::new();
        let mut v = FuncValidator::new(&ctx);
        v.add_local(ValueType::I32).unwrap();
        v.validate(&[Instruction::LocalGet(0)], &[ValueType::I32]).unwrap();
        v.reset();
        assert!(v.locals().is_empty());
        assert!(v.operand_stack().is_empty());
        assert_eq!(kind_of(v.validate(&[Instruction::LocalGet(0)], &[ValueType::I32])), ValidationErrorKind::InvalidLocalIndex);
    }
}
