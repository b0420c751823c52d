// wasmv - wasmv-validator
// Module: Instruction Rules
//
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The rule table: the effect of every instruction on the operand and control
//! stacks.
//!
//! The match over [`Instruction`] is exhaustive, so every instruction the
//! decoder can produce has exactly one rule.

use crate::control::ControlKind;
use crate::instruction::Instruction;
use crate::prelude::{Error, Result};
use crate::types::StackType;
use crate::validator::FuncValidator;

const I32: StackType = StackType::I32;

/// Apply the rule for `instr`.
pub(crate) fn dispatch(v: &mut FuncValidator<'_>, instr: &Instruction) -> Result<()> {
    match instr {
        Instruction::Unreachable => v.unreachable(),
        Instruction::Nop => Ok(()),

        Instruction::Block(bt) => {
            let (params, results) = v.block_signature(*bt)?;
            v.pop_opds(&params)?;
            v.push_ctrl(ControlKind::Block, params, results)
        }
        Instruction::Loop(bt) => {
            let (params, results) = v.block_signature(*bt)?;
            v.pop_opds(&params)?;
            v.push_ctrl(ControlKind::Loop, params, results)
        }
        Instruction::If(bt) => {
            let (params, results) = v.block_signature(*bt)?;
            v.pop_expect(I32)?;
            v.pop_opds(&params)?;
            v.push_ctrl(ControlKind::If, params, results)
        }
        Instruction::Else => {
            if v.top_kind()? != ControlKind::If {
                return Err(Error::unexpected_else("else without a matching if"));
            }
            let frame = v.pop_ctrl()?;
            v.push_ctrl(ControlKind::Else, frame.start_types, frame.end_types)
        }
        Instruction::End => {
            let frame = v.pop_ctrl()?;
            // A missing else arm passes the params through unchanged.
            if frame.kind == ControlKind::If && frame.start_types != frame.end_types {
                return Err(Error::type_mismatch("if without else must not change the operand types"));
            }
            v.push_opds(&frame.end_types)
        }

        Instruction::Br(depth) => {
            v.pop_label(*depth)?;
            v.unreachable()
        }
        Instruction::BrIf(depth) => {
            v.pop_expect(I32)?;
            v.pop_label(*depth)?;
            v.push_label(*depth)
        }
        Instruction::BrTable { targets, default } => {
            v.pop_expect(I32)?;
            let expected = v.label_types(*default)?;
            for target in targets {
                if v.label_types(*target)? != expected {
                    return Err(Error::type_mismatch("br_table targets have different label types"));
                }
            }
            v.pop_label(*default)?;
            v.unreachable()
        }
        Instruction::Return => {
            v.pop_return()?;
            v.unreachable()
        }

        Instruction::Call(idx) => {
            let ty = v.context().func(*idx)?;
            v.pop_opds(&ty.params)?;
            v.push_opds(&ty.results)
        }
        Instruction::CallIndirect(idx) => {
            let ty = v.context().func_type(*idx)?;
            v.pop_expect(I32)?;
            v.pop_opds(&ty.params)?;
            v.push_opds(&ty.results)
        }

        Instruction::Drop => v.pop_opd().map(|_| ()),
        Instruction::Select => {
            v.pop_expect(I32)?;
            let first = v.pop_opd()?;
            let resolved = v.pop_expect(first)?;
            v.push_opd(resolved)
        }

        Instruction::LocalGet(idx) => {
            let ty = v.get_local(*idx)?;
            v.push_opd(ty.into())
        }
        Instruction::LocalSet(idx) => {
            v.get_local(*idx)?;
            let value = v.pop_opd()?;
            v.set_local(*idx, value)
        }
        Instruction::LocalTee(idx) => {
            let ty = v.get_local(*idx)?;
            v.pop_expect(ty.into())?;
            v.push_opd(ty.into())
        }
        Instruction::GlobalGet(idx) => {
            let global = v.get_global(*idx)?;
            v.push_opd(global.value_type.into())
        }
        Instruction::GlobalSet(idx) => {
            // Index and mutability come before the operand.
            v.writable_global(*idx)?;
            let value = v.pop_opd()?;
            v.set_global(*idx, value)
        }

        Instruction::Memory(op, memarg) => {
            if memarg.align > op.natural_align() {
                return Err(Error::invalid_alignment("Alignment exceeds the natural alignment of the access"));
            }
            v.pop_opds(op.params())?;
            v.push_opds(op.results())
        }
        Instruction::MemorySize => v.push_opd(I32),
        Instruction::MemoryGrow => {
            v.pop_expect(I32)?;
            v.push_opd(I32)
        }

        Instruction::I32Const(_) => v.push_opd(StackType::I32),
        Instruction::I64Const(_) => v.push_opd(StackType::I64),
        Instruction::F32Const(_) => v.push_opd(StackType::F32),
        Instruction::F64Const(_) => v.push_opd(StackType::F64),

        Instruction::Numeric(op) => {
            v.pop_opds(op.params())?;
            v.push_opds(op.results())
        }
    }
}
