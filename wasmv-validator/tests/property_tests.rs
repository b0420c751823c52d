//! Property tests over generated instruction sequences.
//!
//! Sequences are built by a small type-tracking generator, so every generated
//! body is well typed by construction and its result types are known.

use proptest::prelude::*;
use wasmv_validator::{
    BlockType, FuncValidator, Instruction, ModuleContext, NumericOp, StackType, ValidationErrorKind, ValueType,
};

const LOCALS: [ValueType; 4] = [ValueType::I32, ValueType::I64, ValueType::F32, ValueType::F64];

fn constant(ty: ValueType) -> Instruction {
    match ty {
        ValueType::I32 => Instruction::I32Const(0),
        ValueType::I64 => Instruction::I64Const(0),
        ValueType::F32 => Instruction::f32_const(0.0),
        ValueType::F64 => Instruction::f64_const(0.0),
    }
}

fn local_index(ty: ValueType) -> u32 {
    LOCALS.iter().position(|l| *l == ty).unwrap_or(0) as u32
}

/// Turn raw choices into a well-typed body and its result types.
fn build(choices: &[u8]) -> (Vec<Instruction>, Vec<ValueType>) {
    let mut body = Vec::new();
    let mut stack: Vec<ValueType> = Vec::new();
    let mut floors: Vec<usize> = Vec::new();

    for &choice in choices {
        let floor = floors.last().copied().unwrap_or(0);
        let arg = usize::from(choice / 8);
        match choice % 8 {
            1 => {
                let candidates: Vec<NumericOp> = NumericOp::ALL
                    .iter()
                    .copied()
                    .filter(|op| stack[floor..].ends_with(op.params()))
                    .collect();
                if candidates.is_empty() {
                    body.push(constant(LOCALS[arg % 4]));
                    stack.push(LOCALS[arg % 4]);
                } else {
                    let op = candidates[arg % candidates.len()];
                    stack.truncate(stack.len() - op.params().len());
                    stack.extend_from_slice(op.results());
                    body.push(Instruction::Numeric(op));
                }
            }
            2 if stack.len() > floor => {
                stack.pop();
                body.push(Instruction::Drop);
            }
            3 => {
                floors.push(stack.len());
                body.push(Instruction::Block(BlockType::Empty));
            }
            4 if !floors.is_empty() => {
                while stack.len() > floor {
                    stack.pop();
                    body.push(Instruction::Drop);
                }
                floors.pop();
                body.push(Instruction::End);
            }
            5 if stack.len() >= floor + 2 && stack[stack.len() - 1] == stack[stack.len() - 2] => {
                stack.pop();
                body.push(Instruction::I32Const(1));
                body.push(Instruction::Select);
            }
            6 => {
                let ty = LOCALS[arg % 4];
                stack.push(ty);
                body.push(Instruction::LocalGet(local_index(ty)));
            }
            7 if stack.len() > floor => {
                let ty = stack[stack.len() - 1];
                if arg % 2 == 0 {
                    stack.pop();
                    body.push(Instruction::LocalSet(local_index(ty)));
                } else {
                    body.push(Instruction::LocalTee(local_index(ty)));
                }
            }
            _ => {
                let ty = LOCALS[arg % 4];
                stack.push(ty);
                body.push(constant(ty));
            }
        }
    }

    while let Some(floor) = floors.pop() {
        while stack.len() > floor {
            stack.pop();
            body.push(Instruction::Drop);
        }
        body.push(Instruction::End);
    }
    (body, stack)
}

fn validator(ctx: &ModuleContext) -> FuncValidator<'_> {
    let mut validator = FuncValidator::new(ctx);
    for ty in LOCALS {
        validator.add_local(ty).unwrap();
    }
    validator
}

proptest! {
    #[test]
    fn well_typed_sequences_validate(choices in prop::collection::vec(any::<u8>(), 0..256)) {
        let (body, results) = build(&choices);
        let ctx = ModuleContext::new();
        let mut v = validator(&ctx);

        prop_assert!(v.validate(&body, &results).is_ok());
        let expected: Vec<StackType> = results.iter().copied().map(StackType::from).collect();
        prop_assert_eq!(v.operand_stack(), expected.as_slice());
        prop_assert_eq!(v.control_depth(), 0);
    }

    #[test]
    fn injected_mismatch_is_reported(choices in prop::collection::vec(any::<u8>(), 0..128)) {
        let (mut body, results) = build(&choices);
        let at = body.len() + 1;
        body.push(Instruction::f64_const(1.0));
        body.push(Instruction::Numeric(NumericOp::I32Eqz));

        let ctx = ModuleContext::new();
        let err = validator(&ctx).validate(&body, &results).unwrap_err();
        prop_assert_eq!(err.kind(), Some(ValidationErrorKind::TypeMismatch));
        prop_assert_eq!(err.instr_index(), Some(at));
    }

    #[test]
    fn validation_is_deterministic(choices in prop::collection::vec(any::<u8>(), 0..128), flip in any::<bool>()) {
        let (body, mut results) = build(&choices);
        if flip {
            results.push(ValueType::F64);
        }
        let ctx = ModuleContext::new();
        let mut v = validator(&ctx);
        let first = v.validate(&body, &results);
        let second = v.validate(&body, &results);
        prop_assert_eq!(first, second);
    }
}
