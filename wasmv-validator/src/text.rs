// wasmv - wasmv-validator
// Module: Instruction Text Reader
//
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Reading instructions from their text mnemonics.
//!
//! One instruction per string, immediates separated by whitespace:
//!
//! ```text
//! i32.const -5
//! block (result i32)
//! br_table 0 1 2
//! call_indirect (type 1)
//! i64.load32_u offset=8 align=4
//! ```
//!
//! Numeric literals follow the WebAssembly text format and are read with the
//! `wast` lexer: `_` separators, hexadecimal integers, hexadecimal floats,
//! `inf` and `nan:0x...` payloads are all accepted.
//!
//! An unknown mnemonic is reported as `UnsupportedOpcode`; a known mnemonic
//! with bad immediates as `MalformedInstruction`.

use wast::parser::{self, Parse, ParseBuffer};
use wast::token::{F32, F64};

use crate::instruction::{Instruction, MemArg, MemoryOp, NumericOp};
use crate::prelude::{Error, FromStr, Result, String, ToString, Vec};
use crate::types::{BlockType, ValueType};

const MALFORMED: Error = Error::malformed_instruction("Malformed instruction immediate");

impl FromStr for Instruction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (mnemonic, rest) = match s.find(char::is_whitespace) {
            Some(pos) => (&s[..pos], s[pos..].trim_start()),
            None => (s, ""),
        };
        if mnemonic.is_empty() {
            return Err(Error::malformed_instruction("Empty instruction"));
        }

        if let Some(op) = NumericOp::from_mnemonic(mnemonic) {
            no_immediates(rest)?;
            return Ok(Instruction::Numeric(op));
        }
        if let Some(op) = MemoryOp::from_mnemonic(mnemonic) {
            return Ok(Instruction::Memory(op, parse_memarg(op, rest)?));
        }

        let instr = match mnemonic {
            "unreachable" => no_immediates(rest).map(|()| Instruction::Unreachable)?,
            "nop" => no_immediates(rest).map(|()| Instruction::Nop)?,
            "block" => Instruction::Block(parse_block_type(rest)?),
            "loop" => Instruction::Loop(parse_block_type(rest)?),
            "if" => Instruction::If(parse_block_type(rest)?),
            "else" => no_immediates(rest).map(|()| Instruction::Else)?,
            "end" => no_immediates(rest).map(|()| Instruction::End)?,
            "br" => Instruction::Br(single_index(rest)?),
            "br_if" => Instruction::BrIf(single_index(rest)?),
            "br_table" => {
                let mut depths = rest.split_whitespace().map(parse_index).collect::<Result<Vec<u32>>>()?;
                let default = depths.pop().ok_or(MALFORMED)?;
                Instruction::BrTable {
                    targets: depths,
                    default,
                }
            }
            "return" => no_immediates(rest).map(|()| Instruction::Return)?,
            "call" => Instruction::Call(single_index(rest)?),
            "call_indirect" => Instruction::CallIndirect(parse_type_use(rest)?),
            "drop" => no_immediates(rest).map(|()| Instruction::Drop)?,
            "select" => no_immediates(rest).map(|()| Instruction::Select)?,
            "local.get" => Instruction::LocalGet(single_index(rest)?),
            "local.set" => Instruction::LocalSet(single_index(rest)?),
            "local.tee" => Instruction::LocalTee(single_index(rest)?),
            "global.get" => Instruction::GlobalGet(single_index(rest)?),
            "global.set" => Instruction::GlobalSet(single_index(rest)?),
            "memory.size" => no_immediates(rest).map(|()| Instruction::MemorySize)?,
            "memory.grow" => no_immediates(rest).map(|()| Instruction::MemoryGrow)?,
            "i32.const" => Instruction::I32Const(literal::<i32>(single_token(rest)?)?),
            "i64.const" => Instruction::I64Const(literal::<i64>(single_token(rest)?)?),
            "f32.const" => Instruction::F32Const(literal::<F32>(single_token(rest)?)?.bits),
            "f64.const" => Instruction::F64Const(literal::<F64>(single_token(rest)?)?.bits),
            _ => return Err(Error::unsupported_opcode("Unknown instruction mnemonic")),
        };
        Ok(instr)
    }
}

impl TryFrom<String> for Instruction {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Instruction> for String {
    fn from(instr: Instruction) -> Self {
        instr.to_string()
    }
}

/// Parse an instruction sequence, one instruction per line.
///
/// Blank lines and `;;` comments are skipped. Errors carry the index of the
/// instruction that failed to parse.
///
/// # Errors
///
/// Returns `UnsupportedOpcode` or `MalformedInstruction`.
pub fn parse_instructions(text: &str) -> Result<Vec<Instruction>> {
    let mut body = Vec::new();
    for line in text.lines() {
        let line = match line.find(";;") {
            Some(pos) => &line[..pos],
            None => line,
        };
        if line.trim().is_empty() {
            continue;
        }
        let instr = line.parse::<Instruction>().map_err(|e| e.at(body.len()))?;
        body.push(instr);
    }
    Ok(body)
}

fn no_immediates(rest: &str) -> Result<()> {
    if rest.is_empty() { Ok(()) } else { Err(MALFORMED) }
}

fn single_token(rest: &str) -> Result<&str> {
    let mut tokens = rest.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(token), None) => Ok(token),
        _ => Err(MALFORMED),
    }
}

fn single_index(rest: &str) -> Result<u32> {
    parse_index(single_token(rest)?)
}

fn parse_index(token: &str) -> Result<u32> {
    literal::<u32>(token)
}

/// Read a single text-format literal; the whole token must be consumed.
fn literal<T>(token: &str) -> Result<T>
where
    T: for<'a> Parse<'a>,
{
    let buf = ParseBuffer::new(token).map_err(|_| MALFORMED)?;
    parser::parse::<T>(&buf).map_err(|_| MALFORMED)
}

fn parenthesized(rest: &str) -> Option<Vec<&str>> {
    let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
    Some(inner.split_whitespace().collect())
}

fn parse_block_type(rest: &str) -> Result<BlockType> {
    if rest.is_empty() {
        return Ok(BlockType::Empty);
    }
    match parenthesized(rest).as_deref() {
        Some(["result"]) => Ok(BlockType::Empty),
        Some(["result", ty]) => ValueType::from_name(ty).map(BlockType::Value).ok_or(MALFORMED),
        Some(["type", idx]) => Ok(BlockType::FuncType(parse_index(idx)?)),
        _ => Err(MALFORMED),
    }
}

fn parse_type_use(rest: &str) -> Result<u32> {
    match parenthesized(rest).as_deref() {
        Some(["type", idx]) => parse_index(idx),
        Some(_) => Err(MALFORMED),
        None => single_index(rest),
    }
}

fn parse_memarg(op: MemoryOp, rest: &str) -> Result<MemArg> {
    let mut memarg = MemArg::natural(op);
    for token in rest.split_whitespace() {
        if let Some(offset) = token.strip_prefix("offset=") {
            memarg.offset = parse_index(offset)?;
        } else if let Some(align) = token.strip_prefix("align=") {
            let bytes = parse_index(align)?;
            if !bytes.is_power_of_two() {
                return Err(MALFORMED);
            }
            memarg.align = bytes.trailing_zeros();
        } else {
            return Err(MALFORMED);
        }
    }
    Ok(memarg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::{vec, ValidationErrorKind};

    fn parse(s: &str) -> Instruction {
        s.parse().unwrap()
    }

    fn parse_err(s: &str) -> ValidationErrorKind {
        s.parse::<Instruction>().unwrap_err().kind().unwrap()
    }

    #[test]
    fn plain_mnemonics() {
        assert_eq!(parse("nop"), Instruction::Nop);
        assert_eq!(parse("  select  "), Instruction::Select);
        assert_eq!(parse("i32.add"), Instruction::Numeric(NumericOp::I32Add));
        assert_eq!(parse("f64.promote_f32"), Instruction::Numeric(NumericOp::F64PromoteF32));
    }

    #[test]
    fn constants() {
        assert_eq!(parse("i32.const 5"), Instruction::I32Const(5));
        assert_eq!(parse("i32.const -2147483648"), Instruction::I32Const(i32::MIN));
        assert_eq!(parse("i32.const 0xffffffff"), Instruction::I32Const(-1));
        assert_eq!(parse("i64.const 1_000_000"), Instruction::I64Const(1_000_000));
        assert_eq!(parse("f64.const 1.0"), Instruction::f64_const(1.0));
        assert_eq!(parse("f32.const -0.5"), Instruction::f32_const(-0.5));
        assert_eq!(parse_err("i32.const 4294967296"), ValidationErrorKind::MalformedInstruction);
        assert_eq!(parse_err("i32.const"), ValidationErrorKind::MalformedInstruction);
        assert_eq!(parse_err("f32.const pi"), ValidationErrorKind::MalformedInstruction);
    }

    #[test]
    fn text_format_float_literals() {
        assert_eq!(parse("f64.const 0x1p-1"), Instruction::f64_const(0.5));
        assert_eq!(parse("f32.const 1_000.5"), Instruction::f32_const(1000.5));
        assert_eq!(parse("f32.const -inf"), Instruction::f32_const(f32::NEG_INFINITY));
        assert_eq!(parse("f32.const nan:0x200000"), Instruction::F32Const(0x7fa0_0000));
        assert_eq!(parse("f64.const -nan:0x1"), Instruction::F64Const(0xfff0_0000_0000_0001));
        assert_eq!(parse("f32.const 7"), Instruction::f32_const(7.0));
    }

    #[test]
    fn nan_payloads_read_back() {
        for instr in [
            Instruction::F32Const(0x7fa0_0000),
            Instruction::F32Const(0xffc0_0001),
            Instruction::F64Const(0x7ff8_0000_0000_0000),
            Instruction::F64Const(0xfff0_0000_dead_beef),
        ] {
            assert_eq!(instr.to_string().parse::<Instruction>().unwrap(), instr);
        }
        assert_eq!(Instruction::F32Const(0x7fa0_0000).to_string(), "f32.const nan:0x200000");
        assert_eq!(Instruction::F64Const(0xfff8_0000_0000_0000).to_string(), "f64.const -nan:0x8000000000000");
    }

    #[test]
    fn index_literals() {
        assert_eq!(parse("local.get 0x1"), Instruction::LocalGet(1));
        assert_eq!(parse("call 1_0"), Instruction::Call(10));
        assert_eq!(parse("global.get 4294967295"), Instruction::GlobalGet(u32::MAX));
        assert_eq!(parse_err("global.get 4294967296"), ValidationErrorKind::MalformedInstruction);
        assert_eq!(parse_err("local.get 0X1"), ValidationErrorKind::MalformedInstruction);
    }

    #[test]
    fn block_types() {
        assert_eq!(parse("block"), Instruction::Block(BlockType::Empty));
        assert_eq!(parse("loop (result f32)"), Instruction::Loop(BlockType::Value(ValueType::F32)));
        assert_eq!(parse("if (type 2)"), Instruction::If(BlockType::FuncType(2)));
        assert_eq!(parse_err("block (result v128)"), ValidationErrorKind::MalformedInstruction);
    }

    #[test]
    fn branches_and_calls() {
        assert_eq!(parse("br_if 1"), Instruction::BrIf(1));
        assert_eq!(
            parse("br_table 0 1 2"),
            Instruction::BrTable {
                targets: vec![0, 1],
                default: 2,
            }
        );
        assert_eq!(parse("call_indirect (type 3)"), Instruction::CallIndirect(3));
        assert_eq!(parse("call_indirect 3"), Instruction::CallIndirect(3));
        assert_eq!(parse_err("br_table"), ValidationErrorKind::MalformedInstruction);
        assert_eq!(parse_err("local.get -1"), ValidationErrorKind::MalformedInstruction);
        assert_eq!(parse_err("local.get 1 2"), ValidationErrorKind::MalformedInstruction);
    }

    #[test]
    fn memory_immediates() {
        assert_eq!(
            parse("i64.load32_u offset=8 align=4"),
            Instruction::Memory(MemoryOp::I64Load32U, MemArg { align: 2, offset: 8 })
        );
        assert_eq!(parse("i32.store"), Instruction::Memory(MemoryOp::I32Store, MemArg { align: 2, offset: 0 }));
        assert_eq!(parse_err("i32.load align=3"), ValidationErrorKind::MalformedInstruction);
        assert_eq!(parse_err("i32.load size=3"), ValidationErrorKind::MalformedInstruction);
    }

    #[test]
    fn unknown_and_extra_immediates() {
        assert_eq!(parse_err("v128.const 0"), ValidationErrorKind::UnsupportedOpcode);
        assert_eq!(parse_err("i32.add 1"), ValidationErrorKind::MalformedInstruction);
        assert_eq!(parse_err(""), ValidationErrorKind::MalformedInstruction);
    }

    #[test]
    fn display_reads_back() {
        let body = [
            parse("block (result i64)"),
            parse("br_table 3 0"),
            parse("call_indirect (type 1)"),
            parse("i32.load16_s offset=2 align=1"),
            parse("i64.store align=4"),
            parse("f32.const 1.25"),
            parse("f64.const -0.0"),
            parse("f64.const 1e-300"),
            parse("f32.const inf"),
            parse("i32.const -7"),
        ];
        for instr in body {
            assert_eq!(instr.to_string().parse::<Instruction>().unwrap(), instr);
        }
    }

    #[test]
    fn instruction_listing() {
        let body = parse_instructions(
            "
            ;; add one
            local.get 0
            i32.const 1   ;; constant
            i32.add
            ",
        )
        .unwrap();
        assert_eq!(body.len(), 3);

        let err = parse_instructions("nop\nbogus\n").unwrap_err();
        assert!(err.is(ValidationErrorKind::UnsupportedOpcode));
        assert_eq!(err.instr_index(), Some(1));
    }
}
