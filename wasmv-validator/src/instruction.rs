// wasmv - wasmv-validator
// Module: Decoded Instruction Set
//
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The decoded instruction set.
//!
//! [`Instruction`] is a closed enum: the rule table in [`crate::rules`]
//! matches it exhaustively, so adding an instruction without a rule is a
//! compile error. Instructions whose only effect is a fixed operand
//! signature are grouped into [`NumericOp`] and [`MemoryOp`], whose
//! signature tables are generated from a single list below.

#[cfg(feature = "serde")]
use crate::prelude::String;
use crate::prelude::{fmt, Display, Vec};
use crate::types::{BlockType, ValueType};

macro_rules! numeric_ops {
    ($( $variant:ident => $name:literal : [$($param:ident),*] -> [$($result:ident),*]; )*) => {
        /// Numeric, comparison and conversion instructions.
        ///
        /// Each has a fixed signature and no immediates.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum NumericOp {
            $(
                #[doc = concat!("`", $name, "`")]
                $variant,
            )*
        }

        impl NumericOp {
            /// Every numeric instruction.
            pub const ALL: &'static [NumericOp] = &[$(NumericOp::$variant),*];

            /// Text mnemonic.
            #[must_use]
            pub const fn mnemonic(self) -> &'static str {
                match self {
                    $(NumericOp::$variant => $name,)*
                }
            }

            /// Operand types, bottom of the stack first.
            #[must_use]
            pub const fn params(self) -> &'static [ValueType] {
                match self {
                    $(NumericOp::$variant => &[$(ValueType::$param),*],)*
                }
            }

            /// Result types.
            #[must_use]
            pub const fn results(self) -> &'static [ValueType] {
                match self {
                    $(NumericOp::$variant => &[$(ValueType::$result),*],)*
                }
            }

            /// Look up an instruction by its text mnemonic.
            #[must_use]
            pub fn from_mnemonic(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(NumericOp::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

numeric_ops! {
    // i32 comparisons
    I32Eqz => "i32.eqz": [I32] -> [I32];
    I32Eq => "i32.eq": [I32, I32] -> [I32];
    I32Ne => "i32.ne": [I32, I32] -> [I32];
    I32LtS => "i32.lt_s": [I32, I32] -> [I32];
    I32LtU => "i32.lt_u": [I32, I32] -> [I32];
    I32GtS => "i32.gt_s": [I32, I32] -> [I32];
    I32GtU => "i32.gt_u": [I32, I32] -> [I32];
    I32LeS => "i32.le_s": [I32, I32] -> [I32];
    I32LeU => "i32.le_u": [I32, I32] -> [I32];
    I32GeS => "i32.ge_s": [I32, I32] -> [I32];
    I32GeU => "i32.ge_u": [I32, I32] -> [I32];

    // i64 comparisons
    I64Eqz => "i64.eqz": [I64] -> [I32];
    I64Eq => "i64.eq": [I64, I64] -> [I32];
    I64Ne => "i64.ne": [I64, I64] -> [I32];
    I64LtS => "i64.lt_s": [I64, I64] -> [I32];
    I64LtU => "i64.lt_u": [I64, I64] -> [I32];
    I64GtS => "i64.gt_s": [I64, I64] -> [I32];
    I64GtU => "i64.gt_u": [I64, I64] -> [I32];
    I64LeS => "i64.le_s": [I64, I64] -> [I32];
    I64LeU => "i64.le_u": [I64, I64] -> [I32];
    I64GeS => "i64.ge_s": [I64, I64] -> [I32];
    I64GeU => "i64.ge_u": [I64, I64] -> [I32];

    // f32 comparisons
    F32Eq => "f32.eq": [F32, F32] -> [I32];
    F32Ne => "f32.ne": [F32, F32] -> [I32];
    F32Lt => "f32.lt": [F32, F32] -> [I32];
    F32Gt => "f32.gt": [F32, F32] -> [I32];
    F32Le => "f32.le": [F32, F32] -> [I32];
    F32Ge => "f32.ge": [F32, F32] -> [I32];

    // f64 comparisons
    F64Eq => "f64.eq": [F64, F64] -> [I32];
    F64Ne => "f64.ne": [F64, F64] -> [I32];
    F64Lt => "f64.lt": [F64, F64] -> [I32];
    F64Gt => "f64.gt": [F64, F64] -> [I32];
    F64Le => "f64.le": [F64, F64] -> [I32];
    F64Ge => "f64.ge": [F64, F64] -> [I32];

    // i32 arithmetic
    I32Clz => "i32.clz": [I32] -> [I32];
    I32Ctz => "i32.ctz": [I32] -> [I32];
    I32Popcnt => "i32.popcnt": [I32] -> [I32];
    I32Add => "i32.add": [I32, I32] -> [I32];
    I32Sub => "i32.sub": [I32, I32] -> [I32];
    I32Mul => "i32.mul": [I32, I32] -> [I32];
    I32DivS => "i32.div_s": [I32, I32] -> [I32];
    I32DivU => "i32.div_u": [I32, I32] -> [I32];
    I32RemS => "i32.rem_s": [I32, I32] -> [I32];
    I32RemU => "i32.rem_u": [I32, I32] -> [I32];
    I32And => "i32.and": [I32, I32] -> [I32];
    I32Or => "i32.or": [I32, I32] -> [I32];
    I32Xor => "i32.xor": [I32, I32] -> [I32];
    I32Shl => "i32.shl": [I32, I32] -> [I32];
    I32ShrS => "i32.shr_s": [I32, I32] -> [I32];
    I32ShrU => "i32.shr_u": [I32, I32] -> [I32];
    I32Rotl => "i32.rotl": [I32, I32] -> [I32];
    I32Rotr => "i32.rotr": [I32, I32] -> [I32];

    // i64 arithmetic
    I64Clz => "i64.clz": [I64] -> [I64];
    I64Ctz => "i64.ctz": [I64] -> [I64];
    I64Popcnt => "i64.popcnt": [I64] -> [I64];
    I64Add => "i64.add": [I64, I64] -> [I64];
    I64Sub => "i64.sub": [I64, I64] -> [I64];
    I64Mul => "i64.mul": [I64, I64] -> [I64];
    I64DivS => "i64.div_s": [I64, I64] -> [I64];
    I64DivU => "i64.div_u": [I64, I64] -> [I64];
    I64RemS => "i64.rem_s": [I64, I64] -> [I64];
    I64RemU => "i64.rem_u": [I64, I64] -> [I64];
    I64And => "i64.and": [I64, I64] -> [I64];
    I64Or => "i64.or": [I64, I64] -> [I64];
    I64Xor => "i64.xor": [I64, I64] -> [I64];
    I64Shl => "i64.shl": [I64, I64] -> [I64];
    I64ShrS => "i64.shr_s": [I64, I64] -> [I64];
    I64ShrU => "i64.shr_u": [I64, I64] -> [I64];
    I64Rotl => "i64.rotl": [I64, I64] -> [I64];
    I64Rotr => "i64.rotr": [I64, I64] -> [I64];

    // f32 arithmetic
    F32Abs => "f32.abs": [F32] -> [F32];
    F32Neg => "f32.neg": [F32] -> [F32];
    F32Ceil => "f32.ceil": [F32] -> [F32];
    F32Floor => "f32.floor": [F32] -> [F32];
    F32Trunc => "f32.trunc": [F32] -> [F32];
    F32Nearest => "f32.nearest": [F32] -> [F32];
    F32Sqrt => "f32.sqrt": [F32] -> [F32];
    F32Add => "f32.add": [F32, F32] -> [F32];
    F32Sub => "f32.sub": [F32, F32] -> [F32];
    F32Mul => "f32.mul": [F32, F32] -> [F32];
    F32Div => "f32.div": [F32, F32] -> [F32];
    F32Min => "f32.min": [F32, F32] -> [F32];
    F32Max => "f32.max": [F32, F32] -> [F32];
    F32Copysign => "f32.copysign": [F32, F32] -> [F32];

    // f64 arithmetic
    F64Abs => "f64.abs": [F64] -> [F64];
    F64Neg => "f64.neg": [F64] -> [F64];
    F64Ceil => "f64.ceil": [F64] -> [F64];
    F64Floor => "f64.floor": [F64] -> [F64];
    F64Trunc => "f64.trunc": [F64] -> [F64];
    F64Nearest => "f64.nearest": [F64] -> [F64];
    F64Sqrt => "f64.sqrt": [F64] -> [F64];
    F64Add => "f64.add": [F64, F64] -> [F64];
    F64Sub => "f64.sub": [F64, F64] -> [F64];
    F64Mul => "f64.mul": [F64, F64] -> [F64];
    F64Div => "f64.div": [F64, F64] -> [F64];
    F64Min => "f64.min": [F64, F64] -> [F64];
    F64Max => "f64.max": [F64, F64] -> [F64];
    F64Copysign => "f64.copysign": [F64, F64] -> [F64];

    // conversions
    I32WrapI64 => "i32.wrap_i64": [I64] -> [I32];
    I32TruncF32S => "i32.trunc_f32_s": [F32] -> [I32];
    I32TruncF32U => "i32.trunc_f32_u": [F32] -> [I32];
    I32TruncF64S => "i32.trunc_f64_s": [F64] -> [I32];
    I32TruncF64U => "i32.trunc_f64_u": [F64] -> [I32];
    I64ExtendI32S => "i64.extend_i32_s": [I32] -> [I64];
    I64ExtendI32U => "i64.extend_i32_u": [I32] -> [I64];
    I64TruncF32S => "i64.trunc_f32_s": [F32] -> [I64];
    I64TruncF32U => "i64.trunc_f32_u": [F32] -> [I64];
    I64TruncF64S => "i64.trunc_f64_s": [F64] -> [I64];
    I64TruncF64U => "i64.trunc_f64_u": [F64] -> [I64];
    F32ConvertI32S => "f32.convert_i32_s": [I32] -> [F32];
    F32ConvertI32U => "f32.convert_i32_u": [I32] -> [F32];
    F32ConvertI64S => "f32.convert_i64_s": [I64] -> [F32];
    F32ConvertI64U => "f32.convert_i64_u": [I64] -> [F32];
    F32DemoteF64 => "f32.demote_f64": [F64] -> [F32];
    F64ConvertI32S => "f64.convert_i32_s": [I32] -> [F64];
    F64ConvertI32U => "f64.convert_i32_u": [I32] -> [F64];
    F64ConvertI64S => "f64.convert_i64_s": [I64] -> [F64];
    F64ConvertI64U => "f64.convert_i64_u": [I64] -> [F64];
    F64PromoteF32 => "f64.promote_f32": [F32] -> [F64];
    I32ReinterpretF32 => "i32.reinterpret_f32": [F32] -> [I32];
    I64ReinterpretF64 => "i64.reinterpret_f64": [F64] -> [I64];
    F32ReinterpretI32 => "f32.reinterpret_i32": [I32] -> [F32];
    F64ReinterpretI64 => "f64.reinterpret_i64": [I64] -> [F64];

    // sign extension
    I32Extend8S => "i32.extend8_s": [I32] -> [I32];
    I32Extend16S => "i32.extend16_s": [I32] -> [I32];
    I64Extend8S => "i64.extend8_s": [I64] -> [I64];
    I64Extend16S => "i64.extend16_s": [I64] -> [I64];
    I64Extend32S => "i64.extend32_s": [I64] -> [I64];

    // saturating truncation
    I32TruncSatF32S => "i32.trunc_sat_f32_s": [F32] -> [I32];
    I32TruncSatF32U => "i32.trunc_sat_f32_u": [F32] -> [I32];
    I32TruncSatF64S => "i32.trunc_sat_f64_s": [F64] -> [I32];
    I32TruncSatF64U => "i32.trunc_sat_f64_u": [F64] -> [I32];
    I64TruncSatF32S => "i64.trunc_sat_f32_s": [F32] -> [I64];
    I64TruncSatF32U => "i64.trunc_sat_f32_u": [F32] -> [I64];
    I64TruncSatF64S => "i64.trunc_sat_f64_s": [F64] -> [I64];
    I64TruncSatF64U => "i64.trunc_sat_f64_u": [F64] -> [I64];
}

macro_rules! memory_ops {
    ($( $variant:ident => $name:literal : [$($param:ident),*] -> [$($result:ident),*], align $align:literal; )*) => {
        /// Memory load and store instructions.
        ///
        /// Each takes a [`MemArg`] immediate and has a fixed signature; the
        /// address operand is always `i32`.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum MemoryOp {
            $(
                #[doc = concat!("`", $name, "`")]
                $variant,
            )*
        }

        impl MemoryOp {
            /// Every memory instruction.
            pub const ALL: &'static [MemoryOp] = &[$(MemoryOp::$variant),*];

            /// Text mnemonic.
            #[must_use]
            pub const fn mnemonic(self) -> &'static str {
                match self {
                    $(MemoryOp::$variant => $name,)*
                }
            }

            /// Operand types, bottom of the stack first.
            #[must_use]
            pub const fn params(self) -> &'static [ValueType] {
                match self {
                    $(MemoryOp::$variant => &[$(ValueType::$param),*],)*
                }
            }

            /// Result types.
            #[must_use]
            pub const fn results(self) -> &'static [ValueType] {
                match self {
                    $(MemoryOp::$variant => &[$(ValueType::$result),*],)*
                }
            }

            /// Natural alignment as a power-of-two exponent (width in bytes
            /// is `1 << natural_align`).
            #[must_use]
            pub const fn natural_align(self) -> u32 {
                match self {
                    $(MemoryOp::$variant => $align,)*
                }
            }

            /// Look up an instruction by its text mnemonic.
            #[must_use]
            pub fn from_mnemonic(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(MemoryOp::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

memory_ops! {
    I32Load => "i32.load": [I32] -> [I32], align 2;
    I64Load => "i64.load": [I32] -> [I64], align 3;
    F32Load => "f32.load": [I32] -> [F32], align 2;
    F64Load => "f64.load": [I32] -> [F64], align 3;
    I32Load8S => "i32.load8_s": [I32] -> [I32], align 0;
    I32Load8U => "i32.load8_u": [I32] -> [I32], align 0;
    I32Load16S => "i32.load16_s": [I32] -> [I32], align 1;
    I32Load16U => "i32.load16_u": [I32] -> [I32], align 1;
    I64Load8S => "i64.load8_s": [I32] -> [I64], align 0;
    I64Load8U => "i64.load8_u": [I32] -> [I64], align 0;
    I64Load16S => "i64.load16_s": [I32] -> [I64], align 1;
    I64Load16U => "i64.load16_u": [I32] -> [I64], align 1;
    I64Load32S => "i64.load32_s": [I32] -> [I64], align 2;
    I64Load32U => "i64.load32_u": [I32] -> [I64], align 2;
    I32Store => "i32.store": [I32, I32] -> [], align 2;
    I64Store => "i64.store": [I32, I64] -> [], align 3;
    F32Store => "f32.store": [I32, F32] -> [], align 2;
    F64Store => "f64.store": [I32, F64] -> [], align 3;
    I32Store8 => "i32.store8": [I32, I32] -> [], align 0;
    I32Store16 => "i32.store16": [I32, I32] -> [], align 1;
    I64Store8 => "i64.store8": [I32, I64] -> [], align 0;
    I64Store16 => "i64.store16": [I32, I64] -> [], align 1;
    I64Store32 => "i64.store32": [I32, I64] -> [], align 2;
}

/// Immediate of a memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MemArg {
    /// Alignment hint as a power-of-two exponent
    pub align:  u32,
    /// Static address offset
    pub offset: u32,
}

impl MemArg {
    /// Memory argument with the natural alignment of `op` and no offset.
    #[must_use]
    pub const fn natural(op: MemoryOp) -> Self {
        Self {
            align:  op.natural_align(),
            offset: 0,
        }
    }
}

/// A decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub enum Instruction {
    /// `unreachable`: traps unconditionally
    Unreachable,
    /// `nop`
    Nop,
    /// `block bt`
    Block(BlockType),
    /// `loop bt`
    Loop(BlockType),
    /// `if bt`
    If(BlockType),
    /// `else`
    Else,
    /// `end`
    End,
    /// `br depth`
    Br(u32),
    /// `br_if depth`
    BrIf(u32),
    /// `br_table targets* default`
    BrTable {
        /// Branch depths selected by the index operand
        targets: Vec<u32>,
        /// Depth taken when the index is out of range
        default: u32,
    },
    /// `return`
    Return,
    /// `call funcidx`
    Call(u32),
    /// `call_indirect typeidx`
    CallIndirect(u32),
    /// `drop`
    Drop,
    /// `select`
    Select,
    /// `local.get idx`
    LocalGet(u32),
    /// `local.set idx`
    LocalSet(u32),
    /// `local.tee idx`
    LocalTee(u32),
    /// `global.get idx`
    GlobalGet(u32),
    /// `global.set idx`
    GlobalSet(u32),
    /// Load or store
    Memory(MemoryOp, MemArg),
    /// `memory.size`
    MemorySize,
    /// `memory.grow`
    MemoryGrow,
    /// `i32.const`
    I32Const(i32),
    /// `i64.const`
    I64Const(i64),
    /// `f32.const`, stored as raw bits
    F32Const(u32),
    /// `f64.const`, stored as raw bits
    F64Const(u64),
    /// Numeric, comparison or conversion instruction
    Numeric(NumericOp),
}

impl Instruction {
    /// Text mnemonic of the opcode, without immediates.
    #[must_use]
    pub const fn mnemonic(&self) -> &'static str {
        match self {
            Self::Unreachable => "unreachable",
            Self::Nop => "nop",
            Self::Block(_) => "block",
            Self::Loop(_) => "loop",
            Self::If(_) => "if",
            Self::Else => "else",
            Self::End => "end",
            Self::Br(_) => "br",
            Self::BrIf(_) => "br_if",
            Self::BrTable { .. } => "br_table",
            Self::Return => "return",
            Self::Call(_) => "call",
            Self::CallIndirect(_) => "call_indirect",
            Self::Drop => "drop",
            Self::Select => "select",
            Self::LocalGet(_) => "local.get",
            Self::LocalSet(_) => "local.set",
            Self::LocalTee(_) => "local.tee",
            Self::GlobalGet(_) => "global.get",
            Self::GlobalSet(_) => "global.set",
            Self::Memory(op, _) => op.mnemonic(),
            Self::MemorySize => "memory.size",
            Self::MemoryGrow => "memory.grow",
            Self::I32Const(_) => "i32.const",
            Self::I64Const(_) => "i64.const",
            Self::F32Const(_) => "f32.const",
            Self::F64Const(_) => "f64.const",
            Self::Numeric(op) => op.mnemonic(),
        }
    }

    /// `f32.const` from a float value.
    #[must_use]
    pub fn f32_const(value: f32) -> Self {
        Self::F32Const(value.to_bits())
    }

    /// `f64.const` from a float value.
    #[must_use]
    pub fn f64_const(value: f64) -> Self {
        Self::F64Const(value.to_bits())
    }

    /// Whether the instruction is allowed in a constant expression.
    #[must_use]
    pub const fn is_constant(&self) -> bool {
        matches!(
            self,
            Self::I32Const(_)
                | Self::I64Const(_)
                | Self::F32Const(_)
                | Self::F64Const(_)
                | Self::GlobalGet(_)
                | Self::End
        )
    }
}

impl From<NumericOp> for Instruction {
    fn from(op: NumericOp) -> Self {
        Self::Numeric(op)
    }
}

fn fmt_block_type(f: &mut fmt::Formatter<'_>, bt: BlockType) -> fmt::Result {
    match bt {
        BlockType::Empty => Ok(()),
        BlockType::Value(ty) => write!(f, " (result {ty})"),
        BlockType::FuncType(idx) => write!(f, " (type {idx})"),
    }
}

// NaNs keep their sign and payload so constants read back bit for bit.
fn fmt_nan(f: &mut fmt::Formatter<'_>, negative: bool, payload: u64) -> fmt::Result {
    let sign = if negative { "-" } else { "" };
    write!(f, " {sign}nan:0x{payload:x}")
}

impl Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())?;
        match self {
            Self::Block(bt) | Self::Loop(bt) | Self::If(bt) => fmt_block_type(f, *bt),
            Self::Br(idx)
            | Self::BrIf(idx)
            | Self::Call(idx)
            | Self::LocalGet(idx)
            | Self::LocalSet(idx)
            | Self::LocalTee(idx)
            | Self::GlobalGet(idx)
            | Self::GlobalSet(idx) => write!(f, " {idx}"),
            Self::CallIndirect(idx) => write!(f, " (type {idx})"),
            Self::BrTable { targets, default } => {
                for target in targets {
                    write!(f, " {target}")?;
                }
                write!(f, " {default}")
            }
            Self::Memory(op, memarg) => {
                if memarg.offset != 0 {
                    write!(f, " offset={}", memarg.offset)?;
                }
                if memarg.align != op.natural_align() {
                    // The text format spells alignment in bytes.
                    match 1u64.checked_shl(memarg.align) {
                        Some(bytes) => write!(f, " align={bytes}")?,
                        None => write!(f, " align=2**{}", memarg.align)?,
                    }
                }
                Ok(())
            }
            Self::I32Const(value) => write!(f, " {value}"),
            Self::I64Const(value) => write!(f, " {value}"),
            Self::F32Const(bits) => {
                let value = f32::from_bits(*bits);
                if value.is_nan() {
                    fmt_nan(f, *bits >> 31 != 0, u64::from(*bits & 0x007f_ffff))
                } else {
                    write!(f, " {value:?}")
                }
            }
            Self::F64Const(bits) => {
                let value = f64::from_bits(*bits);
                if value.is_nan() {
                    fmt_nan(f, *bits >> 63 != 0, *bits & 0x000f_ffff_ffff_ffff)
                } else {
                    write!(f, " {value:?}")
                }
            }
            Self::Unreachable
            | Self::Nop
            | Self::Else
            | Self::End
            | Self::Return
            | Self::Drop
            | Self::Select
            | Self::MemorySize
            | Self::MemoryGrow
            | Self::Numeric(_) => Ok(()),
        }
    }
}
