// wasmv - wasmv-validator
// Module: Validation Types
//
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Value, stack, function, global and block types.

use crate::prelude::{fmt, Display, Vec};

/// A concrete value type, as declared by signatures, locals and globals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ValueType {
    /// 32-bit integer
    I32,
    /// 64-bit integer
    I64,
    /// 32-bit IEEE 754 float
    F32,
    /// 64-bit IEEE 754 float
    F64,
}

impl ValueType {
    /// Text name of the type (`i32`, `i64`, `f32`, `f64`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }

    /// Parse a type from its text name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "i32" => Some(Self::I32),
            "i64" => Some(Self::I64),
            "f32" => Some(Self::F32),
            "f64" => Some(Self::F64),
            _ => None,
        }
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type of a value on the operand stack.
///
/// `Unknown` only appears inside a statically unreachable region, where the
/// stack is polymorphic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackType {
    /// Wildcard produced by a pop at the floor of an unreachable frame
    Unknown,
    /// 32-bit integer
    I32,
    /// 64-bit integer
    I64,
    /// 32-bit float
    F32,
    /// 64-bit float
    F64,
}

impl StackType {
    /// Whether two stack types are compatible. `Unknown` matches anything;
    /// concrete types only match themselves.
    ///
    /// Every pop path goes through this routine.
    #[must_use]
    pub const fn matches(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::Unknown, _)
                | (_, Self::Unknown)
                | (Self::I32, Self::I32)
                | (Self::I64, Self::I64)
                | (Self::F32, Self::F32)
                | (Self::F64, Self::F64)
        )
    }

    /// Resolve `actual` against `expected`: `None` on a mismatch, otherwise
    /// the more concrete of the two.
    #[must_use]
    pub const fn resolve(actual: Self, expected: Self) -> Option<Self> {
        if !actual.matches(expected) {
            return None;
        }
        match actual {
            Self::Unknown => Some(expected),
            concrete => Some(concrete),
        }
    }

    /// Whether this is the wildcard.
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// The concrete type, if any.
    #[must_use]
    pub const fn value_type(self) -> Option<ValueType> {
        match self {
            Self::Unknown => None,
            Self::I32 => Some(ValueType::I32),
            Self::I64 => Some(ValueType::I64),
            Self::F32 => Some(ValueType::F32),
            Self::F64 => Some(ValueType::F64),
        }
    }
}

impl From<ValueType> for StackType {
    fn from(vt: ValueType) -> Self {
        match vt {
            ValueType::I32 => Self::I32,
            ValueType::I64 => Self::I64,
            ValueType::F32 => Self::F32,
            ValueType::F64 => Self::F64,
        }
    }
}

impl Display for StackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value_type() {
            Some(vt) => Display::fmt(&vt, f),
            None => f.write_str("unknown"),
        }
    }
}

/// A function signature: parameter types and result types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FuncType {
    /// Parameter types, in order
    #[cfg_attr(feature = "serde", serde(default))]
    pub params:  Vec<ValueType>,
    /// Result types, in order
    #[cfg_attr(feature = "serde", serde(default))]
    pub results: Vec<ValueType>,
}

impl FuncType {
    /// Create a new function type.
    #[must_use]
    pub fn new(params: Vec<ValueType>, results: Vec<ValueType>) -> Self {
        Self { params, results }
    }
}

impl Display for FuncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, ty) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{ty}")?;
        }
        write!(f, "] -> [")?;
        for (i, ty) in self.results.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{ty}")?;
        }
        write!(f, "]")
    }
}

/// Type of a global: its value type and mutability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlobalType {
    /// Value type of the global
    pub value_type: ValueType,
    /// Whether `global.set` may write it
    #[cfg_attr(feature = "serde", serde(default))]
    pub mutable:    bool,
}

impl GlobalType {
    /// An immutable global of the given type.
    #[must_use]
    pub const fn immutable(value_type: ValueType) -> Self {
        Self {
            value_type,
            mutable: false,
        }
    }

    /// A mutable global of the given type.
    #[must_use]
    pub const fn mutable(value_type: ValueType) -> Self {
        Self {
            value_type,
            mutable: true,
        }
    }
}

/// Signature annotation of `block`, `loop` and `if`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockType {
    /// `[] -> []`
    #[default]
    Empty,
    /// `[] -> [t]`
    Value(ValueType),
    /// Signature taken from the type section
    FuncType(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_matches_everything() {
        for ty in [StackType::I32, StackType::I64, StackType::F32, StackType::F64, StackType::Unknown] {
            assert!(StackType::Unknown.matches(ty));
            assert!(ty.matches(StackType::Unknown));
        }
    }

    #[test]
    fn concrete_types_only_match_themselves() {
        assert!(StackType::I32.matches(StackType::I32));
        assert!(!StackType::I32.matches(StackType::F64));
        assert!(!StackType::F32.matches(StackType::I64));
    }

    #[test]
    fn resolve_canonicalizes_the_wildcard() {
        assert_eq!(StackType::resolve(StackType::Unknown, StackType::F64), Some(StackType::F64));
        assert_eq!(StackType::resolve(StackType::I32, StackType::Unknown), Some(StackType::I32));
        assert_eq!(StackType::resolve(StackType::I32, StackType::I64), None);
    }

    #[test]
    fn value_type_names() {
        for ty in [ValueType::I32, ValueType::I64, ValueType::F32, ValueType::F64] {
            assert_eq!(ValueType::from_name(ty.name()), Some(ty));
        }
        assert_eq!(ValueType::from_name("v128"), None);
    }
}
