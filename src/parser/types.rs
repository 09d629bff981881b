//! Protocol-level value descriptions handed to visitors.
//!
//! None of these own module state; they are the typed form of what a visitor
//! event carries after the wire bytes have been decoded.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    // Number types
    I32,
    I64,
    F32,
    F64,
    // Vector types
    V128,
    // Reference types
    FuncRef,
    ExternRef,
}

impl ValueType {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x7f => Some(ValueType::I32),
            0x7e => Some(ValueType::I64),
            0x7d => Some(ValueType::F32),
            0x7c => Some(ValueType::F64),
            0x7b => Some(ValueType::V128),
            0x70 => Some(ValueType::FuncRef),
            0x6f => Some(ValueType::ExternRef),
            _ => None,
        }
    }

    pub fn byte(&self) -> u8 {
        match self {
            ValueType::I32 => 0x7f,
            ValueType::I64 => 0x7e,
            ValueType::F32 => 0x7d,
            ValueType::F64 => 0x7c,
            ValueType::V128 => 0x7b,
            ValueType::FuncRef => 0x70,
            ValueType::ExternRef => 0x6f,
        }
    }

    pub fn is_num(&self) -> bool {
        matches!(self, ValueType::I32 | ValueType::I64 | ValueType::F32 | ValueType::F64)
    }

    pub fn is_vec(&self) -> bool {
        *self == ValueType::V128
    }

    pub fn is_ref(&self) -> bool {
        matches!(self, ValueType::FuncRef | ValueType::ExternRef)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ValueType::I32 => "i32",
            ValueType::I64 => "i64",
            ValueType::F32 => "f32",
            ValueType::F64 => "f64",
            ValueType::V128 => "v128",
            ValueType::FuncRef => "funcref",
            ValueType::ExternRef => "externref",
        })
    }
}

/// Writes `[i32 i64]` style lists, used by `Display` impls and diagnostics.
pub fn format_types(types: &[ValueType]) -> String {
    let names: Vec<String> = types.iter().map(|t| t.to_string()).collect();
    format!("[{}]", names.join(" "))
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FuncType {
    pub params: Vec<ValueType>,
    pub results: Vec<ValueType>,
}

impl FuncType {
    pub fn new(params: Vec<ValueType>, results: Vec<ValueType>) -> Self {
        FuncType { params, results }
    }
}

impl fmt::Display for FuncType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} -> {}", format_types(&self.params), format_types(&self.results))
    }
}

/// Block type for structured control instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockType {
    /// Empty block type (no parameters or results)
    Empty,
    /// Single value type result
    Value(ValueType),
    /// Function type index for multi-value blocks
    FuncType(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub min: u32,
    pub max: Option<u32>,
}

impl Limits {
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Limits { min, max }
    }
}

impl fmt::Display for Limits {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "min = {}, max = {}", self.min, max),
            None => write!(f, "min = {}", self.min),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableType {
    pub elem_type: ValueType,
    pub limits: Limits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalType {
    pub value_type: ValueType,
    pub mutable: bool,
}

/// Import/export descriptor kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExternalKind {
    Func,
    Table,
    Memory,
    Global,
}

impl ExternalKind {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(ExternalKind::Func),
            0x01 => Some(ExternalKind::Table),
            0x02 => Some(ExternalKind::Memory),
            0x03 => Some(ExternalKind::Global),
            _ => None,
        }
    }

    pub fn byte(&self) -> u8 {
        match self {
            ExternalKind::Func => 0x00,
            ExternalKind::Table => 0x01,
            ExternalKind::Memory => 0x02,
            ExternalKind::Global => 0x03,
        }
    }
}

/// Memory argument for memory access instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemArg {
    /// Memory alignment (as power of 2)
    pub align: u32,
    /// Memory offset
    pub offset: u32,
}

/// The immediate of a `*.const` instruction.
///
/// Floats compare and serialise by bit pattern, so NaN payloads, infinities
/// and negative zero survive event comparisons and JSON alike.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Const {
    I32(i32),
    I64(i64),
    F32(#[serde(with = "f32_bits")] f32),
    F64(#[serde(with = "f64_bits")] f64),
    V128([u8; 16]),
}

mod f32_bits {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(value.to_bits())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
        u32::deserialize(deserializer).map(f32::from_bits)
    }
}

mod f64_bits {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.to_bits())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        u64::deserialize(deserializer).map(f64::from_bits)
    }
}

impl Const {
    pub fn value_type(&self) -> ValueType {
        match self {
            Const::I32(_) => ValueType::I32,
            Const::I64(_) => ValueType::I64,
            Const::F32(_) => ValueType::F32,
            Const::F64(_) => ValueType::F64,
            Const::V128(_) => ValueType::V128,
        }
    }
}

impl PartialEq for Const {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Const::I32(a), Const::I32(b)) => a == b,
            (Const::I64(a), Const::I64(b)) => a == b,
            (Const::F32(a), Const::F32(b)) => a.to_bits() == b.to_bits(),
            (Const::F64(a), Const::F64(b)) => a.to_bits() == b.to_bits(),
            (Const::V128(a), Const::V128(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_bytes() {
        for byte in 0u8..=255 {
            if let Some(t) = ValueType::from_byte(byte) {
                assert_eq!(t.byte(), byte);
            }
        }
        assert_eq!(ValueType::from_byte(0x40), None);
        assert!(ValueType::F64.is_num());
        assert!(ValueType::V128.is_vec());
        assert!(ValueType::ExternRef.is_ref());
        assert!(!ValueType::FuncRef.is_num());
    }

    #[test]
    fn test_const_nan_equality() {
        let nan = f32::from_bits(0x7fc0_0001);
        assert_eq!(Const::F32(nan), Const::F32(nan));
        assert_ne!(Const::F32(nan), Const::F32(f32::from_bits(0x7fc0_0002)));
        assert_ne!(Const::F64(0.0), Const::F64(-0.0));
        assert_ne!(Const::I32(1), Const::I64(1));
    }

    #[test]
    fn test_display() {
        let ft = FuncType::new(vec![ValueType::I32, ValueType::I64], vec![ValueType::F32]);
        assert_eq!(ft.to_string(), "[i32 i64] -> [f32]");
        assert_eq!(Limits::new(1, None).to_string(), "min = 1");
        assert_eq!(Limits::new(1, Some(2)).to_string(), "min = 1, max = 2");
    }
}
