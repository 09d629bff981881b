//! Opcode identities.
//!
//! An [`Opcode`] names one instruction: a single-byte opcode, or a prefix
//! byte (0xFC, 0xFD) plus a LEB128 sub-opcode. The constants below cover
//! every instruction the attribute table knows about; their static
//! properties live in [`crate::parser::attributes`].

use crate::parser::attributes;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const PREFIX_MISC: u8 = 0xFC;
pub const PREFIX_VECTOR: u8 = 0xFD;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Opcode {
    Plain(u8),
    /// 0xFC-prefixed: saturating truncation, bulk memory and table ops.
    Misc(u32),
    /// 0xFD-prefixed vector instructions.
    Vector(u32),
}

impl Opcode {
    pub fn prefix(&self) -> Option<u8> {
        match self {
            Opcode::Plain(_) => None,
            Opcode::Misc(_) => Some(PREFIX_MISC),
            Opcode::Vector(_) => Some(PREFIX_VECTOR),
        }
    }

    pub fn mnemonic(&self) -> Option<&'static str> {
        attributes::lookup(*self).map(|attrs| attrs.mnemonic)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.mnemonic(), self) {
            (Some(mnemonic), _) => f.write_str(mnemonic),
            (None, Opcode::Plain(op)) => write!(f, "{:#04x}", op),
            (None, Opcode::Misc(sub)) => write!(f, "{:#04x} {}", PREFIX_MISC, sub),
            (None, Opcode::Vector(sub)) => write!(f, "{:#04x} {}", PREFIX_VECTOR, sub),
        }
    }
}

// ---------------------------------------------------------------------------
// Control instructions
// ---------------------------------------------------------------------------

pub const UNREACHABLE: Opcode = Opcode::Plain(0x00);
pub const NOP: Opcode = Opcode::Plain(0x01);
pub const BLOCK: Opcode = Opcode::Plain(0x02);
pub const LOOP: Opcode = Opcode::Plain(0x03);
pub const IF: Opcode = Opcode::Plain(0x04);
pub const ELSE: Opcode = Opcode::Plain(0x05);
pub const END: Opcode = Opcode::Plain(0x0B);
pub const BR: Opcode = Opcode::Plain(0x0C);
pub const BR_IF: Opcode = Opcode::Plain(0x0D);
pub const BR_TABLE: Opcode = Opcode::Plain(0x0E);
pub const RETURN: Opcode = Opcode::Plain(0x0F);
pub const CALL: Opcode = Opcode::Plain(0x10);
pub const CALL_INDIRECT: Opcode = Opcode::Plain(0x11);

// ---------------------------------------------------------------------------
// Reference instructions
// ---------------------------------------------------------------------------

pub const REF_NULL: Opcode = Opcode::Plain(0xD0);
pub const REF_IS_NULL: Opcode = Opcode::Plain(0xD1);
pub const REF_FUNC: Opcode = Opcode::Plain(0xD2);

// ---------------------------------------------------------------------------
// Parametric instructions
// ---------------------------------------------------------------------------

pub const DROP: Opcode = Opcode::Plain(0x1A);
pub const SELECT: Opcode = Opcode::Plain(0x1B);
pub const SELECT_TYPED: Opcode = Opcode::Plain(0x1C);

// ---------------------------------------------------------------------------
// Variable and table instructions
// ---------------------------------------------------------------------------

pub const LOCAL_GET: Opcode = Opcode::Plain(0x20);
pub const LOCAL_SET: Opcode = Opcode::Plain(0x21);
pub const LOCAL_TEE: Opcode = Opcode::Plain(0x22);
pub const GLOBAL_GET: Opcode = Opcode::Plain(0x23);
pub const GLOBAL_SET: Opcode = Opcode::Plain(0x24);
pub const TABLE_GET: Opcode = Opcode::Plain(0x25);
pub const TABLE_SET: Opcode = Opcode::Plain(0x26);

// ---------------------------------------------------------------------------
// Memory instructions
// ---------------------------------------------------------------------------

pub const I32_LOAD: Opcode = Opcode::Plain(0x28);
pub const I64_LOAD: Opcode = Opcode::Plain(0x29);
pub const F32_LOAD: Opcode = Opcode::Plain(0x2A);
pub const F64_LOAD: Opcode = Opcode::Plain(0x2B);
pub const I32_LOAD8_S: Opcode = Opcode::Plain(0x2C);
pub const I32_LOAD8_U: Opcode = Opcode::Plain(0x2D);
pub const I32_LOAD16_S: Opcode = Opcode::Plain(0x2E);
pub const I32_LOAD16_U: Opcode = Opcode::Plain(0x2F);
pub const I64_LOAD8_S: Opcode = Opcode::Plain(0x30);
pub const I64_LOAD8_U: Opcode = Opcode::Plain(0x31);
pub const I64_LOAD16_S: Opcode = Opcode::Plain(0x32);
pub const I64_LOAD16_U: Opcode = Opcode::Plain(0x33);
pub const I64_LOAD32_S: Opcode = Opcode::Plain(0x34);
pub const I64_LOAD32_U: Opcode = Opcode::Plain(0x35);
pub const I32_STORE: Opcode = Opcode::Plain(0x36);
pub const I64_STORE: Opcode = Opcode::Plain(0x37);
pub const F32_STORE: Opcode = Opcode::Plain(0x38);
pub const F64_STORE: Opcode = Opcode::Plain(0x39);
pub const I32_STORE8: Opcode = Opcode::Plain(0x3A);
pub const I32_STORE16: Opcode = Opcode::Plain(0x3B);
pub const I64_STORE8: Opcode = Opcode::Plain(0x3C);
pub const I64_STORE16: Opcode = Opcode::Plain(0x3D);
pub const I64_STORE32: Opcode = Opcode::Plain(0x3E);
pub const MEMORY_SIZE: Opcode = Opcode::Plain(0x3F);
pub const MEMORY_GROW: Opcode = Opcode::Plain(0x40);

// ---------------------------------------------------------------------------
// Numeric instructions
// ---------------------------------------------------------------------------

pub const I32_CONST: Opcode = Opcode::Plain(0x41);
pub const I64_CONST: Opcode = Opcode::Plain(0x42);
pub const F32_CONST: Opcode = Opcode::Plain(0x43);
pub const F64_CONST: Opcode = Opcode::Plain(0x44);

pub const I32_EQZ: Opcode = Opcode::Plain(0x45);
pub const I32_EQ: Opcode = Opcode::Plain(0x46);
pub const I32_NE: Opcode = Opcode::Plain(0x47);
pub const I32_LT_S: Opcode = Opcode::Plain(0x48);
pub const I32_LT_U: Opcode = Opcode::Plain(0x49);
pub const I32_GT_S: Opcode = Opcode::Plain(0x4A);
pub const I32_GT_U: Opcode = Opcode::Plain(0x4B);
pub const I32_LE_S: Opcode = Opcode::Plain(0x4C);
pub const I32_LE_U: Opcode = Opcode::Plain(0x4D);
pub const I32_GE_S: Opcode = Opcode::Plain(0x4E);
pub const I32_GE_U: Opcode = Opcode::Plain(0x4F);

pub const I64_EQZ: Opcode = Opcode::Plain(0x50);
pub const I64_EQ: Opcode = Opcode::Plain(0x51);
pub const I64_NE: Opcode = Opcode::Plain(0x52);
pub const I64_LT_S: Opcode = Opcode::Plain(0x53);
pub const I64_LT_U: Opcode = Opcode::Plain(0x54);
pub const I64_GT_S: Opcode = Opcode::Plain(0x55);
pub const I64_GT_U: Opcode = Opcode::Plain(0x56);
pub const I64_LE_S: Opcode = Opcode::Plain(0x57);
pub const I64_LE_U: Opcode = Opcode::Plain(0x58);
pub const I64_GE_S: Opcode = Opcode::Plain(0x59);
pub const I64_GE_U: Opcode = Opcode::Plain(0x5A);

pub const F32_EQ: Opcode = Opcode::Plain(0x5B);
pub const F32_NE: Opcode = Opcode::Plain(0x5C);
pub const F32_LT: Opcode = Opcode::Plain(0x5D);
pub const F32_GT: Opcode = Opcode::Plain(0x5E);
pub const F32_LE: Opcode = Opcode::Plain(0x5F);
pub const F32_GE: Opcode = Opcode::Plain(0x60);

pub const F64_EQ: Opcode = Opcode::Plain(0x61);
pub const F64_NE: Opcode = Opcode::Plain(0x62);
pub const F64_LT: Opcode = Opcode::Plain(0x63);
pub const F64_GT: Opcode = Opcode::Plain(0x64);
pub const F64_LE: Opcode = Opcode::Plain(0x65);
pub const F64_GE: Opcode = Opcode::Plain(0x66);

pub const I32_CLZ: Opcode = Opcode::Plain(0x67);
pub const I32_CTZ: Opcode = Opcode::Plain(0x68);
pub const I32_POPCNT: Opcode = Opcode::Plain(0x69);
pub const I32_ADD: Opcode = Opcode::Plain(0x6A);
pub const I32_SUB: Opcode = Opcode::Plain(0x6B);
pub const I32_MUL: Opcode = Opcode::Plain(0x6C);
pub const I32_DIV_S: Opcode = Opcode::Plain(0x6D);
pub const I32_DIV_U: Opcode = Opcode::Plain(0x6E);
pub const I32_REM_S: Opcode = Opcode::Plain(0x6F);
pub const I32_REM_U: Opcode = Opcode::Plain(0x70);
pub const I32_AND: Opcode = Opcode::Plain(0x71);
pub const I32_OR: Opcode = Opcode::Plain(0x72);
pub const I32_XOR: Opcode = Opcode::Plain(0x73);
pub const I32_SHL: Opcode = Opcode::Plain(0x74);
pub const I32_SHR_S: Opcode = Opcode::Plain(0x75);
pub const I32_SHR_U: Opcode = Opcode::Plain(0x76);
pub const I32_ROTL: Opcode = Opcode::Plain(0x77);
pub const I32_ROTR: Opcode = Opcode::Plain(0x78);

pub const I64_CLZ: Opcode = Opcode::Plain(0x79);
pub const I64_CTZ: Opcode = Opcode::Plain(0x7A);
pub const I64_POPCNT: Opcode = Opcode::Plain(0x7B);
pub const I64_ADD: Opcode = Opcode::Plain(0x7C);
pub const I64_SUB: Opcode = Opcode::Plain(0x7D);
pub const I64_MUL: Opcode = Opcode::Plain(0x7E);
pub const I64_DIV_S: Opcode = Opcode::Plain(0x7F);
pub const I64_DIV_U: Opcode = Opcode::Plain(0x80);
pub const I64_REM_S: Opcode = Opcode::Plain(0x81);
pub const I64_REM_U: Opcode = Opcode::Plain(0x82);
pub const I64_AND: Opcode = Opcode::Plain(0x83);
pub const I64_OR: Opcode = Opcode::Plain(0x84);
pub const I64_XOR: Opcode = Opcode::Plain(0x85);
pub const I64_SHL: Opcode = Opcode::Plain(0x86);
pub const I64_SHR_S: Opcode = Opcode::Plain(0x87);
pub const I64_SHR_U: Opcode = Opcode::Plain(0x88);
pub const I64_ROTL: Opcode = Opcode::Plain(0x89);
pub const I64_ROTR: Opcode = Opcode::Plain(0x8A);

pub const F32_ABS: Opcode = Opcode::Plain(0x8B);
pub const F32_NEG: Opcode = Opcode::Plain(0x8C);
pub const F32_CEIL: Opcode = Opcode::Plain(0x8D);
pub const F32_FLOOR: Opcode = Opcode::Plain(0x8E);
pub const F32_TRUNC: Opcode = Opcode::Plain(0x8F);
pub const F32_NEAREST: Opcode = Opcode::Plain(0x90);
pub const F32_SQRT: Opcode = Opcode::Plain(0x91);
pub const F32_ADD: Opcode = Opcode::Plain(0x92);
pub const F32_SUB: Opcode = Opcode::Plain(0x93);
pub const F32_MUL: Opcode = Opcode::Plain(0x94);
pub const F32_DIV: Opcode = Opcode::Plain(0x95);
pub const F32_MIN: Opcode = Opcode::Plain(0x96);
pub const F32_MAX: Opcode = Opcode::Plain(0x97);
pub const F32_COPYSIGN: Opcode = Opcode::Plain(0x98);

pub const F64_ABS: Opcode = Opcode::Plain(0x99);
pub const F64_NEG: Opcode = Opcode::Plain(0x9A);
pub const F64_CEIL: Opcode = Opcode::Plain(0x9B);
pub const F64_FLOOR: Opcode = Opcode::Plain(0x9C);
pub const F64_TRUNC: Opcode = Opcode::Plain(0x9D);
pub const F64_NEAREST: Opcode = Opcode::Plain(0x9E);
pub const F64_SQRT: Opcode = Opcode::Plain(0x9F);
pub const F64_ADD: Opcode = Opcode::Plain(0xA0);
pub const F64_SUB: Opcode = Opcode::Plain(0xA1);
pub const F64_MUL: Opcode = Opcode::Plain(0xA2);
pub const F64_DIV: Opcode = Opcode::Plain(0xA3);
pub const F64_MIN: Opcode = Opcode::Plain(0xA4);
pub const F64_MAX: Opcode = Opcode::Plain(0xA5);
pub const F64_COPYSIGN: Opcode = Opcode::Plain(0xA6);

pub const I32_WRAP_I64: Opcode = Opcode::Plain(0xA7);
pub const I32_TRUNC_F32_S: Opcode = Opcode::Plain(0xA8);
pub const I32_TRUNC_F32_U: Opcode = Opcode::Plain(0xA9);
pub const I32_TRUNC_F64_S: Opcode = Opcode::Plain(0xAA);
pub const I32_TRUNC_F64_U: Opcode = Opcode::Plain(0xAB);
pub const I64_EXTEND_I32_S: Opcode = Opcode::Plain(0xAC);
pub const I64_EXTEND_I32_U: Opcode = Opcode::Plain(0xAD);
pub const I64_TRUNC_F32_S: Opcode = Opcode::Plain(0xAE);
pub const I64_TRUNC_F32_U: Opcode = Opcode::Plain(0xAF);
pub const I64_TRUNC_F64_S: Opcode = Opcode::Plain(0xB0);
pub const I64_TRUNC_F64_U: Opcode = Opcode::Plain(0xB1);
pub const F32_CONVERT_I32_S: Opcode = Opcode::Plain(0xB2);
pub const F32_CONVERT_I32_U: Opcode = Opcode::Plain(0xB3);
pub const F32_CONVERT_I64_S: Opcode = Opcode::Plain(0xB4);
pub const F32_CONVERT_I64_U: Opcode = Opcode::Plain(0xB5);
pub const F32_DEMOTE_F64: Opcode = Opcode::Plain(0xB6);
pub const F64_CONVERT_I32_S: Opcode = Opcode::Plain(0xB7);
pub const F64_CONVERT_I32_U: Opcode = Opcode::Plain(0xB8);
pub const F64_CONVERT_I64_S: Opcode = Opcode::Plain(0xB9);
pub const F64_CONVERT_I64_U: Opcode = Opcode::Plain(0xBA);
pub const F64_PROMOTE_F32: Opcode = Opcode::Plain(0xBB);
pub const I32_REINTERPRET_F32: Opcode = Opcode::Plain(0xBC);
pub const I64_REINTERPRET_F64: Opcode = Opcode::Plain(0xBD);
pub const F32_REINTERPRET_I32: Opcode = Opcode::Plain(0xBE);
pub const F64_REINTERPRET_I64: Opcode = Opcode::Plain(0xBF);

pub const I32_EXTEND8_S: Opcode = Opcode::Plain(0xC0);
pub const I32_EXTEND16_S: Opcode = Opcode::Plain(0xC1);
pub const I64_EXTEND8_S: Opcode = Opcode::Plain(0xC2);
pub const I64_EXTEND16_S: Opcode = Opcode::Plain(0xC3);
pub const I64_EXTEND32_S: Opcode = Opcode::Plain(0xC4);

// ---------------------------------------------------------------------------
// 0xFC prefix
// ---------------------------------------------------------------------------

pub const I32_TRUNC_SAT_F32_S: Opcode = Opcode::Misc(0);
pub const I32_TRUNC_SAT_F32_U: Opcode = Opcode::Misc(1);
pub const I32_TRUNC_SAT_F64_S: Opcode = Opcode::Misc(2);
pub const I32_TRUNC_SAT_F64_U: Opcode = Opcode::Misc(3);
pub const I64_TRUNC_SAT_F32_S: Opcode = Opcode::Misc(4);
pub const I64_TRUNC_SAT_F32_U: Opcode = Opcode::Misc(5);
pub const I64_TRUNC_SAT_F64_S: Opcode = Opcode::Misc(6);
pub const I64_TRUNC_SAT_F64_U: Opcode = Opcode::Misc(7);
pub const MEMORY_INIT: Opcode = Opcode::Misc(8);
pub const DATA_DROP: Opcode = Opcode::Misc(9);
pub const MEMORY_COPY: Opcode = Opcode::Misc(10);
pub const MEMORY_FILL: Opcode = Opcode::Misc(11);
pub const TABLE_INIT: Opcode = Opcode::Misc(12);
pub const ELEM_DROP: Opcode = Opcode::Misc(13);
pub const TABLE_COPY: Opcode = Opcode::Misc(14);
pub const TABLE_GROW: Opcode = Opcode::Misc(15);
pub const TABLE_SIZE: Opcode = Opcode::Misc(16);
pub const TABLE_FILL: Opcode = Opcode::Misc(17);

// ---------------------------------------------------------------------------
// 0xFD prefix: vector instructions
// ---------------------------------------------------------------------------

pub const V128_LOAD: Opcode = Opcode::Vector(0x00);
pub const V128_LOAD8X8_S: Opcode = Opcode::Vector(0x01);
pub const V128_LOAD8X8_U: Opcode = Opcode::Vector(0x02);
pub const V128_LOAD16X4_S: Opcode = Opcode::Vector(0x03);
pub const V128_LOAD16X4_U: Opcode = Opcode::Vector(0x04);
pub const V128_LOAD32X2_S: Opcode = Opcode::Vector(0x05);
pub const V128_LOAD32X2_U: Opcode = Opcode::Vector(0x06);
pub const V128_LOAD8_SPLAT: Opcode = Opcode::Vector(0x07);
pub const V128_LOAD16_SPLAT: Opcode = Opcode::Vector(0x08);
pub const V128_LOAD32_SPLAT: Opcode = Opcode::Vector(0x09);
pub const V128_LOAD64_SPLAT: Opcode = Opcode::Vector(0x0A);
pub const V128_STORE: Opcode = Opcode::Vector(0x0B);
pub const V128_CONST: Opcode = Opcode::Vector(0x0C);
pub const I8X16_SHUFFLE: Opcode = Opcode::Vector(0x0D);
pub const I8X16_SWIZZLE: Opcode = Opcode::Vector(0x0E);
pub const I8X16_SPLAT: Opcode = Opcode::Vector(0x0F);
pub const I16X8_SPLAT: Opcode = Opcode::Vector(0x10);
pub const I32X4_SPLAT: Opcode = Opcode::Vector(0x11);
pub const I64X2_SPLAT: Opcode = Opcode::Vector(0x12);
pub const F32X4_SPLAT: Opcode = Opcode::Vector(0x13);
pub const F64X2_SPLAT: Opcode = Opcode::Vector(0x14);

pub const I8X16_EXTRACT_LANE_S: Opcode = Opcode::Vector(0x15);
pub const I8X16_EXTRACT_LANE_U: Opcode = Opcode::Vector(0x16);
pub const I8X16_REPLACE_LANE: Opcode = Opcode::Vector(0x17);
pub const I16X8_EXTRACT_LANE_S: Opcode = Opcode::Vector(0x18);
pub const I16X8_EXTRACT_LANE_U: Opcode = Opcode::Vector(0x19);
pub const I16X8_REPLACE_LANE: Opcode = Opcode::Vector(0x1A);
pub const I32X4_EXTRACT_LANE: Opcode = Opcode::Vector(0x1B);
pub const I32X4_REPLACE_LANE: Opcode = Opcode::Vector(0x1C);
pub const I64X2_EXTRACT_LANE: Opcode = Opcode::Vector(0x1D);
pub const I64X2_REPLACE_LANE: Opcode = Opcode::Vector(0x1E);
pub const F32X4_EXTRACT_LANE: Opcode = Opcode::Vector(0x1F);
pub const F32X4_REPLACE_LANE: Opcode = Opcode::Vector(0x20);
pub const F64X2_EXTRACT_LANE: Opcode = Opcode::Vector(0x21);
pub const F64X2_REPLACE_LANE: Opcode = Opcode::Vector(0x22);

pub const I8X16_EQ: Opcode = Opcode::Vector(0x23);
pub const I8X16_NE: Opcode = Opcode::Vector(0x24);
pub const I8X16_LT_S: Opcode = Opcode::Vector(0x25);
pub const I8X16_LT_U: Opcode = Opcode::Vector(0x26);
pub const I8X16_GT_S: Opcode = Opcode::Vector(0x27);
pub const I8X16_GT_U: Opcode = Opcode::Vector(0x28);
pub const I8X16_LE_S: Opcode = Opcode::Vector(0x29);
pub const I8X16_LE_U: Opcode = Opcode::Vector(0x2A);
pub const I8X16_GE_S: Opcode = Opcode::Vector(0x2B);
pub const I8X16_GE_U: Opcode = Opcode::Vector(0x2C);
pub const I16X8_EQ: Opcode = Opcode::Vector(0x2D);
pub const I16X8_NE: Opcode = Opcode::Vector(0x2E);
pub const I16X8_LT_S: Opcode = Opcode::Vector(0x2F);
pub const I16X8_LT_U: Opcode = Opcode::Vector(0x30);
pub const I16X8_GT_S: Opcode = Opcode::Vector(0x31);
pub const I16X8_GT_U: Opcode = Opcode::Vector(0x32);
pub const I16X8_LE_S: Opcode = Opcode::Vector(0x33);
pub const I16X8_LE_U: Opcode = Opcode::Vector(0x34);
pub const I16X8_GE_S: Opcode = Opcode::Vector(0x35);
pub const I16X8_GE_U: Opcode = Opcode::Vector(0x36);
pub const I32X4_EQ: Opcode = Opcode::Vector(0x37);
pub const I32X4_NE: Opcode = Opcode::Vector(0x38);
pub const I32X4_LT_S: Opcode = Opcode::Vector(0x39);
pub const I32X4_LT_U: Opcode = Opcode::Vector(0x3A);
pub const I32X4_GT_S: Opcode = Opcode::Vector(0x3B);
pub const I32X4_GT_U: Opcode = Opcode::Vector(0x3C);
pub const I32X4_LE_S: Opcode = Opcode::Vector(0x3D);
pub const I32X4_LE_U: Opcode = Opcode::Vector(0x3E);
pub const I32X4_GE_S: Opcode = Opcode::Vector(0x3F);
pub const I32X4_GE_U: Opcode = Opcode::Vector(0x40);
pub const F32X4_EQ: Opcode = Opcode::Vector(0x41);
pub const F32X4_NE: Opcode = Opcode::Vector(0x42);
pub const F32X4_LT: Opcode = Opcode::Vector(0x43);
pub const F32X4_GT: Opcode = Opcode::Vector(0x44);
pub const F32X4_LE: Opcode = Opcode::Vector(0x45);
pub const F32X4_GE: Opcode = Opcode::Vector(0x46);
pub const F64X2_EQ: Opcode = Opcode::Vector(0x47);
pub const F64X2_NE: Opcode = Opcode::Vector(0x48);
pub const F64X2_LT: Opcode = Opcode::Vector(0x49);
pub const F64X2_GT: Opcode = Opcode::Vector(0x4A);
pub const F64X2_LE: Opcode = Opcode::Vector(0x4B);
pub const F64X2_GE: Opcode = Opcode::Vector(0x4C);

pub const V128_NOT: Opcode = Opcode::Vector(0x4D);
pub const V128_AND: Opcode = Opcode::Vector(0x4E);
pub const V128_ANDNOT: Opcode = Opcode::Vector(0x4F);
pub const V128_OR: Opcode = Opcode::Vector(0x50);
pub const V128_XOR: Opcode = Opcode::Vector(0x51);
pub const V128_BITSELECT: Opcode = Opcode::Vector(0x52);
pub const V128_ANY_TRUE: Opcode = Opcode::Vector(0x53);

pub const V128_LOAD8_LANE: Opcode = Opcode::Vector(0x54);
pub const V128_LOAD16_LANE: Opcode = Opcode::Vector(0x55);
pub const V128_LOAD32_LANE: Opcode = Opcode::Vector(0x56);
pub const V128_LOAD64_LANE: Opcode = Opcode::Vector(0x57);
pub const V128_STORE8_LANE: Opcode = Opcode::Vector(0x58);
pub const V128_STORE16_LANE: Opcode = Opcode::Vector(0x59);
pub const V128_STORE32_LANE: Opcode = Opcode::Vector(0x5A);
pub const V128_STORE64_LANE: Opcode = Opcode::Vector(0x5B);
pub const V128_LOAD32_ZERO: Opcode = Opcode::Vector(0x5C);
pub const V128_LOAD64_ZERO: Opcode = Opcode::Vector(0x5D);

pub const F32X4_DEMOTE_F64X2_ZERO: Opcode = Opcode::Vector(0x5E);
pub const F64X2_PROMOTE_LOW_F32X4: Opcode = Opcode::Vector(0x5F);

pub const I8X16_ABS: Opcode = Opcode::Vector(0x60);
pub const I8X16_NEG: Opcode = Opcode::Vector(0x61);
pub const I8X16_POPCNT: Opcode = Opcode::Vector(0x62);
pub const I8X16_ALL_TRUE: Opcode = Opcode::Vector(0x63);
pub const I8X16_BITMASK: Opcode = Opcode::Vector(0x64);
pub const I8X16_NARROW_I16X8_S: Opcode = Opcode::Vector(0x65);
pub const I8X16_NARROW_I16X8_U: Opcode = Opcode::Vector(0x66);
pub const F32X4_CEIL: Opcode = Opcode::Vector(0x67);
pub const F32X4_FLOOR: Opcode = Opcode::Vector(0x68);
pub const F32X4_TRUNC: Opcode = Opcode::Vector(0x69);
pub const F32X4_NEAREST: Opcode = Opcode::Vector(0x6A);
pub const I8X16_SHL: Opcode = Opcode::Vector(0x6B);
pub const I8X16_SHR_S: Opcode = Opcode::Vector(0x6C);
pub const I8X16_SHR_U: Opcode = Opcode::Vector(0x6D);
pub const I8X16_ADD: Opcode = Opcode::Vector(0x6E);
pub const I8X16_ADD_SAT_S: Opcode = Opcode::Vector(0x6F);
pub const I8X16_ADD_SAT_U: Opcode = Opcode::Vector(0x70);
pub const I8X16_SUB: Opcode = Opcode::Vector(0x71);
pub const I8X16_SUB_SAT_S: Opcode = Opcode::Vector(0x72);
pub const I8X16_SUB_SAT_U: Opcode = Opcode::Vector(0x73);
pub const F64X2_CEIL: Opcode = Opcode::Vector(0x74);
pub const F64X2_FLOOR: Opcode = Opcode::Vector(0x75);
pub const I8X16_MIN_S: Opcode = Opcode::Vector(0x76);
pub const I8X16_MIN_U: Opcode = Opcode::Vector(0x77);
pub const I8X16_MAX_S: Opcode = Opcode::Vector(0x78);
pub const I8X16_MAX_U: Opcode = Opcode::Vector(0x79);
pub const F64X2_TRUNC: Opcode = Opcode::Vector(0x7A);
pub const I8X16_AVGR_U: Opcode = Opcode::Vector(0x7B);
pub const I16X8_EXTADD_PAIRWISE_I8X16_S: Opcode = Opcode::Vector(0x7C);
pub const I16X8_EXTADD_PAIRWISE_I8X16_U: Opcode = Opcode::Vector(0x7D);
pub const I32X4_EXTADD_PAIRWISE_I16X8_S: Opcode = Opcode::Vector(0x7E);
pub const I32X4_EXTADD_PAIRWISE_I16X8_U: Opcode = Opcode::Vector(0x7F);

pub const I16X8_ABS: Opcode = Opcode::Vector(0x80);
pub const I16X8_NEG: Opcode = Opcode::Vector(0x81);
pub const I16X8_Q15MULR_SAT_S: Opcode = Opcode::Vector(0x82);
pub const I16X8_ALL_TRUE: Opcode = Opcode::Vector(0x83);
pub const I16X8_BITMASK: Opcode = Opcode::Vector(0x84);
pub const I16X8_NARROW_I32X4_S: Opcode = Opcode::Vector(0x85);
pub const I16X8_NARROW_I32X4_U: Opcode = Opcode::Vector(0x86);
pub const I16X8_EXTEND_LOW_I8X16_S: Opcode = Opcode::Vector(0x87);
pub const I16X8_EXTEND_HIGH_I8X16_S: Opcode = Opcode::Vector(0x88);
pub const I16X8_EXTEND_LOW_I8X16_U: Opcode = Opcode::Vector(0x89);
pub const I16X8_EXTEND_HIGH_I8X16_U: Opcode = Opcode::Vector(0x8A);
pub const I16X8_SHL: Opcode = Opcode::Vector(0x8B);
pub const I16X8_SHR_S: Opcode = Opcode::Vector(0x8C);
pub const I16X8_SHR_U: Opcode = Opcode::Vector(0x8D);
pub const I16X8_ADD: Opcode = Opcode::Vector(0x8E);
pub const I16X8_ADD_SAT_S: Opcode = Opcode::Vector(0x8F);
pub const I16X8_ADD_SAT_U: Opcode = Opcode::Vector(0x90);
pub const I16X8_SUB: Opcode = Opcode::Vector(0x91);
pub const I16X8_SUB_SAT_S: Opcode = Opcode::Vector(0x92);
pub const I16X8_SUB_SAT_U: Opcode = Opcode::Vector(0x93);
pub const F64X2_NEAREST: Opcode = Opcode::Vector(0x94);
pub const I16X8_MUL: Opcode = Opcode::Vector(0x95);
pub const I16X8_MIN_S: Opcode = Opcode::Vector(0x96);
pub const I16X8_MIN_U: Opcode = Opcode::Vector(0x97);
pub const I16X8_MAX_S: Opcode = Opcode::Vector(0x98);
pub const I16X8_MAX_U: Opcode = Opcode::Vector(0x99);
pub const I16X8_AVGR_U: Opcode = Opcode::Vector(0x9B);
pub const I16X8_EXTMUL_LOW_I8X16_S: Opcode = Opcode::Vector(0x9C);
pub const I16X8_EXTMUL_HIGH_I8X16_S: Opcode = Opcode::Vector(0x9D);
pub const I16X8_EXTMUL_LOW_I8X16_U: Opcode = Opcode::Vector(0x9E);
pub const I16X8_EXTMUL_HIGH_I8X16_U: Opcode = Opcode::Vector(0x9F);

pub const I32X4_ABS: Opcode = Opcode::Vector(0xA0);
pub const I32X4_NEG: Opcode = Opcode::Vector(0xA1);
pub const I32X4_ALL_TRUE: Opcode = Opcode::Vector(0xA3);
pub const I32X4_BITMASK: Opcode = Opcode::Vector(0xA4);
pub const I32X4_EXTEND_LOW_I16X8_S: Opcode = Opcode::Vector(0xA7);
pub const I32X4_EXTEND_HIGH_I16X8_S: Opcode = Opcode::Vector(0xA8);
pub const I32X4_EXTEND_LOW_I16X8_U: Opcode = Opcode::Vector(0xA9);
pub const I32X4_EXTEND_HIGH_I16X8_U: Opcode = Opcode::Vector(0xAA);
pub const I32X4_SHL: Opcode = Opcode::Vector(0xAB);
pub const I32X4_SHR_S: Opcode = Opcode::Vector(0xAC);
pub const I32X4_SHR_U: Opcode = Opcode::Vector(0xAD);
pub const I32X4_ADD: Opcode = Opcode::Vector(0xAE);
pub const I32X4_SUB: Opcode = Opcode::Vector(0xB1);
pub const I32X4_MUL: Opcode = Opcode::Vector(0xB5);
pub const I32X4_MIN_S: Opcode = Opcode::Vector(0xB6);
pub const I32X4_MIN_U: Opcode = Opcode::Vector(0xB7);
pub const I32X4_MAX_S: Opcode = Opcode::Vector(0xB8);
pub const I32X4_MAX_U: Opcode = Opcode::Vector(0xB9);
pub const I32X4_DOT_I16X8_S: Opcode = Opcode::Vector(0xBA);
pub const I32X4_EXTMUL_LOW_I16X8_S: Opcode = Opcode::Vector(0xBC);
pub const I32X4_EXTMUL_HIGH_I16X8_S: Opcode = Opcode::Vector(0xBD);
pub const I32X4_EXTMUL_LOW_I16X8_U: Opcode = Opcode::Vector(0xBE);
pub const I32X4_EXTMUL_HIGH_I16X8_U: Opcode = Opcode::Vector(0xBF);

pub const I64X2_ABS: Opcode = Opcode::Vector(0xC0);
pub const I64X2_NEG: Opcode = Opcode::Vector(0xC1);
pub const I64X2_ALL_TRUE: Opcode = Opcode::Vector(0xC3);
pub const I64X2_BITMASK: Opcode = Opcode::Vector(0xC4);
pub const I64X2_EXTEND_LOW_I32X4_S: Opcode = Opcode::Vector(0xC7);
pub const I64X2_EXTEND_HIGH_I32X4_S: Opcode = Opcode::Vector(0xC8);
pub const I64X2_EXTEND_LOW_I32X4_U: Opcode = Opcode::Vector(0xC9);
pub const I64X2_EXTEND_HIGH_I32X4_U: Opcode = Opcode::Vector(0xCA);
pub const I64X2_SHL: Opcode = Opcode::Vector(0xCB);
pub const I64X2_SHR_S: Opcode = Opcode::Vector(0xCC);
pub const I64X2_SHR_U: Opcode = Opcode::Vector(0xCD);
pub const I64X2_ADD: Opcode = Opcode::Vector(0xCE);
pub const I64X2_SUB: Opcode = Opcode::Vector(0xD1);
pub const I64X2_MUL: Opcode = Opcode::Vector(0xD5);
pub const I64X2_EQ: Opcode = Opcode::Vector(0xD6);
pub const I64X2_NE: Opcode = Opcode::Vector(0xD7);
pub const I64X2_LT_S: Opcode = Opcode::Vector(0xD8);
pub const I64X2_GT_S: Opcode = Opcode::Vector(0xD9);
pub const I64X2_LE_S: Opcode = Opcode::Vector(0xDA);
pub const I64X2_GE_S: Opcode = Opcode::Vector(0xDB);
pub const I64X2_EXTMUL_LOW_I32X4_S: Opcode = Opcode::Vector(0xDC);
pub const I64X2_EXTMUL_HIGH_I32X4_S: Opcode = Opcode::Vector(0xDD);
pub const I64X2_EXTMUL_LOW_I32X4_U: Opcode = Opcode::Vector(0xDE);
pub const I64X2_EXTMUL_HIGH_I32X4_U: Opcode = Opcode::Vector(0xDF);

pub const F32X4_ABS: Opcode = Opcode::Vector(0xE0);
pub const F32X4_NEG: Opcode = Opcode::Vector(0xE1);
pub const F32X4_SQRT: Opcode = Opcode::Vector(0xE3);
pub const F32X4_ADD: Opcode = Opcode::Vector(0xE4);
pub const F32X4_SUB: Opcode = Opcode::Vector(0xE5);
pub const F32X4_MUL: Opcode = Opcode::Vector(0xE6);
pub const F32X4_DIV: Opcode = Opcode::Vector(0xE7);
pub const F32X4_MIN: Opcode = Opcode::Vector(0xE8);
pub const F32X4_MAX: Opcode = Opcode::Vector(0xE9);
pub const F32X4_PMIN: Opcode = Opcode::Vector(0xEA);
pub const F32X4_PMAX: Opcode = Opcode::Vector(0xEB);
pub const F64X2_ABS: Opcode = Opcode::Vector(0xEC);
pub const F64X2_NEG: Opcode = Opcode::Vector(0xED);
pub const F64X2_SQRT: Opcode = Opcode::Vector(0xEF);
pub const F64X2_ADD: Opcode = Opcode::Vector(0xF0);
pub const F64X2_SUB: Opcode = Opcode::Vector(0xF1);
pub const F64X2_MUL: Opcode = Opcode::Vector(0xF2);
pub const F64X2_DIV: Opcode = Opcode::Vector(0xF3);
pub const F64X2_MIN: Opcode = Opcode::Vector(0xF4);
pub const F64X2_MAX: Opcode = Opcode::Vector(0xF5);
pub const F64X2_PMIN: Opcode = Opcode::Vector(0xF6);
pub const F64X2_PMAX: Opcode = Opcode::Vector(0xF7);

pub const I32X4_TRUNC_SAT_F32X4_S: Opcode = Opcode::Vector(0xF8);
pub const I32X4_TRUNC_SAT_F32X4_U: Opcode = Opcode::Vector(0xF9);
pub const F32X4_CONVERT_I32X4_S: Opcode = Opcode::Vector(0xFA);
pub const F32X4_CONVERT_I32X4_U: Opcode = Opcode::Vector(0xFB);
pub const I32X4_TRUNC_SAT_F64X2_S_ZERO: Opcode = Opcode::Vector(0xFC);
pub const I32X4_TRUNC_SAT_F64X2_U_ZERO: Opcode = Opcode::Vector(0xFD);
pub const F64X2_CONVERT_LOW_I32X4_S: Opcode = Opcode::Vector(0xFE);
pub const F64X2_CONVERT_LOW_I32X4_U: Opcode = Opcode::Vector(0xFF);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(I32_ADD.to_string(), "i32.add");
        assert_eq!(TABLE_COPY.to_string(), "table.copy");
        assert_eq!(I8X16_SHUFFLE.to_string(), "i8x16.shuffle");
        assert_eq!(Opcode::Plain(0x06).to_string(), "0x06");
        assert_eq!(Opcode::Misc(99).to_string(), "0xfc 99");
    }

    #[test]
    fn test_prefix() {
        assert_eq!(NOP.prefix(), None);
        assert_eq!(MEMORY_FILL.prefix(), Some(0xFC));
        assert_eq!(V128_CONST.prefix(), Some(0xFD));
    }
}
