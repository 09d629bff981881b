//! Binary encoding primitives for module values.
//!
//! Provides LEB128 integer encoding, IEEE 754 float encoding, names, byte
//! vectors and length-prefixed sub-writes as laid out by the binary format.
//!
//! All functions write directly into a caller-provided `&mut Vec<u8>` buffer,
//! avoiding intermediate allocations. Integers are always written in their
//! minimal LEB128 form.

use byteorder::{ByteOrder, LittleEndian};

// ---------------------------------------------------------------------------
// Binary format constants
// ---------------------------------------------------------------------------

pub const MAGIC: u32 = 0x6d73_6100; // "\0asm", little-endian
pub const VERSION: u32 = 1;

// Section IDs
pub const SECTION_CUSTOM: u8 = 0;
pub const SECTION_TYPE: u8 = 1;
pub const SECTION_IMPORT: u8 = 2;
pub const SECTION_FUNCTION: u8 = 3;
pub const SECTION_TABLE: u8 = 4;
pub const SECTION_MEMORY: u8 = 5;
pub const SECTION_GLOBAL: u8 = 6;
pub const SECTION_EXPORT: u8 = 7;
pub const SECTION_START: u8 = 8;
pub const SECTION_ELEMENT: u8 = 9;
pub const SECTION_CODE: u8 = 10;
pub const SECTION_DATA: u8 = 11;
pub const SECTION_DATA_COUNT: u8 = 12;

/// Position of a non-custom section in the required order. Data count sits
/// between the element and code sections even though its id is larger.
pub fn section_rank(id: u8) -> Option<u8> {
    match id {
        SECTION_TYPE..=SECTION_ELEMENT => Some(id),
        SECTION_DATA_COUNT => Some(10),
        SECTION_CODE => Some(11),
        SECTION_DATA => Some(12),
        _ => None,
    }
}

pub fn section_name(id: u8) -> &'static str {
    match id {
        SECTION_CUSTOM => "custom",
        SECTION_TYPE => "type",
        SECTION_IMPORT => "import",
        SECTION_FUNCTION => "function",
        SECTION_TABLE => "table",
        SECTION_MEMORY => "memory",
        SECTION_GLOBAL => "global",
        SECTION_EXPORT => "export",
        SECTION_START => "start",
        SECTION_ELEMENT => "element",
        SECTION_CODE => "code",
        SECTION_DATA => "data",
        SECTION_DATA_COUNT => "data count",
        _ => "unknown",
    }
}

// Type constructors
pub const TYPE_FUNC: u8 = 0x60;

// Import/export descriptor kinds
pub const DESC_FUNC: u8 = 0x00;
pub const DESC_TABLE: u8 = 0x01;
pub const DESC_MEMORY: u8 = 0x02;
pub const DESC_GLOBAL: u8 = 0x03;

// Limits flags
pub const LIMITS_MIN: u8 = 0x00;
pub const LIMITS_MIN_MAX: u8 = 0x01;

// Element segment elemkind
pub const ELEMKIND_FUNCREF: u8 = 0x00;

// Element segment flags
// 3-bit encoding: bit 0 = non-active mode, bit 1 = explicit table, bit 2 = expressions
pub const ELEM_ACTIVE_FUNCS: u32 = 0; // active, table 0, func indices
pub const ELEM_PASSIVE_FUNCS: u32 = 1; // passive, elemkind, func indices
pub const ELEM_ACTIVE_TABLE_FUNCS: u32 = 2; // active, explicit table, elemkind, func indices
pub const ELEM_DECLARATIVE_FUNCS: u32 = 3; // declarative, elemkind, func indices
pub const ELEM_ACTIVE_EXPRS: u32 = 4; // active, table 0, expressions
pub const ELEM_PASSIVE_EXPRS: u32 = 5; // passive, reftype, expressions
pub const ELEM_ACTIVE_TABLE_EXPRS: u32 = 6; // active, explicit table, reftype, expressions
pub const ELEM_DECLARATIVE_EXPRS: u32 = 7; // declarative, reftype, expressions

// Data segment flags
pub const DATA_ACTIVE: u32 = 0;
pub const DATA_PASSIVE: u32 = 1;
pub const DATA_ACTIVE_EXPLICIT: u32 = 2;

// Expression terminator
pub const OP_END: u8 = 0x0B;

// Block type: empty
pub const BLOCK_TYPE_EMPTY: u8 = 0x40;

// ---------------------------------------------------------------------------
// Unsigned LEB128
// ---------------------------------------------------------------------------

/// Appends the unsigned LEB128 encoding of a u64 value to `buf`.
fn write_vu(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            break;
        }
        byte |= 0x80;
        buf.push(byte);
    }
}

/// Appends the unsigned LEB128 encoding of a u32 value to `buf`.
pub fn write_vu32(buf: &mut Vec<u8>, v: u32) {
    write_vu(buf, v as u64);
}

/// Appends the unsigned LEB128 encoding of a u64 value to `buf`.
pub fn write_vu64(buf: &mut Vec<u8>, v: u64) {
    write_vu(buf, v);
}

/// Number of bytes the minimal unsigned LEB128 encoding of `value` takes.
pub fn vu_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    std::cmp::max(1, (bits + 6) / 7)
}

// ---------------------------------------------------------------------------
// Signed LEB128
// ---------------------------------------------------------------------------

/// Appends the signed LEB128 encoding of an i64 value to `buf`.
fn write_vs(buf: &mut Vec<u8>, mut value: i64) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if (value == 0 && (byte & 0x40) == 0) || (value == -1 && (byte & 0x40) != 0) {
            buf.push(byte);
            break;
        }
        byte |= 0x80;
        buf.push(byte);
    }
}

/// Appends the signed LEB128 encoding of an i32 value to `buf`.
pub fn write_vs32(buf: &mut Vec<u8>, v: i32) {
    write_vs(buf, v as i64);
}

/// Appends a signed 33-bit value, used for type-index block types.
pub fn write_vs33(buf: &mut Vec<u8>, v: i64) {
    write_vs(buf, v);
}

/// Appends the signed LEB128 encoding of an i64 value to `buf`.
pub fn write_vs64(buf: &mut Vec<u8>, v: i64) {
    write_vs(buf, v);
}

// ---------------------------------------------------------------------------
// IEEE 754 floats (little-endian)
// ---------------------------------------------------------------------------

/// Appends the little-endian IEEE 754 encoding of an f32 value to `buf`.
pub fn write_f32(buf: &mut Vec<u8>, v: f32) {
    let mut bytes = [0u8; 4];
    LittleEndian::write_f32(&mut bytes, v);
    buf.extend_from_slice(&bytes);
}

/// Appends the little-endian IEEE 754 encoding of an f64 value to `buf`.
pub fn write_f64(buf: &mut Vec<u8>, v: f64) {
    let mut bytes = [0u8; 8];
    LittleEndian::write_f64(&mut bytes, v);
    buf.extend_from_slice(&bytes);
}

pub fn write_u32(buf: &mut Vec<u8>, v: u32) {
    let mut bytes = [0u8; 4];
    LittleEndian::write_u32(&mut bytes, v);
    buf.extend_from_slice(&bytes);
}

// ---------------------------------------------------------------------------
// v128 (16-byte SIMD vector, raw bytes)
// ---------------------------------------------------------------------------

/// Appends 16 raw bytes to `buf`.
pub fn write_v128(buf: &mut Vec<u8>, v: [u8; 16]) {
    buf.extend_from_slice(&v);
}

// ---------------------------------------------------------------------------
// Length-prefixed data
// ---------------------------------------------------------------------------

/// Appends a length-prefixed byte vector (vu32 length + raw bytes) to `buf`.
pub fn write_u8vec(buf: &mut Vec<u8>, v: &[u8]) {
    write_vu32(buf, v.len() as u32);
    buf.extend_from_slice(v);
}

/// Appends a length-prefixed UTF-8 name.
pub fn write_name(buf: &mut Vec<u8>, name: &str) {
    write_u8vec(buf, name.as_bytes());
}

/// Appends `contents` preceded by its byte length.
pub fn write_prefixed(buf: &mut Vec<u8>, contents: &[u8]) {
    write_u8vec(buf, contents);
}

/// Appends a framed section: id byte, byte length, then the contents.
pub fn write_section(buf: &mut Vec<u8>, id: u8, contents: &[u8]) {
    buf.reserve(1 + vu_len(contents.len() as u64) + contents.len());
    buf.push(id);
    write_prefixed(buf, contents);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;
    use crate::parser::reader::Reader;
    use rstest::rstest;

    fn encoded<F: FnOnce(&mut Vec<u8>)>(write: F) -> String {
        let mut buf = Vec::new();
        write(&mut buf);
        hex::encode(buf)
    }

    #[rstest]
    #[case(0, "00")]
    #[case(1, "01")]
    #[case(127, "7f")]
    #[case(16_256, "807f")]
    #[case(0x3b4, "b407")]
    #[case(0x8000_0000, "8080808008")]
    #[case(u64::MAX, "ffffffffffffffffff01")]
    fn test_write_unsigned(#[case] value: u64, #[case] expected: &str) {
        assert_eq!(encoded(|b| write_vu64(b, value)), expected);
        assert_eq!(vu_len(value) * 2, expected.len());
        if let Ok(narrow) = u32::try_from(value) {
            assert_eq!(encoded(|b| write_vu32(b, narrow)), expected);
        }
    }

    #[rstest]
    #[case(0, "00")]
    #[case(-1, "7f")]
    #[case(63, "3f")]
    #[case(64, "c000")]
    #[case(-64, "40")]
    #[case(-65, "bf7f")]
    #[case(-624_485, "9bf159")]
    #[case(i32::MIN as i64, "8080808078")]
    #[case(i64::MAX, "ffffffffffffffffff00")]
    fn test_write_signed(#[case] value: i64, #[case] expected: &str) {
        assert_eq!(encoded(|b| write_vs64(b, value)), expected);
        if let Ok(narrow) = i32::try_from(value) {
            assert_eq!(encoded(|b| write_vs32(b, narrow)), expected);
        }
    }

    #[test]
    fn test_write_vs33() {
        let mut buf = Vec::new();
        write_vs33(&mut buf, u32::MAX as i64);
        assert_eq!(buf, vec![0xff, 0xff, 0xff, 0xff, 0x0f]);
        assert_eq!(Reader::new(&buf).read_vs33().unwrap(), u32::MAX as i64);
    }

    #[test]
    fn test_writes_append() {
        let mut buf = vec![0xaa];
        write_vu32(&mut buf, 624_485);
        write_vs32(&mut buf, -1);
        write_v128(&mut buf, [7; 16]);
        assert_eq!(&buf[..5], &[0xaa, 0xe5, 0x8e, 0x26, 0x7f]);
        assert_eq!(buf.len(), 21);
    }

    #[test]
    fn test_floats() {
        assert_eq!(encoded(|b| write_f32(b, 6.283_185_5)), "db0fc940");
        assert_eq!(encoded(|b| write_f64(b, std::f64::consts::TAU)), "182d4454fb211940");

        let nan = f32::from_bits(0x7fa0_0001);
        let mut buf = Vec::new();
        write_f32(&mut buf, nan);
        assert_eq!(Reader::new(&buf).read_f32().unwrap().to_bits(), 0x7fa0_0001);
    }

    #[test]
    fn test_header() {
        let mut buf = Vec::new();
        write_u32(&mut buf, MAGIC);
        write_u32(&mut buf, VERSION);
        assert_eq!(buf, b"\0asm\x01\0\0\0".to_vec());
    }

    #[test]
    fn test_names_and_vectors() {
        assert_eq!(encoded(|b| write_name(b, "é")), "02c3a9");
        assert_eq!(encoded(|b| write_u8vec(b, &[0xde, 0xad])), "02dead");
        assert_eq!(encoded(|b| write_prefixed(b, &[])), "00");
    }

    #[test]
    fn test_write_section() {
        assert_eq!(encoded(|b| write_section(b, SECTION_START, &[0x03])), "080103");

        let mut buf = Vec::new();
        write_section(&mut buf, SECTION_CUSTOM, &[0u8; 200]);
        assert_eq!(&buf[..3], &[0, 0xc8, 0x01]);
        assert_eq!(buf.len(), 203);
    }

    #[test]
    fn test_section_rank() {
        assert!(section_rank(SECTION_ELEMENT) < section_rank(SECTION_DATA_COUNT));
        assert!(section_rank(SECTION_DATA_COUNT) < section_rank(SECTION_CODE));
        assert!(section_rank(SECTION_CODE) < section_rank(SECTION_DATA));
        assert_eq!(section_rank(SECTION_CUSTOM), None);
        assert_eq!(section_rank(13), None);
        assert_eq!(section_name(SECTION_DATA_COUNT), "data count");
    }
}
