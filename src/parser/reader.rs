//! Byte cursor over a module's bytes.
//!
//! A `Reader` borrows the whole input and tracks an absolute position plus an
//! end bound, so every offset it reports is an offset into the original
//! module. Sections and function bodies are read through bounded sub-readers
//! created with [`Reader::sub_reader`].

use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};

#[derive(Debug, Clone, Copy)]
struct Bound {
    section: u8,
    start: usize,
}

#[derive(Debug, Clone)]
pub struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    end: usize,
    bound: Option<Bound>,
    strict_leb128: bool,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Reader<'a> {
        Reader {
            bytes,
            pos: 0,
            end: bytes.len(),
            bound: None,
            strict_leb128: false,
        }
    }

    /// Rejects non-minimal LEB128 integers when `strict` is set.
    pub fn with_strict_leb128(mut self, strict: bool) -> Reader<'a> {
        self.strict_leb128 = strict;
        self
    }
}

impl<'a> Reader<'a> {
    // Basic operations --------------------------------------------------------
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.end - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.end
    }

    pub fn has_at_least(&self, count: usize) -> bool {
        self.remaining() >= count
    }

    /// Splits off the next `len` bytes as a reader bounded to them, and
    /// advances past them.
    pub fn sub_reader(&mut self, len: usize, section: u8) -> Result<Reader<'a>> {
        if len > self.remaining() {
            return Err(Error::SectionLengthMismatch {
                section,
                offset: self.pos,
                declared: len,
                consumed: self.remaining(),
            });
        }
        let sub = Reader {
            bytes: self.bytes,
            pos: self.pos,
            end: self.pos + len,
            bound: Some(Bound {
                section,
                start: self.pos,
            }),
            strict_leb128: self.strict_leb128,
        };
        self.pos += len;
        Ok(sub)
    }

    /// Fails unless a bounded reader has consumed exactly its declared length.
    pub fn expect_empty(&self) -> Result<()> {
        if self.pos == self.end {
            return Ok(());
        }
        match self.bound {
            Some(bound) => Err(Error::SectionLengthMismatch {
                section: bound.section,
                offset: bound.start,
                declared: self.end - bound.start,
                consumed: self.pos - bound.start,
            }),
            None => Err(Error::malformed(self.pos, "unexpected trailing bytes")),
        }
    }

    /// The error for a read of `needed` bytes that does not fit.
    ///
    /// Running into a section bound while the input carries on means the
    /// declared length was wrong; running out of input is a malformed module.
    fn overrun(&self, needed: usize) -> Error {
        match self.bound {
            Some(bound) if self.end < self.bytes.len() => Error::SectionLengthMismatch {
                section: bound.section,
                offset: bound.start,
                declared: self.end - bound.start,
                consumed: self.pos + needed - bound.start,
            },
            _ => Error::malformed(self.pos, "unexpected end"),
        }
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        if self.pos >= self.end {
            return Err(self.overrun(1));
        }
        let byte = self.bytes[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    pub fn peek_byte(&self) -> Option<u8> {
        if self.pos < self.end {
            Some(self.bytes[self.pos])
        } else {
            None
        }
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(self.overrun(len));
        }
        let bytes = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    // Read and interpret types ------------------------------------------------

    // le
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.read_bytes(4)?))
    }

    pub fn read_vu32(&mut self) -> Result<u32> {
        self.read_unsigned(32).map(|v| v as u32)
    }

    pub fn read_vu64(&mut self) -> Result<u64> {
        self.read_unsigned(64)
    }

    pub fn read_vs32(&mut self) -> Result<i32> {
        self.read_signed(32).map(|v| v as i32)
    }

    /// Signed 33-bit integer, the encoding of type-index block types.
    pub fn read_vs33(&mut self) -> Result<i64> {
        self.read_signed(33)
    }

    pub fn read_vs64(&mut self) -> Result<i64> {
        self.read_signed(64)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(LittleEndian::read_f32(self.read_bytes(4)?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(LittleEndian::read_f64(self.read_bytes(8)?))
    }

    pub fn read_v128(&mut self) -> Result<[u8; 16]> {
        let mut buf = [0u8; 16];
        buf.copy_from_slice(self.read_bytes(16)?);
        Ok(buf)
    }

    /// A length-prefixed UTF-8 name.
    pub fn read_name(&mut self) -> Result<&'a str> {
        let start = self.pos;
        let bytes = self.read_u8vec()?;
        std::str::from_utf8(bytes).map_err(|_| Error::malformed(start, "malformed UTF-8 encoding"))
    }

    /// A length-prefixed byte vector.
    pub fn read_u8vec(&mut self) -> Result<&'a [u8]> {
        let len = self.read_vu32()?;
        self.read_bytes(len as usize)
    }

    /// Reads a vector count and checks it against `limit`.
    pub fn read_count(&mut self, limit: u32, what: &'static str) -> Result<u32> {
        let offset = self.pos;
        let count = self.read_vu32()?;
        if count > limit {
            return Err(Error::LimitExceeded {
                what,
                limit: limit as u64,
                offset,
            });
        }
        Ok(count)
    }

    /// Reads a count prefix then exactly that many elements with `element`.
    pub fn read_vec<T, F>(&mut self, limit: u32, what: &'static str, mut element: F) -> Result<Vec<T>>
    where
        F: FnMut(&mut Reader<'a>) -> Result<T>,
    {
        let count = self.read_count(limit, what)? as usize;
        // every element takes at least one byte
        let mut vec = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            vec.push(element(self)?);
        }
        Ok(vec)
    }

    // LEB128 ------------------------------------------------------------------

    fn leb_byte(&mut self, first: bool) -> Result<u8> {
        match self.read_byte() {
            Ok(byte) => Ok(byte),
            Err(err) if first => Err(err),
            Err(_) => Err(Error::malformed(self.pos, "unexpected end of LEB128 integer")),
        }
    }

    fn read_unsigned(&mut self, bits: u32) -> Result<u64> {
        let start = self.pos;
        let last_shift = (bits - 1) / 7 * 7;
        let mut result: u64 = 0;
        let mut shift = 0;
        loop {
            let byte = self.leb_byte(shift == 0)?;
            if shift == last_shift {
                if byte & 0x80 != 0 {
                    return Err(Error::malformed(start, "integer representation too long"));
                }
                if (byte as u64) >> (bits - shift) != 0 {
                    return Err(Error::malformed(start, "integer too large"));
                }
            }
            result |= ((byte & 0x7f) as u64) << shift;
            if byte & 0x80 == 0 {
                if self.strict_leb128 && byte == 0 && shift > 0 {
                    return Err(Error::malformed(start, "non-canonical LEB128 integer"));
                }
                return Ok(result);
            }
            shift += 7;
        }
    }

    fn read_signed(&mut self, bits: u32) -> Result<i64> {
        let start = self.pos;
        let last_shift = (bits - 1) / 7 * 7;
        let mut result: i64 = 0;
        let mut shift = 0;
        let mut prev: u8 = 0;
        loop {
            let byte = self.leb_byte(shift == 0)?;
            if shift == last_shift {
                if byte & 0x80 != 0 {
                    return Err(Error::malformed(start, "integer representation too long"));
                }
                // the unused high bits must be copies of the sign bit
                let mask = 0x7f & (0xffu8 << (bits - shift - 1));
                let top = byte & mask;
                if top != 0 && top != mask {
                    return Err(Error::malformed(start, "integer too large"));
                }
            }
            result |= ((byte & 0x7f) as i64) << shift;
            shift += 7;
            if byte & 0x80 == 0 {
                if shift < 64 && byte & 0x40 != 0 {
                    result |= -1i64 << shift;
                }
                if self.strict_leb128
                    && shift > 7
                    && ((byte == 0x00 && prev & 0x40 == 0) || (byte == 0x7f && prev & 0x40 != 0))
                {
                    return Err(Error::malformed(start, "non-canonical LEB128 integer"));
                }
                return Ok(result);
            }
            prev = byte;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_read_u32() {
        let read = |v: Vec<u8>| -> u32 { Reader::new(&v).read_u32().expect("Failed to read u32") };

        assert_eq!(read(vec![0b00000000, 0b00000000, 0b00000000, 0b00000000]), 0);
        assert_eq!(read(vec![0b00000001, 0b00000000, 0b00000000, 0b00000000]), 1);
        assert_eq!(read(vec![0b00000000, 0b00000001, 0b00000000, 0b00000000]), 256);
        assert_eq!(read(vec![0b10000000, 0b10000000, 0b10000000, 0b10000000]), 2155905152);
        assert_eq!(read(vec![0b11111111, 0b11111111, 0b11111111, 0b11111111]), 4294967295);
        assert_eq!(read(vec![0x00, 0x61, 0x73, 0x6d]), 0x6d736100);
    }

    #[test]
    fn test_read_vu64() {
        let read = |v: Vec<u8>| Reader::new(&v).read_vu64().expect("Failed to read vu64");

        assert_eq!(read(vec![0]), 0);
        assert_eq!(read(vec![1]), 1);
        assert_eq!(read(vec![0b11100101, 0b10001110, 0b00100110]), 624485);
        assert_eq!(read(vec![0x7f]), 127);
        assert_eq!(read(vec![0x80, 0x7f]), 16256);
        assert_eq!(read(vec![0xb4, 0x07]), 0x3b4);
        assert_eq!(read(vec![0x8c, 0x08]), 0x40c);
        assert_eq!(read(vec![0xff, 0xff, 0xff, 0xff, 0xf]), 0xffffffff);
        assert_eq!(read(vec![128, 128, 128, 128, 8]), 0x80000000);
        assert_eq!(
            read(vec![0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]),
            u64::MAX
        );
    }

    #[test]
    fn test_read_vu32() {
        let read = |v: Vec<u8>| Reader::new(&v).read_vu32();

        assert_eq!(read(vec![0xff, 0xff, 0xff, 0xff, 0x0f]).unwrap(), u32::MAX);
        // non-minimal but within five bytes
        assert_eq!(read(vec![0x83, 0x80, 0x80, 0x80, 0x00]).unwrap(), 3);
        assert_eq!(read(vec![0x80, 0x00]).unwrap(), 0);

        let err = read(vec![0xff, 0xff, 0xff, 0xff, 0x1f]).unwrap_err();
        assert_eq!(err, Error::malformed(0, "integer too large"));
        let err = read(vec![0x80, 0x80, 0x80, 0x80, 0x80, 0x00]).unwrap_err();
        assert_eq!(err, Error::malformed(0, "integer representation too long"));
        let err = read(vec![0x80, 0x80]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedEncoding);
    }

    #[test]
    fn test_read_vs64() {
        let read = |v: Vec<u8>| Reader::new(&v).read_vs64().expect("Failed to read vs64");

        assert_eq!(read(vec![0]), 0);
        assert_eq!(read(vec![1]), 1);
        assert_eq!(read(vec![0b11100101, 0b10001110, 0b00100110]), 624485);
        assert_eq!(read(vec![0xb4, 0x07]), 0x3b4);
        assert_eq!(read(vec![0x8c, 0x08]), 0x40c);
        assert_eq!(read(vec![0x7f]), -1);
        assert_eq!(read(vec![0x80, 0x7f]), -128);
        assert_eq!(read(vec![0b10011011, 0b11110001, 0b01011001]), -624485);
        assert_eq!(read(vec![128, 128, 128, 128, 128, 128, 128, 252, 255, 0]), 0x7ff8000000000000);
        assert_eq!(
            read(vec![128, 128, 128, 128, 128, 128, 128, 128, 128, 127]),
            (0x8000000000000000u64 as i64)
        );
    }

    #[test]
    fn test_read_vs32() {
        let read = |v: Vec<u8>| Reader::new(&v).read_vs32();

        assert_eq!(read(vec![0x7f]).unwrap(), -1);
        assert_eq!(read(vec![128, 128, 128, 128, 120]).unwrap(), i32::MIN);
        assert_eq!(read(vec![0xff, 0xff, 0xff, 0xff, 0x07]).unwrap(), i32::MAX);
        // non-minimal -1
        assert_eq!(read(vec![0xff, 0x7f]).unwrap(), -1);

        // unused bits are not a sign extension
        let err = read(vec![0xff, 0xff, 0xff, 0xff, 0x4f]).unwrap_err();
        assert_eq!(err, Error::malformed(0, "integer too large"));
        let err = read(vec![0x80, 0x80, 0x80, 0x80, 0x10]).unwrap_err();
        assert_eq!(err, Error::malformed(0, "integer too large"));
    }

    #[test]
    fn test_read_vs33() {
        let read = |v: Vec<u8>| Reader::new(&v).read_vs33().unwrap();

        assert_eq!(read(vec![0x40]), -64);
        assert_eq!(read(vec![0x05]), 5);
        assert_eq!(read(vec![0xff, 0xff, 0xff, 0xff, 0x0f]), u32::MAX as i64);
    }

    #[test]
    fn test_strict_leb128() {
        let strict = |v: Vec<u8>| Reader::new(&v).with_strict_leb128(true).read_vu32();
        assert_eq!(strict(vec![0x03]).unwrap(), 3);
        assert_eq!(strict(vec![0x80, 0x01]).unwrap(), 128);
        assert_eq!(
            strict(vec![0x83, 0x00]).unwrap_err(),
            Error::malformed(0, "non-canonical LEB128 integer")
        );

        let strict = |v: Vec<u8>| Reader::new(&v).with_strict_leb128(true).read_vs32();
        assert_eq!(strict(vec![0x7f]).unwrap(), -1);
        assert_eq!(strict(vec![0x80, 0x7f]).unwrap(), -128);
        assert_eq!(strict(vec![0xc0, 0x00]).unwrap(), 64);
        assert!(strict(vec![0xff, 0x7f]).is_err());
        assert!(strict(vec![0x80, 0x00]).is_err());
    }

    #[test]
    fn test_read_f32() {
        let read = |v: Vec<u8>| Reader::new(&v).read_f32().expect("Failed to read f32");

        assert!(read(vec![0, 0, 192, 127]).is_nan());
        assert!(read(vec![0, 0, 192, 255]).is_nan()); // -nan
        assert_eq!(read(vec![0, 0, 0, 0]), 0.0);
        assert_eq!(read(vec![0, 0, 0, 128]), 0.0); // -0.0
        assert_eq!(read(vec![219, 15, 201, 64]), 6.283_185_5);
        assert_eq!(read(vec![255, 255, 127, 127]), 3.4028234e+38);
        assert_eq!(read(vec![249, 2, 21, 80]), 1.0e10);
    }

    #[test]
    fn test_read_f64() {
        let read = |v: Vec<u8>| Reader::new(&v).read_f64().expect("Failed to read f64");

        assert!(read(vec![0, 0, 0, 0, 0, 0, 248, 127]).is_nan());
        assert_eq!(read(vec![0, 0, 0, 0, 0, 0, 0, 0]), 0.0);
        assert_eq!(read(vec![24, 45, 68, 84, 251, 33, 25, 64]), std::f64::consts::TAU);
        assert_eq!(read(vec![255, 255, 255, 255, 255, 255, 239, 127]), f64::MAX);
        assert_eq!(read(vec![125, 195, 148, 37, 173, 73, 178, 84]), 1.0e100);
    }

    #[test]
    fn test_read_truncated_float() {
        let err = Reader::new(&[0, 0, 0]).read_f32().unwrap_err();
        assert_eq!(err, Error::malformed(0, "unexpected end"));
    }

    #[test]
    fn test_read_v128() {
        let bytes: Vec<u8> = (0..16).collect();
        assert_eq!(
            Reader::new(&bytes).read_v128().unwrap(),
            [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]
        );
    }

    #[test]
    fn test_read_name() {
        let mut reader = Reader::new(&[3, b'a', b'b', b'c', 2, 0xc3, 0xa9]);
        assert_eq!(reader.read_name().unwrap(), "abc");
        assert_eq!(reader.read_name().unwrap(), "é");
        assert!(reader.is_empty());

        let err = Reader::new(&[2, 0xc3, 0x28]).read_name().unwrap_err();
        assert_eq!(err, Error::malformed(0, "malformed UTF-8 encoding"));
    }

    #[test]
    fn test_read_vec() {
        let mut reader = Reader::new(&[3, 1, 2, 3]);
        let v = reader.read_vec(10, "bytes", |r| r.read_byte()).unwrap();
        assert_eq!(v, vec![1, 2, 3]);

        // count claims more elements than the source holds
        let err = Reader::new(&[4, 1, 2, 3]).read_vec(10, "bytes", |r| r.read_byte()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedEncoding);

        let err = Reader::new(&[11]).read_vec(10, "bytes", |r| r.read_byte()).unwrap_err();
        assert_eq!(
            err,
            Error::LimitExceeded {
                what: "bytes",
                limit: 10,
                offset: 0
            }
        );
    }

    #[test]
    fn test_sub_reader_bounds() {
        let bytes = [1, 2, 3, 4, 5];
        let mut reader = Reader::new(&bytes);
        reader.read_byte().unwrap();
        let mut sub = reader.sub_reader(2, 1).unwrap();
        assert_eq!(reader.pos(), 3);
        assert_eq!(sub.read_byte().unwrap(), 2);
        assert!(sub.expect_empty().is_err());
        assert_eq!(sub.read_byte().unwrap(), 3);
        sub.expect_empty().unwrap();

        // reading past the bound while input continues is a length mismatch
        let err = sub.read_byte().unwrap_err();
        assert_eq!(
            err,
            Error::SectionLengthMismatch {
                section: 1,
                offset: 1,
                declared: 2,
                consumed: 3
            }
        );

        let err = reader.sub_reader(3, 5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SectionLengthMismatch);
    }

    #[test]
    fn test_sub_reader_at_end_of_input() {
        let bytes = [0x80];
        let mut reader = Reader::new(&bytes);
        let mut sub = reader.sub_reader(1, 10).unwrap();
        let err = sub.read_vu32().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedEncoding);
    }
}
