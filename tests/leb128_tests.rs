#[cfg(test)]
mod tests {
    use kasm_visit::error::ErrorKind;
    use kasm_visit::parser::encoding::{vu_len, write_vs32, write_vs64, write_vu32, write_vu64};
    use kasm_visit::parser::reader::Reader;
    use rand::Rng;
    use rstest::rstest;

    const ITERATIONS: usize = 10_000;

    /// Stretches a minimal encoding to `len` bytes with redundant groups that
    /// leave the value unchanged.
    fn pad(mut bytes: Vec<u8>, len: usize, negative: bool) -> Vec<u8> {
        let fill = if negative { 0x7f } else { 0x00 };
        if let Some(last) = bytes.last_mut() {
            *last |= 0x80;
        }
        while bytes.len() < len - 1 {
            bytes.push(fill | 0x80);
        }
        bytes.push(fill);
        bytes
    }

    /// A random value with a random number of significant bits, so that every
    /// encoded length is covered.
    fn random_u64(rng: &mut impl Rng) -> u64 {
        let bits = rng.gen_range(0..=64);
        if bits == 0 {
            0
        } else {
            rng.gen::<u64>() >> (64 - bits)
        }
    }

    #[rstest]
    #[case(0, "00")]
    #[case(127, "7f")]
    #[case(128, "8001")]
    #[case(624_485, "e58e26")]
    #[case(u32::MAX, "ffffffff0f")]
    fn test_known_unsigned(#[case] value: u32, #[case] expected: &str) {
        let mut buf = Vec::new();
        write_vu32(&mut buf, value);
        assert_eq!(hex::encode(&buf), expected);
        assert_eq!(vu_len(value as u64), buf.len());
    }

    #[test]
    fn test_random_unsigned() {
        let mut rng = rand::thread_rng();
        for _ in 0..ITERATIONS {
            let value = random_u64(&mut rng);
            let mut buf = Vec::new();
            write_vu64(&mut buf, value);
            assert_eq!(buf.len(), vu_len(value), "length of {}", value);

            let mut r = Reader::new(&buf).with_strict_leb128(true);
            assert_eq!(r.read_vu64().unwrap(), value);
            assert!(r.is_empty());

            let narrow = value as u32;
            let mut buf = Vec::new();
            write_vu32(&mut buf, narrow);
            assert_eq!(buf.len(), vu_len(narrow as u64));
            assert_eq!(Reader::new(&buf).read_vu32().unwrap(), narrow);
        }
    }

    #[test]
    fn test_random_signed() {
        let mut rng = rand::thread_rng();
        for _ in 0..ITERATIONS {
            let value = random_u64(&mut rng) as i64;
            let mut buf = Vec::new();
            write_vs64(&mut buf, value);
            let mut r = Reader::new(&buf).with_strict_leb128(true);
            assert_eq!(r.read_vs64().unwrap(), value);
            assert!(r.is_empty());

            let narrow = value as i32;
            let mut buf = Vec::new();
            write_vs32(&mut buf, narrow);
            assert!(buf.len() <= 5);
            assert_eq!(Reader::new(&buf).with_strict_leb128(true).read_vs32().unwrap(), narrow);
        }
    }

    #[test]
    fn test_padded_encodings() {
        let mut rng = rand::thread_rng();
        for _ in 0..ITERATIONS {
            let value = random_u64(&mut rng) as u32;
            let mut minimal = Vec::new();
            write_vu32(&mut minimal, value);
            if minimal.len() == 5 {
                continue;
            }
            let padded = pad(minimal, rng.gen_range(vu_len(value as u64) + 1..=5), false);

            let mut r = Reader::new(&padded);
            assert_eq!(r.read_vu32().unwrap(), value, "{}", hex::encode(&padded));
            assert!(r.is_empty());

            let err = Reader::new(&padded).with_strict_leb128(true).read_vu32().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedEncoding);
            assert_eq!(err.offset(), Some(0));
        }
    }

    #[test]
    fn test_padded_signed_encodings() {
        let mut rng = rand::thread_rng();
        for _ in 0..ITERATIONS {
            let value = rng.gen_range(-(1i32 << 20)..(1i32 << 20));
            let mut minimal = Vec::new();
            write_vs32(&mut minimal, value);
            let len = minimal.len();
            let padded = pad(minimal, rng.gen_range(len + 1..=5), value < 0);

            assert_eq!(Reader::new(&padded).read_vs32().unwrap(), value, "{}", hex::encode(&padded));
            assert!(Reader::new(&padded).with_strict_leb128(true).read_vs32().is_err());
        }
    }

    #[rstest]
    #[case::too_long("8080808080 00")]
    #[case::too_large("ffffffff1f")]
    #[case::truncated("8080")]
    fn test_rejected_unsigned(#[case] encoded: &str) {
        let bytes = hex::decode(encoded.replace(' ', "")).unwrap();
        let err = Reader::new(&bytes).read_vu32().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedEncoding);
    }
}
