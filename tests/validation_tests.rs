mod common;

#[cfg(test)]
mod tests {
    use crate::common::{from_hex, load_fixture, CapturedWriter};
    use kasm_visit::config::{Config, Features};
    use kasm_visit::error::{Error, ErrorKind, IndexSpace, Location};
    use kasm_visit::parser;
    use kasm_visit::validate::dump::StackDumper;
    use kasm_visit::validate::{validate, validate_with_config, ModuleValidator};
    use rstest::rstest;

    #[rstest]
    #[case("tests/fixtures/validation.json")]
    fn test_validation_fixture(#[case] path: &str) {
        let fixture = load_fixture(path);
        assert!(!fixture.cases.is_empty());
        for case in fixture.cases {
            let result = validate(&case.module.0);
            match (&case.expect, result) {
                (None, Ok(())) => {}
                (None, Err(e)) => panic!("{}: expected a valid module, got {}", case.name, e),
                (Some(kind), Ok(())) => panic!("{}: expected {}, but the module validated", case.name, kind),
                (Some(kind), Err(e)) => {
                    assert_eq!(&format!("{:?}", e.kind()), kind, "{}: {}", case.name, e);
                }
            }
        }
    }

    // (type 0 (func (result i32)))
    // (func (type 0) <body>)
    fn single_function(body: &str) -> Vec<u8> {
        let body = from_hex(body);
        let mut code = vec![0x00];
        code.extend_from_slice(&body);
        code.push(0x0b);
        let mut section = vec![0x01, code.len() as u8];
        section.extend_from_slice(&code);
        let mut module = from_hex(
            "0061736d 01000000
             01 05 01 60 00 01 7f
             03 02 01 00",
        );
        module.push(0x0a);
        module.push(section.len() as u8);
        module.extend_from_slice(&section);
        module
    }

    #[rstest]
    #[case::unreachable_then_add("00 6a", None)]
    #[case::unreachable_then_const("00 41 07", None)]
    #[case::concrete_after_unreachable("00 41 01 42 02 6a", Some(ErrorKind::TypeMismatch))]
    #[case::wrong_result("42 01", Some(ErrorKind::TypeMismatch))]
    #[case::extra_value("41 01 41 02", Some(ErrorKind::TypeMismatch))]
    #[case::br_to_function("41 01 0c 00", None)]
    #[case::br_out_of_range("02 40 0c 02 0b 41 01", Some(ErrorKind::UnknownIndex))]
    #[case::br_if_keeps_value("02 7f 41 01 41 00 0d 00 0b", None)]
    #[case::else_without_if("41 01 05", Some(ErrorKind::Invalid))]
    #[case::if_without_else_needs_balance("41 01 04 7f 41 01 0b", Some(ErrorKind::TypeMismatch))]
    fn test_function_bodies(#[case] body: &str, #[case] expect: Option<ErrorKind>) {
        let result = validate(&single_function(body));
        assert_eq!(result.err().map(|e| e.kind()), expect);
    }

    #[test]
    fn test_error_location() {
        // block (result i32) end, then the function falls through with nothing
        let err = validate(&single_function("02 7f 0b")).unwrap_err();
        match err {
            Error::TypeMismatch { location, .. } => {
                assert_eq!(location, Location::Instruction { function: 0, index: 1 })
            }
            other => panic!("unexpected error {}", other),
        }

        let err = validate(&single_function("02 40 0c 05 0b 41 01")).unwrap_err();
        match err {
            Error::UnknownIndex { space, index, .. } => {
                assert_eq!(space, IndexSpace::Label);
                assert_eq!(index, 5);
            }
            other => panic!("unexpected error {}", other),
        }
    }

    // Three functions, the last of type (i32) -> i32; function 0 calls
    // `callee` with an i32 and drops the result.
    #[rstest]
    #[case::defined(2, None)]
    #[case::out_of_range(5, Some(ErrorKind::UnknownIndex))]
    fn test_call_bounds(#[case] callee: u8, #[case] expect: Option<ErrorKind>) {
        let module = from_hex(&format!(
            "0061736d 01000000
             01 09 02 60 00 00 60 01 7f 01 7f
             03 04 03 00 00 01
             0a 11 03
                07 00 41 07 10 {:02x} 1a 0b
                02 00 0b
                04 00 20 00 0b",
            callee
        ));
        assert_eq!(validate(&module).err().map(|e| e.kind()), expect);
    }

    #[test]
    fn test_multiple_memories_need_the_feature() {
        let module = from_hex(
            "0061736d 01000000
             05 05 02 00 01 00 01",
        );
        assert_eq!(validate(&module).unwrap_err().kind(), ErrorKind::Invalid);

        let config = Config::default().with_features(Features {
            multi_memory: true,
            ..Features::default()
        });
        validate_with_config(&module, &config).unwrap();
    }

    // (memory 1) (memory 2) (func (result i32) i32.const 0 i32.load)
    // The load carries no memory index and is checked against memory 0.
    #[test]
    fn test_multiple_memories_address_memory_zero() {
        let module = from_hex(
            "0061736d 01000000
             01 05 01 60 00 01 7f
             03 02 01 00
             05 05 02 00 01 00 02
             0a 09 01 07 00 41 00 28 02 00 0b",
        );
        let config = Config::default().with_features(Features {
            multi_memory: true,
            ..Features::default()
        });
        validate_with_config(&module, &config).unwrap();
        assert_eq!(validate(&module).unwrap_err().kind(), ErrorKind::Invalid);
    }

    // (memory 1) (func (result i32) i32.const 0 <load> align=2^align)
    #[rstest]
    #[case::i32_load(0x28, 3, 4)]
    #[case::i64_load16_s(0x32, 2, 2)]
    #[case::i32_load8_u(0x2d, 1, 1)]
    fn test_alignment_above_natural(#[case] op: u8, #[case] align: u32, #[case] natural: u32) {
        let module = from_hex(&format!(
            "0061736d 01000000
             01 05 01 60 00 01 7f
             03 02 01 00
             05 03 01 00 01
             0a 09 01 07 00 41 00 {:02x} {:02x} 00 0b",
            op, align
        ));
        match validate(&module).unwrap_err() {
            Error::InvalidAlignment {
                location,
                align: found,
                natural: reported,
            } => {
                assert_eq!(location, Location::Instruction { function: 0, index: 1 });
                assert_eq!(found, align);
                assert_eq!(reported, natural);
            }
            other => panic!("unexpected error {}", other),
        }
    }

    #[test]
    fn test_memory_page_limit() {
        // (memory 2)
        let module = from_hex("0061736d 01000000 05 03 01 00 02");
        validate(&module).unwrap();

        let config = Config {
            max_memory_pages: 1,
            ..Config::default()
        };
        assert_eq!(
            validate_with_config(&module, &config).unwrap_err().kind(),
            ErrorKind::Invalid
        );
    }

    #[test]
    fn test_duplicate_export() {
        // (memory 1) (export "m" (memory 0)) (export "m" (memory 0))
        let module = from_hex(
            "0061736d 01000000
             05 03 01 00 01
             07 09 02 01 6d 02 00 01 6d 02 00",
        );
        assert_eq!(validate(&module).unwrap_err().kind(), ErrorKind::Invalid);
    }

    #[test]
    fn test_stack_dump() {
        let out = CapturedWriter::default();
        let mut dumper = StackDumper::new(ModuleValidator::default(), out.clone());
        parser::read(&single_function("41 01 41 02 6a"), &mut dumper).unwrap();

        let text = out.text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "func 0");
        assert_eq!(lines.len(), 5);
        assert!(lines[3].starts_with("   2: i32.add"));
        assert!(lines[3].ends_with("[i32]"));
        assert!(lines[4].ends_with("[]"));
    }

    #[test]
    fn test_stack_dump_stops_at_error() {
        let out = CapturedWriter::default();
        let mut dumper = StackDumper::new(ModuleValidator::default(), out.clone());
        let err = parser::read(&single_function("41 01 42 02 6a"), &mut dumper).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(out.text().lines().count(), 3);
    }
}
