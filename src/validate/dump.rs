//! Validation with a running commentary.
//!
//! [`StackDumper`] validates exactly like [`ModuleValidator`] and, for every
//! instruction of every function body, writes the instruction and the
//! operand stack it leaves behind:
//!
//! ```text
//! func 0
//!    0: i32.const 1                              [i32]
//!    1: i32.const 2                              [i32 i32]
//!    2: i32.add                                  [i32]
//!    3: end                                      []
//! ```

use crate::error::{Error, Location, Result};
use crate::parser::opcodes::Opcode;
use crate::parser::types::{BlockType, Const, MemArg, ValueType};
use crate::parser::visitor::*;
use crate::validate::function::FunctionValidator;
use crate::validate::module::ModuleValidator;
use fhex::ToHex;
use std::io::Write;

pub struct StackDumper<W: Write> {
    validator: ModuleValidator,
    out: W,
    index: usize,
}

impl<W: Write> StackDumper<W> {
    pub fn new(validator: ModuleValidator, out: W) -> Self {
        StackDumper {
            validator,
            out,
            index: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn step<F>(&mut self, text: String, check: F) -> Result<()>
    where
        F: FnOnce(&mut FunctionValidator) -> Result<()>,
    {
        let function = self
            .validator
            .function()
            .ok_or_else(|| Error::invalid(Location::Module, "no function body is being visited"))?;
        check(function)?;
        let stack: Vec<String> = function.stack().iter().map(|t| t.to_string()).collect();
        writeln!(self.out, "{:>4}: {:<40} [{}]", self.index, text, stack.join(" "))?;
        self.index += 1;
        Ok(())
    }
}

fn format_const(value: Const) -> String {
    match value {
        Const::I32(v) => format!("i32.const {}", v),
        Const::I64(v) => format!("i64.const {}", v),
        Const::F32(v) => format!("f32.const {}", v.to_hex()),
        Const::F64(v) => format!("f64.const {}", v.to_hex()),
        Const::V128(bytes) => format!("v128.const 0x{}", hex::encode(bytes)),
    }
}

fn format_memarg(op: Opcode, memarg: MemArg) -> String {
    format!("{} offset={} align={}", op, memarg.offset, 1u64 << memarg.align.min(63))
}

fn format_block(op: Opcode, block_type: BlockType) -> String {
    match block_type {
        BlockType::Empty => op.to_string(),
        BlockType::Value(t) => format!("{} (result {})", op, t),
        BlockType::FuncType(index) => format!("{} (type {})", op, index),
    }
}

fn join(values: &[u32]) -> String {
    let strings: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    strings.join(" ")
}

impl<W: Write> ModuleVisitor for StackDumper<W> {
    fn visit_header(&mut self, version: u32) -> Result<()> {
        self.validator.visit_header(version)
    }

    fn visit_custom(&mut self, name: &str, payload: &[u8]) -> Result<()> {
        self.validator.visit_custom(name, payload)
    }

    fn visit_types(&mut self) -> Result<Option<&mut dyn TypesVisitor>> {
        self.validator.visit_types()
    }

    fn visit_imports(&mut self) -> Result<Option<&mut dyn ImportsVisitor>> {
        self.validator.visit_imports()
    }

    fn visit_funcs(&mut self) -> Result<Option<&mut dyn FunctionsVisitor>> {
        self.validator.visit_funcs()
    }

    fn visit_tables(&mut self) -> Result<Option<&mut dyn TablesVisitor>> {
        self.validator.visit_tables()
    }

    fn visit_mems(&mut self) -> Result<Option<&mut dyn MemoriesVisitor>> {
        self.validator.visit_mems()
    }

    fn visit_globals(&mut self) -> Result<Option<&mut dyn GlobalsVisitor>> {
        self.validator.visit_globals()
    }

    fn visit_exports(&mut self) -> Result<Option<&mut dyn ExportsVisitor>> {
        self.validator.visit_exports()
    }

    fn visit_start(&mut self, func: u32) -> Result<()> {
        self.validator.visit_start(func)
    }

    fn visit_elems(&mut self) -> Result<Option<&mut dyn ElementSegmentsVisitor>> {
        self.validator.visit_elems()
    }

    fn visit_data_count(&mut self, count: u32) -> Result<()> {
        self.validator.visit_data_count(count)
    }

    fn visit_code(&mut self) -> Result<Option<&mut dyn CodesVisitor>> {
        ModuleVisitor::visit_code(&mut self.validator)?;
        Ok(Some(self))
    }

    fn visit_datas(&mut self) -> Result<Option<&mut dyn DataSegmentsVisitor>> {
        self.validator.visit_datas()
    }

    fn visit_end(&mut self) -> Result<()> {
        ModuleVisitor::visit_end(&mut self.validator)?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> CodesVisitor for StackDumper<W> {
    fn visit_code(&mut self, locals: &[ValueType]) -> Result<Option<&mut dyn ExprVisitor>> {
        CodesVisitor::visit_code(&mut self.validator, locals)?;
        let function = self.validator.function().map(|f| f.function()).unwrap_or_default();
        writeln!(self.out, "func {}", function)?;
        self.index = 0;
        Ok(Some(self))
    }

    fn visit_end(&mut self) -> Result<()> {
        CodesVisitor::visit_end(&mut self.validator)
    }
}

impl<W: Write> ExprVisitor for StackDumper<W> {
    fn visit_insn(&mut self, op: Opcode) -> Result<()> {
        self.step(op.to_string(), |f| f.visit_insn(op))
    }

    fn visit_const(&mut self, value: Const) -> Result<()> {
        self.step(format_const(value), |f| f.visit_const(value))
    }

    fn visit_ref_null(&mut self, ref_type: ValueType) -> Result<()> {
        self.step(format!("ref.null {}", ref_type), |f| f.visit_ref_null(ref_type))
    }

    fn visit_ref_func(&mut self, func: u32) -> Result<()> {
        self.step(format!("ref.func {}", func), |f| f.visit_ref_func(func))
    }

    fn visit_select_typed(&mut self, types: &[ValueType]) -> Result<()> {
        let results: Vec<String> = types.iter().map(|t| t.to_string()).collect();
        self.step(format!("select (result {})", results.join(" ")), |f| {
            f.visit_select_typed(types)
        })
    }

    fn visit_variable(&mut self, op: Opcode, index: u32) -> Result<()> {
        self.step(format!("{} {}", op, index), |f| f.visit_variable(op, index))
    }

    fn visit_table(&mut self, op: Opcode, index: u32) -> Result<()> {
        self.step(format!("{} {}", op, index), |f| f.visit_table(op, index))
    }

    fn visit_table_pair(&mut self, op: Opcode, first: u32, second: u32) -> Result<()> {
        self.step(format!("{} {} {}", op, first, second), |f| {
            f.visit_table_pair(op, first, second)
        })
    }

    fn visit_mem(&mut self, op: Opcode, memarg: MemArg) -> Result<()> {
        self.step(format_memarg(op, memarg), |f| f.visit_mem(op, memarg))
    }

    fn visit_mem_lane(&mut self, op: Opcode, memarg: MemArg, lane: u8) -> Result<()> {
        self.step(format!("{} {}", format_memarg(op, memarg), lane), |f| {
            f.visit_mem_lane(op, memarg, lane)
        })
    }

    fn visit_indexed_mem(&mut self, op: Opcode, data: u32) -> Result<()> {
        self.step(format!("{} {}", op, data), |f| f.visit_indexed_mem(op, data))
    }

    fn visit_block(&mut self, op: Opcode, block_type: BlockType) -> Result<()> {
        self.step(format_block(op, block_type), |f| f.visit_block(op, block_type))
    }

    fn visit_else(&mut self) -> Result<()> {
        self.step("else".to_string(), |f| f.visit_else())
    }

    fn visit_end_insn(&mut self) -> Result<()> {
        self.step("end".to_string(), |f| f.visit_end_insn())
    }

    fn visit_break(&mut self, op: Opcode, label: u32) -> Result<()> {
        self.step(format!("{} {}", op, label), |f| f.visit_break(op, label))
    }

    fn visit_br_table(&mut self, labels: &[u32], default: u32) -> Result<()> {
        let text = if labels.is_empty() {
            format!("br_table {}", default)
        } else {
            format!("br_table {} {}", join(labels), default)
        };
        self.step(text, |f| f.visit_br_table(labels, default))
    }

    fn visit_call(&mut self, func: u32) -> Result<()> {
        self.step(format!("call {}", func), |f| f.visit_call(func))
    }

    fn visit_call_indirect(&mut self, table: u32, type_index: u32) -> Result<()> {
        self.step(format!("call_indirect {} (type {})", table, type_index), |f| {
            f.visit_call_indirect(table, type_index)
        })
    }

    fn visit_lane(&mut self, op: Opcode, lane: u8) -> Result<()> {
        self.step(format!("{} {}", op, lane), |f| f.visit_lane(op, lane))
    }

    fn visit_shuffle(&mut self, lanes: [u8; 16]) -> Result<()> {
        let indices: Vec<u32> = lanes.iter().map(|lane| u32::from(*lane)).collect();
        self.step(format!("i8x16.shuffle {}", join(&indices)), |f| f.visit_shuffle(lanes))
    }

    fn visit_end(&mut self) -> Result<()> {
        self.step("end".to_string(), |f| f.visit_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::parser::opcodes::*;
    use crate::parser::types::Limits;

    fn dumper() -> StackDumper<Vec<u8>> {
        StackDumper::new(ModuleValidator::default(), Vec::new())
    }

    fn declare(d: &mut StackDumper<Vec<u8>>, params: &[ValueType], results: &[ValueType]) {
        let types = d.visit_types().unwrap().unwrap();
        types.visit_func_type(params, results).unwrap();
        types.visit_end().unwrap();
        let funcs = d.visit_funcs().unwrap().unwrap();
        funcs.visit_func(0).unwrap();
        funcs.visit_end().unwrap();
    }

    #[test]
    fn test_dump_add() {
        let mut d = dumper();
        declare(&mut d, &[], &[ValueType::I32]);
        let codes = ModuleVisitor::visit_code(&mut d).unwrap().unwrap();
        let body = codes.visit_code(&[]).unwrap().unwrap();
        body.visit_const(Const::I32(1)).unwrap();
        body.visit_const(Const::I32(2)).unwrap();
        body.visit_insn(I32_ADD).unwrap();
        body.visit_end().unwrap();
        codes.visit_end().unwrap();
        ModuleVisitor::visit_end(&mut d).unwrap();

        let text = String::from_utf8(d.into_inner()).unwrap();
        let line = |index: usize, insn: &str, stack: &str| format!("{:>4}: {:<40} [{}]", index, insn, stack);
        let expected = vec![
            "func 0".to_string(),
            line(0, "i32.const 1", "i32"),
            line(1, "i32.const 2", "i32 i32"),
            line(2, "i32.add", "i32"),
            line(3, "end", ""),
        ];
        assert_eq!(text.lines().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_dump_immediates() {
        let mut d = dumper();
        declare(&mut d, &[ValueType::I32], &[]);
        let mems = d.visit_mems().unwrap().unwrap();
        mems.visit_memory(Limits::new(1, None)).unwrap();
        mems.visit_end().unwrap();
        let codes = ModuleVisitor::visit_code(&mut d).unwrap().unwrap();
        let body = codes.visit_code(&[]).unwrap().unwrap();
        body.visit_const(Const::F32(1.5)).unwrap();
        body.visit_insn(DROP).unwrap();
        body.visit_variable(LOCAL_GET, 0).unwrap();
        body.visit_mem(I64_LOAD, MemArg { align: 3, offset: 16 }).unwrap();
        body.visit_insn(DROP).unwrap();
        body.visit_insn(UNREACHABLE).unwrap();
        body.visit_insn(I32_ADD).unwrap();
        body.visit_insn(DROP).unwrap();
        body.visit_end().unwrap();

        let text = String::from_utf8(d.into_inner()).unwrap();
        assert!(text.contains(&format!("f32.const {}", 1.5f32.to_hex())));
        assert!(text.contains("i64.load offset=16 align=8"));
        assert!(text.contains("[i64]"));
        assert!(text.contains("   6: i32.add"));
    }

    #[test]
    fn test_dump_stops_at_first_error() {
        let mut d = dumper();
        declare(&mut d, &[], &[]);
        let codes = ModuleVisitor::visit_code(&mut d).unwrap().unwrap();
        let body = codes.visit_code(&[]).unwrap().unwrap();
        body.visit_const(Const::I64(1)).unwrap();
        let err = body.visit_insn(I32_EQZ).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        let text = String::from_utf8(d.into_inner()).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_formatting_helpers() {
        assert_eq!(format_block(LOOP, BlockType::Value(ValueType::F64)), "loop (result f64)");
        assert_eq!(format_block(BLOCK, BlockType::FuncType(3)), "block (type 3)");
        assert_eq!(format_const(Const::V128([0xab; 16])), format!("v128.const 0x{}", "ab".repeat(16)));
        assert_eq!(join(&[1, 2, 3]), "1 2 3");
    }
}
