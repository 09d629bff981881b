//! Constant expressions: global initializers and segment offsets.
//!
//! Only constants, `ref.null`, `ref.func` and `global.get` of an immutable
//! global declared earlier are allowed, so there is no control flow and the
//! stack never holds anything but known types.

use crate::error::{Error, IndexSpace, Location, Result};
use crate::parser::opcodes::{Opcode, GLOBAL_GET};
use crate::parser::types::{
    format_types, BlockType, Const, GlobalType, MemArg, ValueType,
};
use crate::parser::visitor::ExprVisitor;
use crate::validate::context::ModuleContext;

#[derive(Debug, Clone)]
pub struct ConstExprValidator {
    expected: ValueType,
    globals: Vec<GlobalType>,
    funcs: u32,
    stack: Vec<ValueType>,
    refs: Vec<u32>,
    index: usize,
    finished: bool,
}

impl ConstExprValidator {
    /// Checks an expression producing `expected`, with `globals` visible to
    /// `global.get` and `funcs` functions visible to `ref.func`.
    pub fn new(expected: ValueType, globals: &[GlobalType], funcs: u32) -> Self {
        ConstExprValidator {
            expected,
            globals: globals.to_vec(),
            funcs,
            stack: vec![],
            refs: vec![],
            index: 0,
            finished: false,
        }
    }

    /// Starts over for another expression in `ctx`. Recorded references are
    /// kept until taken.
    pub fn reset(&mut self, expected: ValueType, ctx: &ModuleContext) {
        let refs = std::mem::take(&mut self.refs);
        *self = ConstExprValidator::new(expected, &ctx.globals, ctx.funcs.len() as u32);
        self.refs = refs;
    }

    /// Functions named by `ref.func` since the last call.
    pub fn take_refs(&mut self) -> Vec<u32> {
        std::mem::take(&mut self.refs)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn begin(&mut self) -> Result<Location> {
        let at = Location::Expression { index: self.index };
        if self.finished {
            return Err(Error::invalid(at, "instruction after the end of the expression"));
        }
        self.index += 1;
        Ok(at)
    }

    fn not_constant(&mut self) -> Result<()> {
        let at = self.begin()?;
        Err(Error::invalid(at, "constant expression required"))
    }
}

impl ExprVisitor for ConstExprValidator {
    fn visit_const(&mut self, value: Const) -> Result<()> {
        self.begin()?;
        self.stack.push(value.value_type());
        Ok(())
    }

    fn visit_ref_null(&mut self, ref_type: ValueType) -> Result<()> {
        let at = self.begin()?;
        if !ref_type.is_ref() {
            return Err(Error::invalid(at, format!("{} is not a reference type", ref_type)));
        }
        self.stack.push(ref_type);
        Ok(())
    }

    fn visit_ref_func(&mut self, func: u32) -> Result<()> {
        let at = self.begin()?;
        if func >= self.funcs {
            return Err(Error::UnknownIndex {
                space: IndexSpace::Function,
                index: func,
                location: at,
            });
        }
        self.refs.push(func);
        self.stack.push(ValueType::FuncRef);
        Ok(())
    }

    fn visit_variable(&mut self, op: Opcode, index: u32) -> Result<()> {
        let at = self.begin()?;
        if op != GLOBAL_GET {
            return Err(Error::invalid(at, "constant expression required"));
        }
        let global = self.globals.get(index as usize).ok_or(Error::UnknownIndex {
            space: IndexSpace::Global,
            index,
            location: at,
        })?;
        if global.mutable {
            return Err(Error::invalid(
                at,
                format!("constant expression cannot read mutable global {}", index),
            ));
        }
        self.stack.push(global.value_type);
        Ok(())
    }

    fn visit_insn(&mut self, _op: Opcode) -> Result<()> {
        self.not_constant()
    }

    fn visit_select_typed(&mut self, _types: &[ValueType]) -> Result<()> {
        self.not_constant()
    }

    fn visit_table(&mut self, _op: Opcode, _index: u32) -> Result<()> {
        self.not_constant()
    }

    fn visit_table_pair(&mut self, _op: Opcode, _first: u32, _second: u32) -> Result<()> {
        self.not_constant()
    }

    fn visit_mem(&mut self, _op: Opcode, _memarg: MemArg) -> Result<()> {
        self.not_constant()
    }

    fn visit_mem_lane(&mut self, _op: Opcode, _memarg: MemArg, _lane: u8) -> Result<()> {
        self.not_constant()
    }

    fn visit_indexed_mem(&mut self, _op: Opcode, _data: u32) -> Result<()> {
        self.not_constant()
    }

    fn visit_block(&mut self, _op: Opcode, _block_type: BlockType) -> Result<()> {
        self.not_constant()
    }

    fn visit_else(&mut self) -> Result<()> {
        self.not_constant()
    }

    fn visit_end_insn(&mut self) -> Result<()> {
        self.not_constant()
    }

    fn visit_break(&mut self, _op: Opcode, _label: u32) -> Result<()> {
        self.not_constant()
    }

    fn visit_br_table(&mut self, _labels: &[u32], _default: u32) -> Result<()> {
        self.not_constant()
    }

    fn visit_call(&mut self, _func: u32) -> Result<()> {
        self.not_constant()
    }

    fn visit_call_indirect(&mut self, _table: u32, _type_index: u32) -> Result<()> {
        self.not_constant()
    }

    fn visit_lane(&mut self, _op: Opcode, _lane: u8) -> Result<()> {
        self.not_constant()
    }

    fn visit_shuffle(&mut self, _lanes: [u8; 16]) -> Result<()> {
        self.not_constant()
    }

    fn visit_end(&mut self) -> Result<()> {
        let at = self.begin()?;
        if self.stack != [self.expected] {
            return Err(Error::type_mismatch(
                at,
                format!(
                    "constant expression must produce [{}], found {}",
                    self.expected,
                    format_types(&self.stack)
                ),
            ));
        }
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::parser::opcodes::{GLOBAL_SET, I32_ADD, NOP};
    use rstest::rstest;
    use ValueType::*;

    fn globals() -> Vec<GlobalType> {
        vec![
            GlobalType {
                value_type: I64,
                mutable: false,
            },
            GlobalType {
                value_type: I32,
                mutable: true,
            },
        ]
    }

    #[test]
    fn test_constant() {
        let mut v = ConstExprValidator::new(I32, &globals(), 2);
        v.visit_const(Const::I32(42)).unwrap();
        v.visit_end().unwrap();
        assert!(v.is_finished());
    }

    #[test]
    fn test_global_get() {
        let mut v = ConstExprValidator::new(I64, &globals(), 2);
        v.visit_variable(GLOBAL_GET, 0).unwrap();
        v.visit_end().unwrap();

        let mut v = ConstExprValidator::new(I32, &globals(), 2);
        let err = v.visit_variable(GLOBAL_GET, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);

        let mut v = ConstExprValidator::new(I32, &globals(), 2);
        let err = v.visit_variable(GLOBAL_GET, 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownIndex);

        let mut v = ConstExprValidator::new(I32, &globals(), 2);
        let err = v.visit_variable(GLOBAL_SET, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
    }

    #[test]
    fn test_ref_func_is_recorded() {
        let mut v = ConstExprValidator::new(FuncRef, &[], 2);
        v.visit_ref_func(1).unwrap();
        v.visit_end().unwrap();
        assert_eq!(v.take_refs(), vec![1]);
        assert!(v.take_refs().is_empty());

        let mut v = ConstExprValidator::new(FuncRef, &[], 2);
        assert_eq!(v.visit_ref_func(2).unwrap_err().kind(), ErrorKind::UnknownIndex);
    }

    #[rstest]
    #[case::wrong_type(vec![Const::I64(1)])]
    #[case::empty(vec![])]
    #[case::two_values(vec![Const::I32(1), Const::I32(2)])]
    fn test_result_mismatch(#[case] consts: Vec<Const>) {
        let mut v = ConstExprValidator::new(I32, &[], 0);
        for value in consts {
            v.visit_const(value).unwrap();
        }
        let err = v.visit_end().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_non_constant_instructions() {
        let mut v = ConstExprValidator::new(I32, &[], 0);
        v.visit_const(Const::I32(1)).unwrap();
        v.visit_const(Const::I32(2)).unwrap();
        let err = v.visit_insn(I32_ADD).unwrap_err();
        assert_eq!(
            err,
            Error::invalid(Location::Expression { index: 2 }, "constant expression required")
        );
        assert!(v.visit_insn(NOP).is_err());
        assert!(v.visit_call(0).is_err());
        assert!(v.visit_block(Opcode::Plain(0x02), BlockType::Empty).is_err());
    }

    #[test]
    fn test_reset_keeps_refs() {
        let ctx = ModuleContext {
            funcs: vec![0, 0],
            ..Default::default()
        };
        let mut v = ConstExprValidator::new(FuncRef, &[], 2);
        v.visit_ref_func(0).unwrap();
        v.visit_end().unwrap();
        v.reset(I32, &ctx);
        assert!(!v.is_finished());
        v.visit_const(Const::I32(0)).unwrap();
        v.visit_end().unwrap();
        assert_eq!(v.take_refs(), vec![0]);
    }
}
