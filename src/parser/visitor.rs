//! The visitor protocol.
//!
//! The reader walks a module top to bottom and reports what it decodes as
//! calls on these traits; the writer and the validator implement them.
//! Section methods on [`ModuleVisitor`] hand back an optional sub-visitor:
//! returning `None` skips that section's contents. Each sub-visitor receives
//! one call per entry and a closing `visit_end`.
//!
//! Every method has a default that accepts and ignores its event, so an
//! implementation only spells out the events it cares about.

use crate::error::Result;
use crate::parser::opcodes::Opcode;
use crate::parser::types::{
    BlockType, Const, ExternalKind, GlobalType, Limits, MemArg, TableType, ValueType,
};

pub trait ModuleVisitor {
    fn visit_header(&mut self, _version: u32) -> Result<()> {
        Ok(())
    }

    /// A custom section, in the position it appears in the module.
    fn visit_custom(&mut self, _name: &str, _payload: &[u8]) -> Result<()> {
        Ok(())
    }

    fn visit_types(&mut self) -> Result<Option<&mut dyn TypesVisitor>> {
        Ok(None)
    }

    fn visit_imports(&mut self) -> Result<Option<&mut dyn ImportsVisitor>> {
        Ok(None)
    }

    fn visit_funcs(&mut self) -> Result<Option<&mut dyn FunctionsVisitor>> {
        Ok(None)
    }

    fn visit_tables(&mut self) -> Result<Option<&mut dyn TablesVisitor>> {
        Ok(None)
    }

    fn visit_mems(&mut self) -> Result<Option<&mut dyn MemoriesVisitor>> {
        Ok(None)
    }

    fn visit_globals(&mut self) -> Result<Option<&mut dyn GlobalsVisitor>> {
        Ok(None)
    }

    fn visit_exports(&mut self) -> Result<Option<&mut dyn ExportsVisitor>> {
        Ok(None)
    }

    fn visit_start(&mut self, _func: u32) -> Result<()> {
        Ok(())
    }

    fn visit_elems(&mut self) -> Result<Option<&mut dyn ElementSegmentsVisitor>> {
        Ok(None)
    }

    fn visit_data_count(&mut self, _count: u32) -> Result<()> {
        Ok(())
    }

    fn visit_code(&mut self) -> Result<Option<&mut dyn CodesVisitor>> {
        Ok(None)
    }

    fn visit_datas(&mut self) -> Result<Option<&mut dyn DataSegmentsVisitor>> {
        Ok(None)
    }

    fn visit_end(&mut self) -> Result<()> {
        Ok(())
    }
}

pub trait TypesVisitor {
    fn visit_func_type(&mut self, _params: &[ValueType], _results: &[ValueType]) -> Result<()> {
        Ok(())
    }

    fn visit_end(&mut self) -> Result<()> {
        Ok(())
    }
}

pub trait ImportsVisitor {
    fn visit_func_import(&mut self, _module: &str, _name: &str, _type_index: u32) -> Result<()> {
        Ok(())
    }

    fn visit_table_import(&mut self, _module: &str, _name: &str, _table: TableType) -> Result<()> {
        Ok(())
    }

    fn visit_mem_import(&mut self, _module: &str, _name: &str, _limits: Limits) -> Result<()> {
        Ok(())
    }

    fn visit_global_import(&mut self, _module: &str, _name: &str, _global: GlobalType) -> Result<()> {
        Ok(())
    }

    fn visit_end(&mut self) -> Result<()> {
        Ok(())
    }
}

pub trait FunctionsVisitor {
    fn visit_func(&mut self, _type_index: u32) -> Result<()> {
        Ok(())
    }

    fn visit_end(&mut self) -> Result<()> {
        Ok(())
    }
}

pub trait TablesVisitor {
    fn visit_table(&mut self, _table: TableType) -> Result<()> {
        Ok(())
    }

    fn visit_end(&mut self) -> Result<()> {
        Ok(())
    }
}

pub trait MemoriesVisitor {
    fn visit_memory(&mut self, _limits: Limits) -> Result<()> {
        Ok(())
    }

    fn visit_end(&mut self) -> Result<()> {
        Ok(())
    }
}

pub trait GlobalsVisitor {
    /// Returns the visitor for the global's initializer expression.
    fn visit_global(&mut self, _global: GlobalType) -> Result<Option<&mut dyn ExprVisitor>> {
        Ok(None)
    }

    fn visit_end(&mut self) -> Result<()> {
        Ok(())
    }
}

pub trait ExportsVisitor {
    fn visit_export(&mut self, _name: &str, _kind: ExternalKind, _index: u32) -> Result<()> {
        Ok(())
    }

    fn visit_end(&mut self) -> Result<()> {
        Ok(())
    }
}

pub trait ElementSegmentsVisitor {
    fn visit_elem(&mut self) -> Result<Option<&mut dyn ElementVisitor>> {
        Ok(None)
    }

    fn visit_end(&mut self) -> Result<()> {
        Ok(())
    }
}

/// One element segment: its mode, then its element type, then either
/// function indices or one initializer expression per element.
pub trait ElementVisitor {
    fn visit_passive(&mut self) -> Result<()> {
        Ok(())
    }

    fn visit_declarative(&mut self) -> Result<()> {
        Ok(())
    }

    /// Returns the visitor for the offset expression.
    fn visit_active(&mut self, _table: u32) -> Result<Option<&mut dyn ExprVisitor>> {
        Ok(None)
    }

    fn visit_type(&mut self, _elem_type: ValueType) -> Result<()> {
        Ok(())
    }

    fn visit_func_indices(&mut self, _funcs: &[u32]) -> Result<()> {
        Ok(())
    }

    /// Called once per element initializer expression.
    fn visit_init(&mut self) -> Result<Option<&mut dyn ExprVisitor>> {
        Ok(None)
    }

    fn visit_end(&mut self) -> Result<()> {
        Ok(())
    }
}

pub trait CodesVisitor {
    /// One function body; `locals` is the expanded local declaration list,
    /// not including parameters.
    fn visit_code(&mut self, _locals: &[ValueType]) -> Result<Option<&mut dyn ExprVisitor>> {
        Ok(None)
    }

    fn visit_end(&mut self) -> Result<()> {
        Ok(())
    }
}

pub trait DataSegmentsVisitor {
    fn visit_data(&mut self) -> Result<Option<&mut dyn DataVisitor>> {
        Ok(None)
    }

    fn visit_end(&mut self) -> Result<()> {
        Ok(())
    }
}

pub trait DataVisitor {
    fn visit_passive(&mut self) -> Result<()> {
        Ok(())
    }

    /// Returns the visitor for the offset expression.
    fn visit_active(&mut self, _memory: u32) -> Result<Option<&mut dyn ExprVisitor>> {
        Ok(None)
    }

    fn visit_init(&mut self, _bytes: &[u8]) -> Result<()> {
        Ok(())
    }

    fn visit_end(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Instructions of a function body or constant expression, one call per
/// instruction, grouped by the shape of their immediates.
///
/// Nested `end`s arrive as [`visit_end_insn`](ExprVisitor::visit_end_insn);
/// the `end` closing the whole expression arrives as
/// [`visit_end`](ExprVisitor::visit_end).
pub trait ExprVisitor {
    /// Instructions with no immediates, including untyped `select`.
    fn visit_insn(&mut self, _op: Opcode) -> Result<()> {
        Ok(())
    }

    fn visit_const(&mut self, _value: Const) -> Result<()> {
        Ok(())
    }

    fn visit_ref_null(&mut self, _ref_type: ValueType) -> Result<()> {
        Ok(())
    }

    fn visit_ref_func(&mut self, _func: u32) -> Result<()> {
        Ok(())
    }

    fn visit_select_typed(&mut self, _types: &[ValueType]) -> Result<()> {
        Ok(())
    }

    /// `local.*` and `global.*`.
    fn visit_variable(&mut self, _op: Opcode, _index: u32) -> Result<()> {
        Ok(())
    }

    /// `table.get/set/grow/size/fill` with a table index, or `elem.drop`
    /// with an element segment index.
    fn visit_table(&mut self, _op: Opcode, _index: u32) -> Result<()> {
        Ok(())
    }

    /// `table.init` (element, table) and `table.copy` (destination, source).
    fn visit_table_pair(&mut self, _op: Opcode, _first: u32, _second: u32) -> Result<()> {
        Ok(())
    }

    fn visit_mem(&mut self, _op: Opcode, _memarg: MemArg) -> Result<()> {
        Ok(())
    }

    fn visit_mem_lane(&mut self, _op: Opcode, _memarg: MemArg, _lane: u8) -> Result<()> {
        Ok(())
    }

    /// `memory.init` and `data.drop` with a data segment index.
    fn visit_indexed_mem(&mut self, _op: Opcode, _data: u32) -> Result<()> {
        Ok(())
    }

    /// `block`, `loop` and `if`.
    fn visit_block(&mut self, _op: Opcode, _block_type: BlockType) -> Result<()> {
        Ok(())
    }

    fn visit_else(&mut self) -> Result<()> {
        Ok(())
    }

    fn visit_end_insn(&mut self) -> Result<()> {
        Ok(())
    }

    /// `br` and `br_if`.
    fn visit_break(&mut self, _op: Opcode, _label: u32) -> Result<()> {
        Ok(())
    }

    fn visit_br_table(&mut self, _labels: &[u32], _default: u32) -> Result<()> {
        Ok(())
    }

    fn visit_call(&mut self, _func: u32) -> Result<()> {
        Ok(())
    }

    fn visit_call_indirect(&mut self, _table: u32, _type_index: u32) -> Result<()> {
        Ok(())
    }

    fn visit_lane(&mut self, _op: Opcode, _lane: u8) -> Result<()> {
        Ok(())
    }

    fn visit_shuffle(&mut self, _lanes: [u8; 16]) -> Result<()> {
        Ok(())
    }

    fn visit_end(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Accepts and discards every instruction; used to walk expressions nobody
/// asked to see.
pub(crate) struct SkipExpr;

impl ExprVisitor for SkipExpr {}
