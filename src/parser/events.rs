//! A flat, serialisable log of visitor calls.
//!
//! [`EventRecorder`] implements the whole visitor protocol and appends one
//! [`Event`] per call; [`replay`] feeds a log back into any
//! [`ModuleVisitor`]. Every `visit_end`, whether it closes a section, a
//! segment, an expression or the module, is logged as [`Event::End`], so the
//! nesting of the log mirrors the nesting of the calls.

use crate::error::{Error, Result};
use crate::parser::opcodes::Opcode;
use crate::parser::types::{
    BlockType, Const, ExternalKind, GlobalType, Limits, MemArg, TableType, ValueType,
};
use crate::parser::visitor::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Header { version: u32 },
    Custom { name: String, payload: Vec<u8> },
    Types,
    Imports,
    Funcs,
    Tables,
    Mems,
    Globals,
    Exports,
    Start { func: u32 },
    Elems,
    DataCount { count: u32 },
    Code,
    Datas,
    End,

    FuncType { params: Vec<ValueType>, results: Vec<ValueType> },
    FuncImport { module: String, name: String, type_index: u32 },
    TableImport { module: String, name: String, table: TableType },
    MemImport { module: String, name: String, limits: Limits },
    GlobalImport { module: String, name: String, global: GlobalType },
    Func { type_index: u32 },
    Table { table: TableType },
    Memory { limits: Limits },
    Global { global: GlobalType },
    Export { name: String, kind: ExternalKind, index: u32 },
    Elem,
    ElemPassive,
    ElemDeclarative,
    ElemActive { table: u32 },
    ElemType { elem_type: ValueType },
    ElemFuncIndices { funcs: Vec<u32> },
    ElemInit,
    Body { locals: Vec<ValueType> },
    Data,
    DataPassive,
    DataActive { memory: u32 },
    DataInit { bytes: Vec<u8> },

    Insn { op: Opcode },
    Const { value: Const },
    RefNull { ref_type: ValueType },
    RefFunc { func: u32 },
    SelectTyped { types: Vec<ValueType> },
    Variable { op: Opcode, index: u32 },
    TableInsn { op: Opcode, index: u32 },
    TablePair { op: Opcode, first: u32, second: u32 },
    Mem { op: Opcode, memarg: MemArg },
    MemLane { op: Opcode, memarg: MemArg, lane: u8 },
    IndexedMem { op: Opcode, data: u32 },
    Block { op: Opcode, block_type: BlockType },
    Else,
    EndInsn,
    Break { op: Opcode, label: u32 },
    BrTable { labels: Vec<u32>, default: u32 },
    Call { func: u32 },
    CallIndirect { table: u32, type_index: u32 },
    Lane { op: Opcode, lane: u8 },
    Shuffle { lanes: [u8; 16] },
}

impl Event {
    /// Events after which the log carries a nested scope closed by its own
    /// [`Event::End`].
    fn opens_scope(&self) -> bool {
        matches!(
            self,
            Event::Types
                | Event::Imports
                | Event::Funcs
                | Event::Tables
                | Event::Mems
                | Event::Globals
                | Event::Exports
                | Event::Elems
                | Event::Code
                | Event::Datas
                | Event::Global { .. }
                | Event::Elem
                | Event::ElemActive { .. }
                | Event::ElemInit
                | Event::Body { .. }
                | Event::Data
                | Event::DataActive { .. }
        )
    }
}

/// Records every visitor call it receives. Accepts every section.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Vec<Event>,
}

impl EventRecorder {
    pub fn new() -> EventRecorder {
        EventRecorder::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    fn push(&mut self, event: Event) -> Result<()> {
        self.events.push(event);
        Ok(())
    }
}

impl ModuleVisitor for EventRecorder {
    fn visit_header(&mut self, version: u32) -> Result<()> {
        self.push(Event::Header { version })
    }

    fn visit_custom(&mut self, name: &str, payload: &[u8]) -> Result<()> {
        self.push(Event::Custom {
            name: name.to_string(),
            payload: payload.to_vec(),
        })
    }

    fn visit_types(&mut self) -> Result<Option<&mut dyn TypesVisitor>> {
        self.push(Event::Types)?;
        Ok(Some(self))
    }

    fn visit_imports(&mut self) -> Result<Option<&mut dyn ImportsVisitor>> {
        self.push(Event::Imports)?;
        Ok(Some(self))
    }

    fn visit_funcs(&mut self) -> Result<Option<&mut dyn FunctionsVisitor>> {
        self.push(Event::Funcs)?;
        Ok(Some(self))
    }

    fn visit_tables(&mut self) -> Result<Option<&mut dyn TablesVisitor>> {
        self.push(Event::Tables)?;
        Ok(Some(self))
    }

    fn visit_mems(&mut self) -> Result<Option<&mut dyn MemoriesVisitor>> {
        self.push(Event::Mems)?;
        Ok(Some(self))
    }

    fn visit_globals(&mut self) -> Result<Option<&mut dyn GlobalsVisitor>> {
        self.push(Event::Globals)?;
        Ok(Some(self))
    }

    fn visit_exports(&mut self) -> Result<Option<&mut dyn ExportsVisitor>> {
        self.push(Event::Exports)?;
        Ok(Some(self))
    }

    fn visit_start(&mut self, func: u32) -> Result<()> {
        self.push(Event::Start { func })
    }

    fn visit_elems(&mut self) -> Result<Option<&mut dyn ElementSegmentsVisitor>> {
        self.push(Event::Elems)?;
        Ok(Some(self))
    }

    fn visit_data_count(&mut self, count: u32) -> Result<()> {
        self.push(Event::DataCount { count })
    }

    fn visit_code(&mut self) -> Result<Option<&mut dyn CodesVisitor>> {
        self.push(Event::Code)?;
        Ok(Some(self))
    }

    fn visit_datas(&mut self) -> Result<Option<&mut dyn DataSegmentsVisitor>> {
        self.push(Event::Datas)?;
        Ok(Some(self))
    }

    fn visit_end(&mut self) -> Result<()> {
        self.push(Event::End)
    }
}

impl TypesVisitor for EventRecorder {
    fn visit_func_type(&mut self, params: &[ValueType], results: &[ValueType]) -> Result<()> {
        self.push(Event::FuncType {
            params: params.to_vec(),
            results: results.to_vec(),
        })
    }

    fn visit_end(&mut self) -> Result<()> {
        self.push(Event::End)
    }
}

impl ImportsVisitor for EventRecorder {
    fn visit_func_import(&mut self, module: &str, name: &str, type_index: u32) -> Result<()> {
        self.push(Event::FuncImport {
            module: module.to_string(),
            name: name.to_string(),
            type_index,
        })
    }

    fn visit_table_import(&mut self, module: &str, name: &str, table: TableType) -> Result<()> {
        self.push(Event::TableImport {
            module: module.to_string(),
            name: name.to_string(),
            table,
        })
    }

    fn visit_mem_import(&mut self, module: &str, name: &str, limits: Limits) -> Result<()> {
        self.push(Event::MemImport {
            module: module.to_string(),
            name: name.to_string(),
            limits,
        })
    }

    fn visit_global_import(&mut self, module: &str, name: &str, global: GlobalType) -> Result<()> {
        self.push(Event::GlobalImport {
            module: module.to_string(),
            name: name.to_string(),
            global,
        })
    }

    fn visit_end(&mut self) -> Result<()> {
        self.push(Event::End)
    }
}

impl FunctionsVisitor for EventRecorder {
    fn visit_func(&mut self, type_index: u32) -> Result<()> {
        self.push(Event::Func { type_index })
    }

    fn visit_end(&mut self) -> Result<()> {
        self.push(Event::End)
    }
}

impl TablesVisitor for EventRecorder {
    fn visit_table(&mut self, table: TableType) -> Result<()> {
        self.push(Event::Table { table })
    }

    fn visit_end(&mut self) -> Result<()> {
        self.push(Event::End)
    }
}

impl MemoriesVisitor for EventRecorder {
    fn visit_memory(&mut self, limits: Limits) -> Result<()> {
        self.push(Event::Memory { limits })
    }

    fn visit_end(&mut self) -> Result<()> {
        self.push(Event::End)
    }
}

impl GlobalsVisitor for EventRecorder {
    fn visit_global(&mut self, global: GlobalType) -> Result<Option<&mut dyn ExprVisitor>> {
        self.push(Event::Global { global })?;
        Ok(Some(self))
    }

    fn visit_end(&mut self) -> Result<()> {
        self.push(Event::End)
    }
}

impl ExportsVisitor for EventRecorder {
    fn visit_export(&mut self, name: &str, kind: ExternalKind, index: u32) -> Result<()> {
        self.push(Event::Export {
            name: name.to_string(),
            kind,
            index,
        })
    }

    fn visit_end(&mut self) -> Result<()> {
        self.push(Event::End)
    }
}

impl ElementSegmentsVisitor for EventRecorder {
    fn visit_elem(&mut self) -> Result<Option<&mut dyn ElementVisitor>> {
        self.push(Event::Elem)?;
        Ok(Some(self))
    }

    fn visit_end(&mut self) -> Result<()> {
        self.push(Event::End)
    }
}

impl ElementVisitor for EventRecorder {
    fn visit_passive(&mut self) -> Result<()> {
        self.push(Event::ElemPassive)
    }

    fn visit_declarative(&mut self) -> Result<()> {
        self.push(Event::ElemDeclarative)
    }

    fn visit_active(&mut self, table: u32) -> Result<Option<&mut dyn ExprVisitor>> {
        self.push(Event::ElemActive { table })?;
        Ok(Some(self))
    }

    fn visit_type(&mut self, elem_type: ValueType) -> Result<()> {
        self.push(Event::ElemType { elem_type })
    }

    fn visit_func_indices(&mut self, funcs: &[u32]) -> Result<()> {
        self.push(Event::ElemFuncIndices {
            funcs: funcs.to_vec(),
        })
    }

    fn visit_init(&mut self) -> Result<Option<&mut dyn ExprVisitor>> {
        self.push(Event::ElemInit)?;
        Ok(Some(self))
    }

    fn visit_end(&mut self) -> Result<()> {
        self.push(Event::End)
    }
}

impl CodesVisitor for EventRecorder {
    fn visit_code(&mut self, locals: &[ValueType]) -> Result<Option<&mut dyn ExprVisitor>> {
        self.push(Event::Body {
            locals: locals.to_vec(),
        })?;
        Ok(Some(self))
    }

    fn visit_end(&mut self) -> Result<()> {
        self.push(Event::End)
    }
}

impl DataSegmentsVisitor for EventRecorder {
    fn visit_data(&mut self) -> Result<Option<&mut dyn DataVisitor>> {
        self.push(Event::Data)?;
        Ok(Some(self))
    }

    fn visit_end(&mut self) -> Result<()> {
        self.push(Event::End)
    }
}

impl DataVisitor for EventRecorder {
    fn visit_passive(&mut self) -> Result<()> {
        self.push(Event::DataPassive)
    }

    fn visit_active(&mut self, memory: u32) -> Result<Option<&mut dyn ExprVisitor>> {
        self.push(Event::DataActive { memory })?;
        Ok(Some(self))
    }

    fn visit_init(&mut self, bytes: &[u8]) -> Result<()> {
        self.push(Event::DataInit {
            bytes: bytes.to_vec(),
        })
    }

    fn visit_end(&mut self) -> Result<()> {
        self.push(Event::End)
    }
}

impl ExprVisitor for EventRecorder {
    fn visit_insn(&mut self, op: Opcode) -> Result<()> {
        self.push(Event::Insn { op })
    }

    fn visit_const(&mut self, value: Const) -> Result<()> {
        self.push(Event::Const { value })
    }

    fn visit_ref_null(&mut self, ref_type: ValueType) -> Result<()> {
        self.push(Event::RefNull { ref_type })
    }

    fn visit_ref_func(&mut self, func: u32) -> Result<()> {
        self.push(Event::RefFunc { func })
    }

    fn visit_select_typed(&mut self, types: &[ValueType]) -> Result<()> {
        self.push(Event::SelectTyped {
            types: types.to_vec(),
        })
    }

    fn visit_variable(&mut self, op: Opcode, index: u32) -> Result<()> {
        self.push(Event::Variable { op, index })
    }

    fn visit_table(&mut self, op: Opcode, index: u32) -> Result<()> {
        self.push(Event::TableInsn { op, index })
    }

    fn visit_table_pair(&mut self, op: Opcode, first: u32, second: u32) -> Result<()> {
        self.push(Event::TablePair { op, first, second })
    }

    fn visit_mem(&mut self, op: Opcode, memarg: MemArg) -> Result<()> {
        self.push(Event::Mem { op, memarg })
    }

    fn visit_mem_lane(&mut self, op: Opcode, memarg: MemArg, lane: u8) -> Result<()> {
        self.push(Event::MemLane { op, memarg, lane })
    }

    fn visit_indexed_mem(&mut self, op: Opcode, data: u32) -> Result<()> {
        self.push(Event::IndexedMem { op, data })
    }

    fn visit_block(&mut self, op: Opcode, block_type: BlockType) -> Result<()> {
        self.push(Event::Block { op, block_type })
    }

    fn visit_else(&mut self) -> Result<()> {
        self.push(Event::Else)
    }

    fn visit_end_insn(&mut self) -> Result<()> {
        self.push(Event::EndInsn)
    }

    fn visit_break(&mut self, op: Opcode, label: u32) -> Result<()> {
        self.push(Event::Break { op, label })
    }

    fn visit_br_table(&mut self, labels: &[u32], default: u32) -> Result<()> {
        self.push(Event::BrTable {
            labels: labels.to_vec(),
            default,
        })
    }

    fn visit_call(&mut self, func: u32) -> Result<()> {
        self.push(Event::Call { func })
    }

    fn visit_call_indirect(&mut self, table: u32, type_index: u32) -> Result<()> {
        self.push(Event::CallIndirect { table, type_index })
    }

    fn visit_lane(&mut self, op: Opcode, lane: u8) -> Result<()> {
        self.push(Event::Lane { op, lane })
    }

    fn visit_shuffle(&mut self, lanes: [u8; 16]) -> Result<()> {
        self.push(Event::Shuffle { lanes })
    }

    fn visit_end(&mut self) -> Result<()> {
        self.push(Event::End)
    }
}

/// Feeds a recorded log to `visitor`, call for call.
///
/// Scopes the visitor declines are skipped up to their closing `End`. A log
/// that does not follow the protocol's nesting fails with
/// `MalformedEncoding`, whose offset is the index of the offending event.
pub fn replay(events: &[Event], visitor: &mut dyn ModuleVisitor) -> Result<()> {
    Player { events, pos: 0 }.module(visitor)
}

struct Player<'e> {
    events: &'e [Event],
    pos: usize,
}

impl<'e> Player<'e> {
    fn next(&mut self) -> Result<&'e Event> {
        let event = self
            .events
            .get(self.pos)
            .ok_or_else(|| Error::malformed(self.pos, "event log ended inside a scope"))?;
        self.pos += 1;
        Ok(event)
    }

    fn unexpected(&self, event: &Event) -> Error {
        Error::malformed(self.pos - 1, format!("unexpected event {:?}", event))
    }

    /// Skips the remainder of a scope whose opening event was just consumed.
    fn skip_scope(&mut self) -> Result<()> {
        let mut depth = 1;
        while depth > 0 {
            match self.next()? {
                Event::End => depth -= 1,
                event if event.opens_scope() => depth += 1,
                _ => {}
            }
        }
        Ok(())
    }

    fn module(&mut self, v: &mut dyn ModuleVisitor) -> Result<()> {
        loop {
            let event = self.next()?;
            match event {
                Event::Header { version } => v.visit_header(*version)?,
                Event::Custom { name, payload } => v.visit_custom(name, payload)?,
                Event::Types => match v.visit_types()? {
                    Some(t) => self.types(t)?,
                    None => self.skip_scope()?,
                },
                Event::Imports => match v.visit_imports()? {
                    Some(i) => self.imports(i)?,
                    None => self.skip_scope()?,
                },
                Event::Funcs => match v.visit_funcs()? {
                    Some(f) => self.funcs(f)?,
                    None => self.skip_scope()?,
                },
                Event::Tables => match v.visit_tables()? {
                    Some(t) => self.tables(t)?,
                    None => self.skip_scope()?,
                },
                Event::Mems => match v.visit_mems()? {
                    Some(m) => self.mems(m)?,
                    None => self.skip_scope()?,
                },
                Event::Globals => match v.visit_globals()? {
                    Some(g) => self.globals(g)?,
                    None => self.skip_scope()?,
                },
                Event::Exports => match v.visit_exports()? {
                    Some(e) => self.exports(e)?,
                    None => self.skip_scope()?,
                },
                Event::Start { func } => v.visit_start(*func)?,
                Event::Elems => match v.visit_elems()? {
                    Some(e) => self.elems(e)?,
                    None => self.skip_scope()?,
                },
                Event::DataCount { count } => v.visit_data_count(*count)?,
                Event::Code => match v.visit_code()? {
                    Some(c) => self.codes(c)?,
                    None => self.skip_scope()?,
                },
                Event::Datas => match v.visit_datas()? {
                    Some(d) => self.datas(d)?,
                    None => self.skip_scope()?,
                },
                Event::End => {
                    if let Some(extra) = self.events.get(self.pos) {
                        return Err(Error::malformed(
                            self.pos,
                            format!("event {:?} after the end of the module", extra),
                        ));
                    }
                    return v.visit_end();
                }
                other => return Err(self.unexpected(other)),
            }
        }
    }

    fn types(&mut self, v: &mut dyn TypesVisitor) -> Result<()> {
        loop {
            match self.next()? {
                Event::FuncType { params, results } => v.visit_func_type(params, results)?,
                Event::End => return v.visit_end(),
                other => return Err(self.unexpected(other)),
            }
        }
    }

    fn imports(&mut self, v: &mut dyn ImportsVisitor) -> Result<()> {
        loop {
            match self.next()? {
                Event::FuncImport {
                    module,
                    name,
                    type_index,
                } => v.visit_func_import(module, name, *type_index)?,
                Event::TableImport { module, name, table } => v.visit_table_import(module, name, *table)?,
                Event::MemImport { module, name, limits } => v.visit_mem_import(module, name, *limits)?,
                Event::GlobalImport { module, name, global } => {
                    v.visit_global_import(module, name, *global)?
                }
                Event::End => return v.visit_end(),
                other => return Err(self.unexpected(other)),
            }
        }
    }

    fn funcs(&mut self, v: &mut dyn FunctionsVisitor) -> Result<()> {
        loop {
            match self.next()? {
                Event::Func { type_index } => v.visit_func(*type_index)?,
                Event::End => return v.visit_end(),
                other => return Err(self.unexpected(other)),
            }
        }
    }

    fn tables(&mut self, v: &mut dyn TablesVisitor) -> Result<()> {
        loop {
            match self.next()? {
                Event::Table { table } => v.visit_table(*table)?,
                Event::End => return v.visit_end(),
                other => return Err(self.unexpected(other)),
            }
        }
    }

    fn mems(&mut self, v: &mut dyn MemoriesVisitor) -> Result<()> {
        loop {
            match self.next()? {
                Event::Memory { limits } => v.visit_memory(*limits)?,
                Event::End => return v.visit_end(),
                other => return Err(self.unexpected(other)),
            }
        }
    }

    fn globals(&mut self, v: &mut dyn GlobalsVisitor) -> Result<()> {
        loop {
            match self.next()? {
                Event::Global { global } => match v.visit_global(*global)? {
                    Some(e) => self.expr(e)?,
                    None => self.skip_scope()?,
                },
                Event::End => return v.visit_end(),
                other => return Err(self.unexpected(other)),
            }
        }
    }

    fn exports(&mut self, v: &mut dyn ExportsVisitor) -> Result<()> {
        loop {
            match self.next()? {
                Event::Export { name, kind, index } => v.visit_export(name, *kind, *index)?,
                Event::End => return v.visit_end(),
                other => return Err(self.unexpected(other)),
            }
        }
    }

    fn elems(&mut self, v: &mut dyn ElementSegmentsVisitor) -> Result<()> {
        loop {
            match self.next()? {
                Event::Elem => match v.visit_elem()? {
                    Some(e) => self.elem(e)?,
                    None => self.skip_scope()?,
                },
                Event::End => return v.visit_end(),
                other => return Err(self.unexpected(other)),
            }
        }
    }

    fn elem(&mut self, v: &mut dyn ElementVisitor) -> Result<()> {
        loop {
            match self.next()? {
                Event::ElemPassive => v.visit_passive()?,
                Event::ElemDeclarative => v.visit_declarative()?,
                Event::ElemActive { table } => match v.visit_active(*table)? {
                    Some(e) => self.expr(e)?,
                    None => self.skip_scope()?,
                },
                Event::ElemType { elem_type } => v.visit_type(*elem_type)?,
                Event::ElemFuncIndices { funcs } => v.visit_func_indices(funcs)?,
                Event::ElemInit => match v.visit_init()? {
                    Some(e) => self.expr(e)?,
                    None => self.skip_scope()?,
                },
                Event::End => return v.visit_end(),
                other => return Err(self.unexpected(other)),
            }
        }
    }

    fn codes(&mut self, v: &mut dyn CodesVisitor) -> Result<()> {
        loop {
            match self.next()? {
                Event::Body { locals } => match v.visit_code(locals)? {
                    Some(e) => self.expr(e)?,
                    None => self.skip_scope()?,
                },
                Event::End => return v.visit_end(),
                other => return Err(self.unexpected(other)),
            }
        }
    }

    fn datas(&mut self, v: &mut dyn DataSegmentsVisitor) -> Result<()> {
        loop {
            match self.next()? {
                Event::Data => match v.visit_data()? {
                    Some(d) => self.data(d)?,
                    None => self.skip_scope()?,
                },
                Event::End => return v.visit_end(),
                other => return Err(self.unexpected(other)),
            }
        }
    }

    fn data(&mut self, v: &mut dyn DataVisitor) -> Result<()> {
        loop {
            match self.next()? {
                Event::DataPassive => v.visit_passive()?,
                Event::DataActive { memory } => match v.visit_active(*memory)? {
                    Some(e) => self.expr(e)?,
                    None => self.skip_scope()?,
                },
                Event::DataInit { bytes } => v.visit_init(bytes)?,
                Event::End => return v.visit_end(),
                other => return Err(self.unexpected(other)),
            }
        }
    }

    fn expr(&mut self, v: &mut dyn ExprVisitor) -> Result<()> {
        loop {
            match self.next()? {
                Event::Insn { op } => v.visit_insn(*op)?,
                Event::Const { value } => v.visit_const(*value)?,
                Event::RefNull { ref_type } => v.visit_ref_null(*ref_type)?,
                Event::RefFunc { func } => v.visit_ref_func(*func)?,
                Event::SelectTyped { types } => v.visit_select_typed(types)?,
                Event::Variable { op, index } => v.visit_variable(*op, *index)?,
                Event::TableInsn { op, index } => v.visit_table(*op, *index)?,
                Event::TablePair { op, first, second } => v.visit_table_pair(*op, *first, *second)?,
                Event::Mem { op, memarg } => v.visit_mem(*op, *memarg)?,
                Event::MemLane { op, memarg, lane } => v.visit_mem_lane(*op, *memarg, *lane)?,
                Event::IndexedMem { op, data } => v.visit_indexed_mem(*op, *data)?,
                Event::Block { op, block_type } => v.visit_block(*op, *block_type)?,
                Event::Else => v.visit_else()?,
                Event::EndInsn => v.visit_end_insn()?,
                Event::Break { op, label } => v.visit_break(*op, *label)?,
                Event::BrTable { labels, default } => v.visit_br_table(labels, *default)?,
                Event::Call { func } => v.visit_call(*func)?,
                Event::CallIndirect { table, type_index } => v.visit_call_indirect(*table, *type_index)?,
                Event::Lane { op, lane } => v.visit_lane(*op, *lane)?,
                Event::Shuffle { lanes } => v.visit_shuffle(*lanes)?,
                Event::End => return v.visit_end(),
                other => return Err(self.unexpected(other)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::parser::opcodes;
    use crate::parser::read;

    // (func (result i32) i32.const 7 block nop end) with one custom section
    const MODULE: &str = "0061736d01000000\
                          010501600001 7f\
                          03020100\
                          0a090107004107024001 0b0b\
                          0003016e6f";

    fn bytes() -> Vec<u8> {
        hex::decode(MODULE.replace(' ', "")).unwrap()
    }

    #[test]
    fn test_record() {
        let mut recorder = EventRecorder::new();
        read(&bytes(), &mut recorder).unwrap();
        let events = recorder.into_events();
        assert_eq!(events[0], Event::Header { version: 1 });
        assert_eq!(events[1], Event::Types);
        assert_eq!(
            events[2],
            Event::FuncType {
                params: vec![],
                results: vec![ValueType::I32]
            }
        );
        let body: Vec<_> = events
            .iter()
            .skip_while(|e| !matches!(e, Event::Body { .. }))
            .take(6)
            .cloned()
            .collect();
        assert_eq!(
            body,
            vec![
                Event::Body { locals: vec![] },
                Event::Const { value: Const::I32(7) },
                Event::Block {
                    op: opcodes::BLOCK,
                    block_type: BlockType::Empty
                },
                Event::Insn { op: opcodes::NOP },
                Event::EndInsn,
                Event::End,
            ]
        );
        assert_eq!(
            events[events.len() - 2],
            Event::Custom {
                name: "n".to_string(),
                payload: b"o".to_vec()
            }
        );
        assert_eq!(events.last(), Some(&Event::End));
    }

    #[test]
    fn test_replay_reproduces_log() {
        let mut recorder = EventRecorder::new();
        read(&bytes(), &mut recorder).unwrap();
        let events = recorder.into_events();

        let mut again = EventRecorder::new();
        replay(&events, &mut again).unwrap();
        assert_eq!(again.events(), &events[..]);
    }

    #[test]
    fn test_json() {
        let mut recorder = EventRecorder::new();
        read(&bytes(), &mut recorder).unwrap();
        let json = serde_json::to_string(recorder.events()).unwrap();
        assert!(json.starts_with(r#"[{"event":"header","version":1}"#));
        let back: Vec<Event> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, recorder.into_events());
    }

    #[test]
    fn test_replay_skips_declined_scopes() {
        struct OnlyEnd(bool);
        impl ModuleVisitor for OnlyEnd {
            fn visit_end(&mut self) -> Result<()> {
                self.0 = true;
                Ok(())
            }
        }

        let mut recorder = EventRecorder::new();
        read(&bytes(), &mut recorder).unwrap();
        let mut v = OnlyEnd(false);
        replay(recorder.events(), &mut v).unwrap();
        assert!(v.0);
    }

    #[test]
    fn test_replay_rejects_bad_nesting() {
        let events = vec![Event::Header { version: 1 }, Event::Types, Event::Insn { op: opcodes::NOP }];
        let err = replay(&events, &mut EventRecorder::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedEncoding);
        assert_eq!(err.offset(), Some(2));

        let events = vec![Event::Header { version: 1 }, Event::Types];
        let err = replay(&events, &mut EventRecorder::new()).unwrap_err();
        assert_eq!(err.offset(), Some(2));

        let events = vec![Event::End, Event::End];
        let err = replay(&events, &mut EventRecorder::new()).unwrap_err();
        assert_eq!(err.offset(), Some(1));
    }
}
