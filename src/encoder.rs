//! Writes a module in the binary format from visitor calls.
//!
//! [`ModuleWriter`] is the inverse of [`crate::parser::ModuleReader`]: fed the
//! calls a reader makes, it produces the module back. It implements
//! [`ModuleVisitor`] and hands out one writer per section; each section writer
//! buffers its contents and counts its entries, and [`ModuleWriter::finish`]
//! frames the sections in canonical order.
//!
//! # Binary format overview
//!
//! A module begins with a magic number (`\0asm`) and version (1), followed by
//! sections in a fixed order. Each section is encoded as:
//!
//! ```text
//! section_id: u8 | byte_length: vu32 | contents: byte*
//! ```
//!
//! Every section that was visited is written, even when it has no entries,
//! and all integers use the minimal LEB128 encoding. A custom section is
//! written after the standard section that was visited just before it.
//!
//! # Example
//!
//! ```
//! use kasm_visit::encoder::ModuleWriter;
//! use kasm_visit::parser;
//!
//! let bytes = hex::decode("0061736d01000000010401600000").unwrap();
//! let mut writer = ModuleWriter::new();
//! parser::read(&bytes, &mut writer)?;
//! assert_eq!(writer.finish()?, bytes);
//! # Ok::<(), kasm_visit::error::Error>(())
//! ```
use crate::error::{Error, Location, Result};
use crate::parser::attributes::{self, Immediates, InsnAttributes};
use crate::parser::encoding::*;
use crate::parser::opcodes::{self, Opcode};
use crate::parser::types::{
    BlockType, Const, ExternalKind, GlobalType, Limits, MemArg, TableType, ValueType,
};
use crate::parser::visitor::*;
use tracing::trace;

// ===========================================================================
// Module writer
// ===========================================================================

pub struct ModuleWriter {
    version: u32,
    /// Standard section ids in the order they were visited.
    visited: Vec<u8>,
    customs: Vec<CustomSection>,
    ended: bool,

    types: TypesWriter,
    imports: ImportsWriter,
    funcs: FunctionsWriter,
    tables: TablesWriter,
    mems: MemoriesWriter,
    globals: GlobalsWriter,
    exports: ExportsWriter,
    start: u32,
    elems: ElementSegmentsWriter,
    data_count: u32,
    codes: CodesWriter,
    datas: DataSegmentsWriter,
}

struct CustomSection {
    /// The standard section visited before this one, if any.
    after: Option<u8>,
    name: String,
    payload: Vec<u8>,
}

impl Default for ModuleWriter {
    fn default() -> Self {
        ModuleWriter::new()
    }
}

impl ModuleWriter {
    pub fn new() -> ModuleWriter {
        ModuleWriter {
            version: VERSION,
            visited: Vec::new(),
            customs: Vec::new(),
            ended: false,
            types: TypesWriter::default(),
            imports: ImportsWriter::default(),
            funcs: FunctionsWriter::default(),
            tables: TablesWriter::default(),
            mems: MemoriesWriter::default(),
            globals: GlobalsWriter::default(),
            exports: ExportsWriter::default(),
            start: 0,
            elems: ElementSegmentsWriter::default(),
            data_count: 0,
            codes: CodesWriter::default(),
            datas: DataSegmentsWriter::default(),
        }
    }

    /// Frames the buffered sections and returns the module bytes.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        if !self.ended {
            return Err(Error::invalid(Location::Module, "module end was not visited"));
        }
        self.codes.flush();

        let mut ids = self.visited.clone();
        ids.sort_by_key(|id| section_rank(*id));

        let mut buf = Vec::new();
        write_u32(&mut buf, MAGIC);
        write_u32(&mut buf, self.version);
        self.write_customs(&mut buf, None);
        for id in ids {
            let contents = self.section_contents(id);
            trace!(id, section = section_name(id), len = contents.len(), "writing section");
            write_section(&mut buf, id, &contents);
            self.write_customs(&mut buf, Some(id));
        }
        Ok(buf)
    }

    fn write_customs(&self, buf: &mut Vec<u8>, after: Option<u8>) {
        for custom in self.customs.iter().filter(|c| c.after == after) {
            let mut contents = Vec::new();
            write_name(&mut contents, &custom.name);
            contents.extend_from_slice(&custom.payload);
            trace!(name = %custom.name, len = contents.len(), "writing custom section");
            write_section(buf, SECTION_CUSTOM, &contents);
        }
    }

    fn section_contents(&self, id: u8) -> Vec<u8> {
        let mut contents = Vec::new();
        match id {
            SECTION_TYPE => counted(&mut contents, self.types.count, &self.types.contents),
            SECTION_IMPORT => counted(&mut contents, self.imports.count, &self.imports.contents),
            SECTION_FUNCTION => counted(&mut contents, self.funcs.count, &self.funcs.contents),
            SECTION_TABLE => counted(&mut contents, self.tables.count, &self.tables.contents),
            SECTION_MEMORY => counted(&mut contents, self.mems.count, &self.mems.contents),
            SECTION_GLOBAL => counted(&mut contents, self.globals.count, &self.globals.out.buf),
            SECTION_EXPORT => counted(&mut contents, self.exports.count, &self.exports.contents),
            SECTION_START => write_vu32(&mut contents, self.start),
            SECTION_ELEMENT => counted(&mut contents, self.elems.count, &self.elems.segment.contents),
            SECTION_DATA_COUNT => write_vu32(&mut contents, self.data_count),
            SECTION_CODE => counted(&mut contents, self.codes.count, &self.codes.contents),
            SECTION_DATA => counted(&mut contents, self.datas.count, &self.datas.segment.out.buf),
            _ => {}
        }
        contents
    }

    /// Records the visit of a standard section; each may be visited once.
    /// Nothing has been written yet when a duplicate arrives, so the offset
    /// it reports is the number of sections visited before it.
    fn open(&mut self, id: u8) -> Result<()> {
        if self.visited.contains(&id) {
            return Err(Error::DuplicateOrMisorderedSection {
                section: id,
                offset: self.visited.len(),
            });
        }
        self.visited.push(id);
        Ok(())
    }
}

impl ModuleVisitor for ModuleWriter {
    fn visit_header(&mut self, version: u32) -> Result<()> {
        self.version = version;
        Ok(())
    }

    fn visit_custom(&mut self, name: &str, payload: &[u8]) -> Result<()> {
        self.customs.push(CustomSection {
            after: self.visited.last().copied(),
            name: name.to_string(),
            payload: payload.to_vec(),
        });
        Ok(())
    }

    fn visit_types(&mut self) -> Result<Option<&mut dyn TypesVisitor>> {
        self.open(SECTION_TYPE)?;
        Ok(Some(&mut self.types))
    }

    fn visit_imports(&mut self) -> Result<Option<&mut dyn ImportsVisitor>> {
        self.open(SECTION_IMPORT)?;
        Ok(Some(&mut self.imports))
    }

    fn visit_funcs(&mut self) -> Result<Option<&mut dyn FunctionsVisitor>> {
        self.open(SECTION_FUNCTION)?;
        Ok(Some(&mut self.funcs))
    }

    fn visit_tables(&mut self) -> Result<Option<&mut dyn TablesVisitor>> {
        self.open(SECTION_TABLE)?;
        Ok(Some(&mut self.tables))
    }

    fn visit_mems(&mut self) -> Result<Option<&mut dyn MemoriesVisitor>> {
        self.open(SECTION_MEMORY)?;
        Ok(Some(&mut self.mems))
    }

    fn visit_globals(&mut self) -> Result<Option<&mut dyn GlobalsVisitor>> {
        self.open(SECTION_GLOBAL)?;
        Ok(Some(&mut self.globals))
    }

    fn visit_exports(&mut self) -> Result<Option<&mut dyn ExportsVisitor>> {
        self.open(SECTION_EXPORT)?;
        Ok(Some(&mut self.exports))
    }

    fn visit_start(&mut self, func: u32) -> Result<()> {
        self.open(SECTION_START)?;
        self.start = func;
        Ok(())
    }

    fn visit_elems(&mut self) -> Result<Option<&mut dyn ElementSegmentsVisitor>> {
        self.open(SECTION_ELEMENT)?;
        Ok(Some(&mut self.elems))
    }

    fn visit_data_count(&mut self, count: u32) -> Result<()> {
        self.open(SECTION_DATA_COUNT)?;
        self.data_count = count;
        Ok(())
    }

    fn visit_code(&mut self) -> Result<Option<&mut dyn CodesVisitor>> {
        self.open(SECTION_CODE)?;
        Ok(Some(&mut self.codes))
    }

    fn visit_datas(&mut self) -> Result<Option<&mut dyn DataSegmentsVisitor>> {
        self.open(SECTION_DATA)?;
        Ok(Some(&mut self.datas))
    }

    fn visit_end(&mut self) -> Result<()> {
        self.ended = true;
        Ok(())
    }
}

// ===========================================================================
// Section writers (in wire order)
// ===========================================================================

/// ```text
/// typesec  ::= section_1(vec(functype))
/// functype ::= 0x60 vec(valtype) vec(valtype)
/// ```
#[derive(Default)]
pub struct TypesWriter {
    count: u32,
    contents: Vec<u8>,
}

impl TypesVisitor for TypesWriter {
    fn visit_func_type(&mut self, params: &[ValueType], results: &[ValueType]) -> Result<()> {
        self.count += 1;
        self.contents.push(TYPE_FUNC);
        emit_value_types(&mut self.contents, params);
        emit_value_types(&mut self.contents, results);
        Ok(())
    }
}

/// ```text
/// importsec  ::= section_2(vec(import))
/// import     ::= module:name name:name importdesc
/// importdesc ::= 0x00 typeidx | 0x01 tabletype | 0x02 memtype | 0x03 globaltype
/// ```
#[derive(Default)]
pub struct ImportsWriter {
    count: u32,
    contents: Vec<u8>,
}

impl ImportsWriter {
    fn header(&mut self, module: &str, name: &str, desc: u8) {
        self.count += 1;
        write_name(&mut self.contents, module);
        write_name(&mut self.contents, name);
        self.contents.push(desc);
    }
}

impl ImportsVisitor for ImportsWriter {
    fn visit_func_import(&mut self, module: &str, name: &str, type_index: u32) -> Result<()> {
        self.header(module, name, DESC_FUNC);
        write_vu32(&mut self.contents, type_index);
        Ok(())
    }

    fn visit_table_import(&mut self, module: &str, name: &str, table: TableType) -> Result<()> {
        self.header(module, name, DESC_TABLE);
        emit_table_type(&mut self.contents, &table);
        Ok(())
    }

    fn visit_mem_import(&mut self, module: &str, name: &str, limits: Limits) -> Result<()> {
        self.header(module, name, DESC_MEMORY);
        emit_limits(&mut self.contents, &limits);
        Ok(())
    }

    fn visit_global_import(&mut self, module: &str, name: &str, global: GlobalType) -> Result<()> {
        self.header(module, name, DESC_GLOBAL);
        emit_global_type(&mut self.contents, &global);
        Ok(())
    }
}

/// ```text
/// funcsec ::= section_3(vec(typeidx))
/// ```
#[derive(Default)]
pub struct FunctionsWriter {
    count: u32,
    contents: Vec<u8>,
}

impl FunctionsVisitor for FunctionsWriter {
    fn visit_func(&mut self, type_index: u32) -> Result<()> {
        self.count += 1;
        write_vu32(&mut self.contents, type_index);
        Ok(())
    }
}

/// ```text
/// tablesec  ::= section_4(vec(tabletype))
/// tabletype ::= reftype limits
/// ```
#[derive(Default)]
pub struct TablesWriter {
    count: u32,
    contents: Vec<u8>,
}

impl TablesVisitor for TablesWriter {
    fn visit_table(&mut self, table: TableType) -> Result<()> {
        self.count += 1;
        emit_table_type(&mut self.contents, &table);
        Ok(())
    }
}

/// ```text
/// memsec ::= section_5(vec(limits))
/// ```
#[derive(Default)]
pub struct MemoriesWriter {
    count: u32,
    contents: Vec<u8>,
}

impl MemoriesVisitor for MemoriesWriter {
    fn visit_memory(&mut self, limits: Limits) -> Result<()> {
        self.count += 1;
        emit_limits(&mut self.contents, &limits);
        Ok(())
    }
}

/// ```text
/// globalsec  ::= section_6(vec(global))
/// global     ::= globaltype expr
/// ```
///
/// Initializer expressions are written straight into the section contents.
#[derive(Default)]
pub struct GlobalsWriter {
    count: u32,
    out: ExprWriter,
}

impl GlobalsVisitor for GlobalsWriter {
    fn visit_global(&mut self, global: GlobalType) -> Result<Option<&mut dyn ExprVisitor>> {
        self.count += 1;
        emit_global_type(&mut self.out.buf, &global);
        self.out.index = 0;
        Ok(Some(&mut self.out))
    }
}

/// ```text
/// exportsec ::= section_7(vec(export))
/// export    ::= name exportdesc
/// ```
#[derive(Default)]
pub struct ExportsWriter {
    count: u32,
    contents: Vec<u8>,
}

impl ExportsVisitor for ExportsWriter {
    fn visit_export(&mut self, name: &str, kind: ExternalKind, index: u32) -> Result<()> {
        self.count += 1;
        write_name(&mut self.contents, name);
        self.contents.push(kind.byte());
        write_vu32(&mut self.contents, index);
        Ok(())
    }
}

/// ```text
/// elemsec ::= section_9(vec(elem))
/// ```
#[derive(Default)]
pub struct ElementSegmentsWriter {
    count: u32,
    segment: ElementWriter,
}

impl ElementSegmentsVisitor for ElementSegmentsWriter {
    fn visit_elem(&mut self) -> Result<Option<&mut dyn ElementVisitor>> {
        self.count += 1;
        self.segment.begin();
        Ok(Some(&mut self.segment))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementMode {
    Passive,
    Declarative,
    Active(u32),
}

/// Buffers one element segment until its end, since the leading flags depend
/// on everything that follows them.
///
/// The most compact of the eight encodings that can express the segment is
/// chosen: the implicit table 0 forms for funcref segments on table 0, and
/// function indices whenever the segment was given as indices.
pub struct ElementWriter {
    /// The element section contents written so far.
    contents: Vec<u8>,
    mode: ElementMode,
    offset: ExprWriter,
    elem_type: ValueType,
    funcs: Option<Vec<u32>>,
    inits: ExprWriter,
    init_count: u32,
}

impl Default for ElementWriter {
    fn default() -> Self {
        ElementWriter {
            contents: Vec::new(),
            mode: ElementMode::Passive,
            offset: ExprWriter::new(),
            elem_type: ValueType::FuncRef,
            funcs: None,
            inits: ExprWriter::new(),
            init_count: 0,
        }
    }
}

impl ElementWriter {
    fn begin(&mut self) {
        self.mode = ElementMode::Passive;
        self.offset.buf.clear();
        self.offset.index = 0;
        self.elem_type = ValueType::FuncRef;
        self.funcs = None;
        self.inits.buf.clear();
        self.init_count = 0;
    }

    fn flags(&self) -> Result<u32> {
        let funcref = self.elem_type == ValueType::FuncRef;
        if self.funcs.is_some() && !funcref {
            return Err(Error::invalid(
                Location::Module,
                format!("function indices in an element segment of type {}", self.elem_type),
            ));
        }
        let exprs = self.funcs.is_none();
        Ok(match self.mode {
            ElementMode::Active(0) if funcref && !exprs => ELEM_ACTIVE_FUNCS,
            ElementMode::Active(0) if funcref => ELEM_ACTIVE_EXPRS,
            ElementMode::Active(_) if exprs => ELEM_ACTIVE_TABLE_EXPRS,
            ElementMode::Active(_) => ELEM_ACTIVE_TABLE_FUNCS,
            ElementMode::Passive if exprs => ELEM_PASSIVE_EXPRS,
            ElementMode::Passive => ELEM_PASSIVE_FUNCS,
            ElementMode::Declarative if exprs => ELEM_DECLARATIVE_EXPRS,
            ElementMode::Declarative => ELEM_DECLARATIVE_FUNCS,
        })
    }
}

impl ElementVisitor for ElementWriter {
    fn visit_passive(&mut self) -> Result<()> {
        self.mode = ElementMode::Passive;
        Ok(())
    }

    fn visit_declarative(&mut self) -> Result<()> {
        self.mode = ElementMode::Declarative;
        Ok(())
    }

    fn visit_active(&mut self, table: u32) -> Result<Option<&mut dyn ExprVisitor>> {
        self.mode = ElementMode::Active(table);
        Ok(Some(&mut self.offset))
    }

    fn visit_type(&mut self, elem_type: ValueType) -> Result<()> {
        self.elem_type = elem_type;
        Ok(())
    }

    fn visit_func_indices(&mut self, funcs: &[u32]) -> Result<()> {
        self.funcs = Some(funcs.to_vec());
        Ok(())
    }

    fn visit_init(&mut self) -> Result<Option<&mut dyn ExprVisitor>> {
        self.init_count += 1;
        self.inits.index = 0;
        Ok(Some(&mut self.inits))
    }

    fn visit_end(&mut self) -> Result<()> {
        let flags = self.flags()?;
        let out = &mut self.contents;
        write_vu32(out, flags);
        if flags == ELEM_ACTIVE_TABLE_FUNCS || flags == ELEM_ACTIVE_TABLE_EXPRS {
            if let ElementMode::Active(table) = self.mode {
                write_vu32(out, table);
            }
        }
        if let ElementMode::Active(_) = self.mode {
            out.extend_from_slice(&self.offset.buf);
        }
        match flags {
            ELEM_PASSIVE_FUNCS | ELEM_ACTIVE_TABLE_FUNCS | ELEM_DECLARATIVE_FUNCS => out.push(ELEMKIND_FUNCREF),
            ELEM_PASSIVE_EXPRS | ELEM_ACTIVE_TABLE_EXPRS | ELEM_DECLARATIVE_EXPRS => {
                out.push(self.elem_type.byte())
            }
            _ => {}
        }
        match &self.funcs {
            Some(funcs) => {
                write_vu32(out, funcs.len() as u32);
                for func in funcs {
                    write_vu32(out, *func);
                }
            }
            None => {
                write_vu32(out, self.init_count);
                out.extend_from_slice(&self.inits.buf);
            }
        }
        Ok(())
    }
}

/// ```text
/// codesec ::= section_10(vec(code))
/// code    ::= size:u32 vec(locals) expr
/// locals  ::= n:u32 t:valtype
/// ```
///
/// A body is buffered until the next body or the end of the section, when it
/// is written with its size prefix.
#[derive(Default)]
pub struct CodesWriter {
    count: u32,
    contents: Vec<u8>,
    body: ExprWriter,
    pending: bool,
}

impl CodesWriter {
    fn flush(&mut self) {
        if self.pending {
            write_prefixed(&mut self.contents, &self.body.buf);
            self.body.buf.clear();
            self.pending = false;
        }
    }
}

impl CodesVisitor for CodesWriter {
    fn visit_code(&mut self, locals: &[ValueType]) -> Result<Option<&mut dyn ExprVisitor>> {
        self.flush();
        self.count += 1;
        emit_locals(&mut self.body.buf, locals);
        self.body.index = 0;
        self.pending = true;
        Ok(Some(&mut self.body))
    }

    fn visit_end(&mut self) -> Result<()> {
        self.flush();
        Ok(())
    }
}

/// ```text
/// datasec ::= section_11(vec(data))
/// data    ::= 0x00 expr vec(byte)
///           | 0x01 vec(byte)
///           | 0x02 memidx expr vec(byte)
/// ```
#[derive(Default)]
pub struct DataSegmentsWriter {
    count: u32,
    segment: DataWriter,
}

impl DataSegmentsVisitor for DataSegmentsWriter {
    fn visit_data(&mut self) -> Result<Option<&mut dyn DataVisitor>> {
        self.count += 1;
        Ok(Some(&mut self.segment))
    }
}

/// Writes segments straight into the data section contents.
#[derive(Default)]
pub struct DataWriter {
    out: ExprWriter,
}

impl DataVisitor for DataWriter {
    fn visit_passive(&mut self) -> Result<()> {
        write_vu32(&mut self.out.buf, DATA_PASSIVE);
        Ok(())
    }

    fn visit_active(&mut self, memory: u32) -> Result<Option<&mut dyn ExprVisitor>> {
        if memory == 0 {
            write_vu32(&mut self.out.buf, DATA_ACTIVE);
        } else {
            write_vu32(&mut self.out.buf, DATA_ACTIVE_EXPLICIT);
            write_vu32(&mut self.out.buf, memory);
        }
        self.out.index = 0;
        Ok(Some(&mut self.out))
    }

    fn visit_init(&mut self, bytes: &[u8]) -> Result<()> {
        write_u8vec(&mut self.out.buf, bytes);
        Ok(())
    }
}

// ===========================================================================
// Expressions
// ===========================================================================

/// Encodes instructions into a byte buffer.
///
/// Opcodes, immediates and reserved zero bytes are laid out as the attribute
/// table describes; an opcode delivered through a visitor method that does not
/// match its immediates is rejected.
#[derive(Debug, Default)]
pub struct ExprWriter {
    buf: Vec<u8>,
    /// Instructions written to the current expression.
    index: usize,
}

impl ExprWriter {
    pub fn new() -> ExprWriter {
        ExprWriter::default()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn emit(&mut self, op: Opcode, expected: Immediates) -> Result<&'static InsnAttributes> {
        let location = Location::Expression { index: self.index };
        let attrs = attributes::lookup(op)
            .ok_or_else(|| Error::invalid(location, format!("unknown opcode {}", op)))?;
        if attrs.immediates != expected {
            return Err(Error::invalid(
                location,
                format!("{} takes {:?} immediates, not {:?}", op, attrs.immediates, expected),
            ));
        }
        emit_opcode(&mut self.buf, op);
        self.index += 1;
        Ok(attrs)
    }

    fn reserved(&mut self, attrs: &InsnAttributes) {
        for _ in 0..attrs.reserved {
            self.buf.push(0x00);
        }
    }
}

impl ExprVisitor for ExprWriter {
    fn visit_insn(&mut self, op: Opcode) -> Result<()> {
        let attrs = self.emit(op, Immediates::Insn)?;
        self.reserved(attrs);
        Ok(())
    }

    fn visit_const(&mut self, value: Const) -> Result<()> {
        match value {
            Const::I32(v) => {
                self.emit(opcodes::I32_CONST, Immediates::Const)?;
                write_vs32(&mut self.buf, v);
            }
            Const::I64(v) => {
                self.emit(opcodes::I64_CONST, Immediates::Const)?;
                write_vs64(&mut self.buf, v);
            }
            Const::F32(v) => {
                self.emit(opcodes::F32_CONST, Immediates::Const)?;
                write_f32(&mut self.buf, v);
            }
            Const::F64(v) => {
                self.emit(opcodes::F64_CONST, Immediates::Const)?;
                write_f64(&mut self.buf, v);
            }
            Const::V128(v) => {
                self.emit(opcodes::V128_CONST, Immediates::Const)?;
                write_v128(&mut self.buf, v);
            }
        }
        Ok(())
    }

    fn visit_ref_null(&mut self, ref_type: ValueType) -> Result<()> {
        self.emit(opcodes::REF_NULL, Immediates::RefNull)?;
        self.buf.push(ref_type.byte());
        Ok(())
    }

    fn visit_ref_func(&mut self, func: u32) -> Result<()> {
        self.emit(opcodes::REF_FUNC, Immediates::RefFunc)?;
        write_vu32(&mut self.buf, func);
        Ok(())
    }

    fn visit_select_typed(&mut self, types: &[ValueType]) -> Result<()> {
        self.emit(opcodes::SELECT_TYPED, Immediates::SelectTyped)?;
        emit_value_types(&mut self.buf, types);
        Ok(())
    }

    fn visit_variable(&mut self, op: Opcode, index: u32) -> Result<()> {
        self.emit(op, Immediates::Variable)?;
        write_vu32(&mut self.buf, index);
        Ok(())
    }

    fn visit_table(&mut self, op: Opcode, index: u32) -> Result<()> {
        self.emit(op, Immediates::Table)?;
        write_vu32(&mut self.buf, index);
        Ok(())
    }

    fn visit_table_pair(&mut self, op: Opcode, first: u32, second: u32) -> Result<()> {
        self.emit(op, Immediates::TablePair)?;
        write_vu32(&mut self.buf, first);
        write_vu32(&mut self.buf, second);
        Ok(())
    }

    fn visit_mem(&mut self, op: Opcode, memarg: MemArg) -> Result<()> {
        self.emit(op, Immediates::Mem)?;
        emit_memarg(&mut self.buf, &memarg);
        Ok(())
    }

    fn visit_mem_lane(&mut self, op: Opcode, memarg: MemArg, lane: u8) -> Result<()> {
        self.emit(op, Immediates::MemLane)?;
        emit_memarg(&mut self.buf, &memarg);
        self.buf.push(lane);
        Ok(())
    }

    fn visit_indexed_mem(&mut self, op: Opcode, data: u32) -> Result<()> {
        let attrs = self.emit(op, Immediates::IndexedMem)?;
        write_vu32(&mut self.buf, data);
        self.reserved(attrs);
        Ok(())
    }

    fn visit_block(&mut self, op: Opcode, block_type: BlockType) -> Result<()> {
        self.emit(op, Immediates::Block)?;
        match block_type {
            BlockType::Empty => self.buf.push(BLOCK_TYPE_EMPTY),
            BlockType::Value(t) => self.buf.push(t.byte()),
            BlockType::FuncType(index) => write_vs33(&mut self.buf, index as i64),
        }
        Ok(())
    }

    fn visit_else(&mut self) -> Result<()> {
        self.emit(opcodes::ELSE, Immediates::Else)?;
        Ok(())
    }

    fn visit_end_insn(&mut self) -> Result<()> {
        self.emit(opcodes::END, Immediates::End)?;
        Ok(())
    }

    fn visit_break(&mut self, op: Opcode, label: u32) -> Result<()> {
        self.emit(op, Immediates::Break)?;
        write_vu32(&mut self.buf, label);
        Ok(())
    }

    fn visit_br_table(&mut self, labels: &[u32], default: u32) -> Result<()> {
        self.emit(opcodes::BR_TABLE, Immediates::BrTable)?;
        write_vu32(&mut self.buf, labels.len() as u32);
        for label in labels {
            write_vu32(&mut self.buf, *label);
        }
        write_vu32(&mut self.buf, default);
        Ok(())
    }

    fn visit_call(&mut self, func: u32) -> Result<()> {
        self.emit(opcodes::CALL, Immediates::Call)?;
        write_vu32(&mut self.buf, func);
        Ok(())
    }

    fn visit_call_indirect(&mut self, table: u32, type_index: u32) -> Result<()> {
        self.emit(opcodes::CALL_INDIRECT, Immediates::CallIndirect)?;
        write_vu32(&mut self.buf, type_index);
        write_vu32(&mut self.buf, table);
        Ok(())
    }

    fn visit_lane(&mut self, op: Opcode, lane: u8) -> Result<()> {
        self.emit(op, Immediates::Lane)?;
        self.buf.push(lane);
        Ok(())
    }

    fn visit_shuffle(&mut self, lanes: [u8; 16]) -> Result<()> {
        self.emit(opcodes::I8X16_SHUFFLE, Immediates::Shuffle)?;
        write_v128(&mut self.buf, lanes);
        Ok(())
    }

    fn visit_end(&mut self) -> Result<()> {
        self.buf.push(OP_END);
        Ok(())
    }
}

// ===========================================================================
// Shared helpers
// ===========================================================================

fn counted(buf: &mut Vec<u8>, count: u32, contents: &[u8]) {
    write_vu32(buf, count);
    buf.extend_from_slice(contents);
}

fn emit_opcode(buf: &mut Vec<u8>, op: Opcode) {
    match op {
        Opcode::Plain(byte) => buf.push(byte),
        Opcode::Misc(sub) | Opcode::Vector(sub) => {
            if let Some(prefix) = op.prefix() {
                buf.push(prefix);
            }
            write_vu32(buf, sub);
        }
    }
}

fn emit_value_types(buf: &mut Vec<u8>, types: &[ValueType]) {
    write_vu32(buf, types.len() as u32);
    buf.extend(types.iter().map(|t| t.byte()));
}

/// Run-length compresses locals into (count, type) groups.
fn emit_locals(buf: &mut Vec<u8>, locals: &[ValueType]) {
    let mut groups: Vec<(u32, ValueType)> = Vec::new();
    for local in locals {
        match groups.last_mut() {
            Some((count, t)) if t == local => *count += 1,
            _ => groups.push((1, *local)),
        }
    }
    write_vu32(buf, groups.len() as u32);
    for (count, t) in groups {
        write_vu32(buf, count);
        buf.push(t.byte());
    }
}

/// ```text
/// limits ::= 0x00 min:u32 | 0x01 min:u32 max:u32
/// ```
fn emit_limits(buf: &mut Vec<u8>, limits: &Limits) {
    match limits.max {
        Some(max) => {
            buf.push(LIMITS_MIN_MAX);
            write_vu32(buf, limits.min);
            write_vu32(buf, max);
        }
        None => {
            buf.push(LIMITS_MIN);
            write_vu32(buf, limits.min);
        }
    }
}

fn emit_table_type(buf: &mut Vec<u8>, table: &TableType) {
    buf.push(table.elem_type.byte());
    emit_limits(buf, &table.limits);
}

fn emit_global_type(buf: &mut Vec<u8>, global: &GlobalType) {
    buf.push(global.value_type.byte());
    buf.push(global.mutable as u8);
}

fn emit_memarg(buf: &mut Vec<u8>, memarg: &MemArg) {
    write_vu32(buf, memarg.align);
    write_vu32(buf, memarg.offset);
}
