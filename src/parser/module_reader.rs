//! Walks a binary module and reports it to a [`ModuleVisitor`].
//!
//! The reader owns section framing. Each section is read through a reader
//! bounded to its declared length, sections must appear in the required
//! order, and a section that does not consume exactly its declared length
//! fails with `SectionLengthMismatch`. The reader does not validate: once the
//! framing is sound every entry is handed to the visitor as decoded.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::parser::attributes::{self, Immediates};
use crate::parser::encoding::*;
use crate::parser::opcodes::{self, Opcode, PREFIX_MISC, PREFIX_VECTOR};
use crate::parser::reader::Reader;
use crate::parser::types::{
    BlockType, Const, ExternalKind, GlobalType, Limits, MemArg, TableType, ValueType,
};
use crate::parser::visitor::*;
use tracing::{debug, trace};

pub struct ModuleReader<'a> {
    bytes: &'a [u8],
    config: Config,
}

/// Entry counts needed for the cross-section consistency checks, gathered
/// whether or not the visitor looks at the sections themselves.
#[derive(Default)]
struct Counts {
    functions: Option<u32>,
    codes: Option<u32>,
    data_count: Option<u32>,
    datas: Option<u32>,
}

struct SkipElement;

impl ElementVisitor for SkipElement {}

struct SkipData;

impl DataVisitor for SkipData {}

impl<'a> ModuleReader<'a> {
    pub fn new(bytes: &'a [u8]) -> ModuleReader<'a> {
        ModuleReader {
            bytes,
            config: Config::default(),
        }
    }

    pub fn with_config(bytes: &'a [u8], config: &Config) -> ModuleReader<'a> {
        ModuleReader {
            bytes,
            config: config.clone(),
        }
    }

    pub fn accept(&self, visitor: &mut dyn ModuleVisitor) -> Result<()> {
        let mut reader = Reader::new(self.bytes).with_strict_leb128(self.config.strict_leb128);

        if reader.read_u32()? != MAGIC {
            return Err(Error::malformed(0, "magic header not detected"));
        }
        let version = reader.read_u32()?;
        if version != VERSION {
            return Err(Error::malformed(4, format!("unknown binary version {}", version)));
        }
        visitor.visit_header(version)?;

        let mut counts = Counts::default();
        let mut last_rank = 0;
        while !reader.is_empty() {
            let offset = reader.pos();
            let id = reader.read_byte()?;
            let len = reader.read_vu32()? as usize;
            let mut section = reader.sub_reader(len, id)?;
            debug!(id, section = section_name(id), offset, len, "reading section");

            if id == SECTION_CUSTOM {
                let name = section.read_name()?;
                let payload = section.read_bytes(section.remaining())?;
                trace!(
                    name,
                    head = %hex::encode(&payload[..payload.len().min(16)]),
                    "custom section"
                );
                visitor.visit_custom(name, payload)?;
                continue;
            }

            let rank = section_rank(id)
                .ok_or_else(|| Error::malformed(offset, format!("malformed section id {}", id)))?;
            if rank <= last_rank {
                return Err(Error::DuplicateOrMisorderedSection { section: id, offset });
            }
            last_rank = rank;

            self.read_section(id, &mut section, visitor, &mut counts)?;
            section.expect_empty()?;
        }

        if counts.functions.unwrap_or(0) != counts.codes.unwrap_or(0) {
            return Err(Error::malformed(
                self.bytes.len(),
                "function and code section have inconsistent lengths",
            ));
        }
        if let Some(data_count) = counts.data_count {
            if data_count != counts.datas.unwrap_or(0) {
                return Err(Error::malformed(
                    self.bytes.len(),
                    "data count and data section have inconsistent lengths",
                ));
            }
        }

        visitor.visit_end()
    }

    fn read_section(
        &self,
        id: u8,
        r: &mut Reader<'a>,
        visitor: &mut dyn ModuleVisitor,
        counts: &mut Counts,
    ) -> Result<()> {
        match id {
            SECTION_TYPE => match visitor.visit_types()? {
                Some(v) => self.read_types(r, v),
                None => skip(r),
            },
            SECTION_IMPORT => match visitor.visit_imports()? {
                Some(v) => self.read_imports(r, v),
                None => skip(r),
            },
            SECTION_FUNCTION => {
                counts.functions = Some(r.clone().read_vu32()?);
                match visitor.visit_funcs()? {
                    Some(v) => self.read_funcs(r, v),
                    None => skip(r),
                }
            }
            SECTION_TABLE => match visitor.visit_tables()? {
                Some(v) => self.read_tables(r, v),
                None => skip(r),
            },
            SECTION_MEMORY => match visitor.visit_mems()? {
                Some(v) => self.read_mems(r, v),
                None => skip(r),
            },
            SECTION_GLOBAL => match visitor.visit_globals()? {
                Some(v) => self.read_globals(r, v),
                None => skip(r),
            },
            SECTION_EXPORT => match visitor.visit_exports()? {
                Some(v) => self.read_exports(r, v),
                None => skip(r),
            },
            SECTION_START => visitor.visit_start(r.read_vu32()?),
            SECTION_ELEMENT => match visitor.visit_elems()? {
                Some(v) => self.read_elems(r, v),
                None => skip(r),
            },
            SECTION_DATA_COUNT => {
                let count = r.read_vu32()?;
                counts.data_count = Some(count);
                visitor.visit_data_count(count)
            }
            SECTION_CODE => {
                counts.codes = Some(r.clone().read_vu32()?);
                match visitor.visit_code()? {
                    Some(v) => self.read_codes(r, v),
                    None => skip(r),
                }
            }
            SECTION_DATA => {
                counts.datas = Some(r.clone().read_vu32()?);
                match visitor.visit_datas()? {
                    Some(v) => self.read_datas(r, v),
                    None => skip(r),
                }
            }
            _ => Err(Error::malformed(r.pos(), format!("malformed section id {}", id))),
        }
    }

    // Sections ----------------------------------------------------------------

    fn read_types(&self, r: &mut Reader<'a>, v: &mut dyn TypesVisitor) -> Result<()> {
        let count = r.read_count(self.config.max_types, "types")?;
        for _ in 0..count {
            let offset = r.pos();
            let form = r.read_byte()?;
            if form != TYPE_FUNC {
                return Err(Error::malformed(offset, format!("malformed type form {:#04x}", form)));
            }
            let params = r.read_vec(self.config.max_function_params, "function params", read_value_type)?;
            let results = r.read_vec(
                self.config.max_function_returns,
                "function results",
                read_value_type,
            )?;
            v.visit_func_type(&params, &results)?;
        }
        v.visit_end()
    }

    fn read_imports(&self, r: &mut Reader<'a>, v: &mut dyn ImportsVisitor) -> Result<()> {
        let count = r.read_count(self.config.max_imports, "imports")?;
        for _ in 0..count {
            let module = r.read_name()?;
            let name = r.read_name()?;
            let offset = r.pos();
            match r.read_byte()? {
                DESC_FUNC => v.visit_func_import(module, name, r.read_vu32()?)?,
                DESC_TABLE => v.visit_table_import(module, name, read_table_type(r)?)?,
                DESC_MEMORY => v.visit_mem_import(module, name, read_limits(r)?)?,
                DESC_GLOBAL => v.visit_global_import(module, name, read_global_type(r)?)?,
                kind => {
                    return Err(Error::malformed(offset, format!("malformed import kind {}", kind)))
                }
            }
        }
        v.visit_end()
    }

    fn read_funcs(&self, r: &mut Reader<'a>, v: &mut dyn FunctionsVisitor) -> Result<()> {
        let count = r.read_count(self.config.max_functions, "functions")?;
        for _ in 0..count {
            v.visit_func(r.read_vu32()?)?;
        }
        v.visit_end()
    }

    fn read_tables(&self, r: &mut Reader<'a>, v: &mut dyn TablesVisitor) -> Result<()> {
        let count = r.read_count(self.config.max_tables, "tables")?;
        for _ in 0..count {
            v.visit_table(read_table_type(r)?)?;
        }
        v.visit_end()
    }

    fn read_mems(&self, r: &mut Reader<'a>, v: &mut dyn MemoriesVisitor) -> Result<()> {
        let count = r.read_count(self.config.max_memories, "memories")?;
        for _ in 0..count {
            v.visit_memory(read_limits(r)?)?;
        }
        v.visit_end()
    }

    fn read_globals(&self, r: &mut Reader<'a>, v: &mut dyn GlobalsVisitor) -> Result<()> {
        let count = r.read_count(self.config.max_globals, "globals")?;
        for _ in 0..count {
            let global = read_global_type(r)?;
            let init = v.visit_global(global)?;
            self.read_expr(r, init)?;
        }
        v.visit_end()
    }

    fn read_exports(&self, r: &mut Reader<'a>, v: &mut dyn ExportsVisitor) -> Result<()> {
        let count = r.read_count(self.config.max_exports, "exports")?;
        for _ in 0..count {
            let name = r.read_name()?;
            let offset = r.pos();
            let byte = r.read_byte()?;
            let kind = ExternalKind::from_byte(byte)
                .ok_or_else(|| Error::malformed(offset, format!("malformed export kind {}", byte)))?;
            v.visit_export(name, kind, r.read_vu32()?)?;
        }
        v.visit_end()
    }

    fn read_elems(&self, r: &mut Reader<'a>, v: &mut dyn ElementSegmentsVisitor) -> Result<()> {
        let count = r.read_count(self.config.max_element_segments, "element segments")?;
        for _ in 0..count {
            let mut skip = SkipElement;
            match v.visit_elem()? {
                Some(elem) => self.read_elem(r, elem)?,
                None => self.read_elem(r, &mut skip)?,
            }
        }
        v.visit_end()
    }

    /// Flag bit 0 marks a passive or declarative segment, bit 1 an explicit
    /// table index (active) or a declarative segment, and bit 2 initializer
    /// expressions instead of function indices.
    fn read_elem(&self, r: &mut Reader<'a>, v: &mut dyn ElementVisitor) -> Result<()> {
        let offset = r.pos();
        let flags = r.read_vu32()?;
        if flags > ELEM_DECLARATIVE_EXPRS {
            return Err(Error::malformed(offset, format!("malformed elements segment kind {}", flags)));
        }

        if flags & 1 == 0 {
            let table = if flags & 2 != 0 { r.read_vu32()? } else { 0 };
            let init = v.visit_active(table)?;
            self.read_expr(r, init)?;
        } else if flags & 2 != 0 {
            v.visit_declarative()?;
        } else {
            v.visit_passive()?;
        }

        let elem_type = if flags == ELEM_ACTIVE_FUNCS || flags == ELEM_ACTIVE_EXPRS {
            ValueType::FuncRef
        } else if flags & 4 == 0 {
            let offset = r.pos();
            let kind = r.read_byte()?;
            if kind != ELEMKIND_FUNCREF {
                return Err(Error::malformed(offset, format!("malformed element kind {}", kind)));
            }
            ValueType::FuncRef
        } else {
            read_ref_type(r)?
        };
        v.visit_type(elem_type)?;

        if flags & 4 == 0 {
            let funcs = r.read_vec(
                self.config.max_table_init_entries,
                "element segment entries",
                |r| r.read_vu32(),
            )?;
            v.visit_func_indices(&funcs)?;
        } else {
            let count = r.read_count(self.config.max_table_init_entries, "element segment entries")?;
            for _ in 0..count {
                let init = v.visit_init()?;
                self.read_expr(r, init)?;
            }
        }
        v.visit_end()
    }

    fn read_codes(&self, r: &mut Reader<'a>, v: &mut dyn CodesVisitor) -> Result<()> {
        let count = r.read_count(self.config.max_functions, "function bodies")?;
        for index in 0..count {
            let offset = r.pos();
            let size = r.read_vu32()?;
            if size > self.config.max_function_size {
                return Err(Error::LimitExceeded {
                    what: "function body size",
                    limit: self.config.max_function_size as u64,
                    offset,
                });
            }
            let mut body = r.sub_reader(size as usize, SECTION_CODE)?;
            let locals = self.read_locals(&mut body)?;
            trace!(index, locals = locals.len(), size, "function body");

            let expr = v.visit_code(&locals)?;
            self.read_expr(&mut body, expr)?;
            body.expect_empty()?;
        }
        v.visit_end()
    }

    /// Expands the run-length encoded local declarations.
    fn read_locals(&self, r: &mut Reader<'a>) -> Result<Vec<ValueType>> {
        let limit = self.config.max_function_locals;
        let groups = r.read_count(limit, "local declarations")?;
        let mut locals = Vec::new();
        let mut total: u64 = 0;
        for _ in 0..groups {
            let offset = r.pos();
            let n = r.read_vu32()?;
            total += n as u64;
            if total > limit as u64 {
                return Err(Error::LimitExceeded {
                    what: "function locals",
                    limit: limit as u64,
                    offset,
                });
            }
            let t = read_value_type(r)?;
            locals.extend(std::iter::repeat(t).take(n as usize));
        }
        Ok(locals)
    }

    fn read_datas(&self, r: &mut Reader<'a>, v: &mut dyn DataSegmentsVisitor) -> Result<()> {
        let count = r.read_count(self.config.max_data_segments, "data segments")?;
        for _ in 0..count {
            let mut skip = SkipData;
            match v.visit_data()? {
                Some(data) => self.read_data(r, data)?,
                None => self.read_data(r, &mut skip)?,
            }
        }
        v.visit_end()
    }

    fn read_data(&self, r: &mut Reader<'a>, v: &mut dyn DataVisitor) -> Result<()> {
        let offset = r.pos();
        match r.read_vu32()? {
            DATA_ACTIVE => {
                let init = v.visit_active(0)?;
                self.read_expr(r, init)?;
            }
            DATA_PASSIVE => v.visit_passive()?,
            DATA_ACTIVE_EXPLICIT => {
                let memory = r.read_vu32()?;
                let init = v.visit_active(memory)?;
                self.read_expr(r, init)?;
            }
            flags => {
                return Err(Error::malformed(offset, format!("malformed data segment kind {}", flags)))
            }
        }
        v.visit_init(r.read_u8vec()?)?;
        v.visit_end()
    }

    // Expressions -------------------------------------------------------------

    /// Decodes one expression up to and including its terminating `end`.
    fn read_expr(&self, r: &mut Reader<'a>, visitor: Option<&mut dyn ExprVisitor>) -> Result<()> {
        let mut skip = SkipExpr;
        let v: &mut dyn ExprVisitor = match visitor {
            Some(v) => v,
            None => &mut skip,
        };

        let mut depth: u32 = 0;
        loop {
            let offset = r.pos();
            let opcode = match r.read_byte()? {
                PREFIX_MISC => Opcode::Misc(r.read_vu32()?),
                PREFIX_VECTOR => Opcode::Vector(r.read_vu32()?),
                byte => Opcode::Plain(byte),
            };
            let attrs = attributes::lookup(opcode)
                .ok_or_else(|| Error::malformed(offset, format!("illegal opcode {}", opcode)))?;

            match attrs.immediates {
                Immediates::Insn => {
                    read_reserved(r, attrs.reserved)?;
                    v.visit_insn(opcode)?;
                }
                Immediates::Const => {
                    let value = match opcode {
                        opcodes::I32_CONST => Const::I32(r.read_vs32()?),
                        opcodes::I64_CONST => Const::I64(r.read_vs64()?),
                        opcodes::F32_CONST => Const::F32(r.read_f32()?),
                        opcodes::F64_CONST => Const::F64(r.read_f64()?),
                        _ => Const::V128(r.read_v128()?),
                    };
                    v.visit_const(value)?;
                }
                Immediates::RefNull => v.visit_ref_null(read_ref_type(r)?)?,
                Immediates::RefFunc => v.visit_ref_func(r.read_vu32()?)?,
                Immediates::SelectTyped => {
                    let types = r.read_vec(self.config.max_select_types, "select types", read_value_type)?;
                    v.visit_select_typed(&types)?;
                }
                Immediates::Variable => v.visit_variable(opcode, r.read_vu32()?)?,
                Immediates::Table => v.visit_table(opcode, r.read_vu32()?)?,
                Immediates::TablePair => {
                    let first = r.read_vu32()?;
                    let second = r.read_vu32()?;
                    v.visit_table_pair(opcode, first, second)?;
                }
                Immediates::Mem => v.visit_mem(opcode, read_memarg(r)?)?,
                Immediates::MemLane => {
                    let memarg = read_memarg(r)?;
                    let lane = r.read_byte()?;
                    v.visit_mem_lane(opcode, memarg, lane)?;
                }
                Immediates::IndexedMem => {
                    let data = r.read_vu32()?;
                    read_reserved(r, attrs.reserved)?;
                    v.visit_indexed_mem(opcode, data)?;
                }
                Immediates::Block => {
                    let block_type = read_block_type(r)?;
                    depth += 1;
                    if depth > self.config.max_nesting_depth {
                        return Err(Error::LimitExceeded {
                            what: "block nesting depth",
                            limit: self.config.max_nesting_depth as u64,
                            offset,
                        });
                    }
                    v.visit_block(opcode, block_type)?;
                }
                Immediates::Else => v.visit_else()?,
                Immediates::End => {
                    if depth == 0 {
                        return v.visit_end();
                    }
                    depth -= 1;
                    v.visit_end_insn()?;
                }
                Immediates::Break => v.visit_break(opcode, r.read_vu32()?)?,
                Immediates::BrTable => {
                    let labels = r.read_vec(self.config.max_br_table_labels, "br_table labels", |r| {
                        r.read_vu32()
                    })?;
                    let default = r.read_vu32()?;
                    v.visit_br_table(&labels, default)?;
                }
                Immediates::Call => v.visit_call(r.read_vu32()?)?,
                Immediates::CallIndirect => {
                    let type_index = r.read_vu32()?;
                    let table = r.read_vu32()?;
                    v.visit_call_indirect(table, type_index)?;
                }
                Immediates::Lane => v.visit_lane(opcode, r.read_byte()?)?,
                Immediates::Shuffle => v.visit_shuffle(r.read_v128()?)?,
            }
        }
    }
}

fn skip(r: &mut Reader) -> Result<()> {
    r.read_bytes(r.remaining())?;
    Ok(())
}

fn read_reserved(r: &mut Reader, count: u8) -> Result<()> {
    for _ in 0..count {
        let offset = r.pos();
        if r.read_byte()? != 0 {
            return Err(Error::malformed(offset, "zero byte expected"));
        }
    }
    Ok(())
}

fn read_value_type(r: &mut Reader) -> Result<ValueType> {
    let offset = r.pos();
    let byte = r.read_byte()?;
    ValueType::from_byte(byte)
        .ok_or_else(|| Error::malformed(offset, format!("malformed value type {:#04x}", byte)))
}

fn read_ref_type(r: &mut Reader) -> Result<ValueType> {
    let offset = r.pos();
    match read_value_type(r)? {
        t if t.is_ref() => Ok(t),
        t => Err(Error::malformed(offset, format!("malformed reference type {}", t))),
    }
}

fn read_limits(r: &mut Reader) -> Result<Limits> {
    let offset = r.pos();
    match r.read_byte()? {
        LIMITS_MIN => Ok(Limits::new(r.read_vu32()?, None)),
        LIMITS_MIN_MAX => {
            let min = r.read_vu32()?;
            let max = r.read_vu32()?;
            Ok(Limits::new(min, Some(max)))
        }
        flags => Err(Error::malformed(offset, format!("malformed limits flags {:#04x}", flags))),
    }
}

fn read_table_type(r: &mut Reader) -> Result<TableType> {
    let elem_type = read_ref_type(r)?;
    let limits = read_limits(r)?;
    Ok(TableType { elem_type, limits })
}

fn read_global_type(r: &mut Reader) -> Result<GlobalType> {
    let value_type = read_value_type(r)?;
    let offset = r.pos();
    let mutable = match r.read_byte()? {
        0x00 => false,
        0x01 => true,
        byte => return Err(Error::malformed(offset, format!("malformed mutability {:#04x}", byte))),
    };
    Ok(GlobalType { value_type, mutable })
}

fn read_memarg(r: &mut Reader) -> Result<MemArg> {
    let align = r.read_vu32()?;
    let offset = r.read_vu32()?;
    Ok(MemArg { align, offset })
}

/// A block type is the empty marker, a value type, or a non-negative s33
/// type index. Value type bytes read as negative s33 values, so they are
/// matched first.
fn read_block_type(r: &mut Reader) -> Result<BlockType> {
    let offset = r.pos();
    match r.peek_byte() {
        Some(BLOCK_TYPE_EMPTY) => {
            r.read_byte()?;
            Ok(BlockType::Empty)
        }
        Some(byte) if ValueType::from_byte(byte).is_some() => Ok(BlockType::Value(read_value_type(r)?)),
        _ => {
            let index = r.read_vs33()?;
            if index < 0 {
                return Err(Error::malformed(offset, "malformed block type"));
            }
            Ok(BlockType::FuncType(index as u32))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    /// Counts top-level events so tests can check what was visited.
    #[derive(Default)]
    struct Tally {
        customs: Vec<String>,
        types: usize,
        bodies: Vec<Vec<ValueType>>,
        insns: usize,
        ended: bool,
    }

    impl ModuleVisitor for Tally {
        fn visit_custom(&mut self, name: &str, _payload: &[u8]) -> Result<()> {
            self.customs.push(name.to_string());
            Ok(())
        }

        fn visit_types(&mut self) -> Result<Option<&mut dyn TypesVisitor>> {
            Ok(Some(self))
        }

        fn visit_code(&mut self) -> Result<Option<&mut dyn CodesVisitor>> {
            Ok(Some(self))
        }

        fn visit_end(&mut self) -> Result<()> {
            self.ended = true;
            Ok(())
        }
    }

    impl TypesVisitor for Tally {
        fn visit_func_type(&mut self, _params: &[ValueType], _results: &[ValueType]) -> Result<()> {
            self.types += 1;
            Ok(())
        }
    }

    impl CodesVisitor for Tally {
        fn visit_code(&mut self, locals: &[ValueType]) -> Result<Option<&mut dyn ExprVisitor>> {
            self.bodies.push(locals.to_vec());
            Ok(Some(self))
        }
    }

    impl ExprVisitor for Tally {
        fn visit_insn(&mut self, _op: Opcode) -> Result<()> {
            self.insns += 1;
            Ok(())
        }
    }

    fn module(sections: &[u8]) -> Vec<u8> {
        let mut bytes = b"\0asm\x01\0\0\0".to_vec();
        bytes.extend_from_slice(sections);
        bytes
    }

    #[test]
    fn test_header() {
        let mut tally = Tally::default();
        ModuleReader::new(&module(&[])).accept(&mut tally).unwrap();
        assert!(tally.ended);

        let err = ModuleReader::new(b"\0asn\x01\0\0\0").accept(&mut tally).unwrap_err();
        assert_eq!(err, Error::malformed(0, "magic header not detected"));
        let err = ModuleReader::new(b"\0asm\x02\0\0\0").accept(&mut tally).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedEncoding);
        let err = ModuleReader::new(b"\0as").accept(&mut tally).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedEncoding);
    }

    #[test]
    fn test_locals_expand() {
        // type () -> (), one function, body with locals 2 x i32, 1 x f64, then nop end
        let bytes = module(&[
            1, 4, 1, 0x60, 0, 0, //
            3, 2, 1, 0, //
            10, 9, 1, 7, 2, 2, 0x7f, 1, 0x7c, 0x01, 0x0b,
        ]);
        let mut tally = Tally::default();
        ModuleReader::new(&bytes).accept(&mut tally).unwrap();
        assert_eq!(tally.types, 1);
        assert_eq!(tally.bodies, vec![vec![ValueType::I32, ValueType::I32, ValueType::F64]]);
        assert_eq!(tally.insns, 1);
    }

    #[test]
    fn test_locals_limit() {
        let bytes = module(&[
            1, 4, 1, 0x60, 0, 0, //
            3, 2, 1, 0, //
            10, 7, 1, 5, 1, 4, 0x7f, 0x01, 0x0b,
        ]);
        let config = Config::default().with_max_function_locals(3);
        let err = ModuleReader::with_config(&bytes, &config)
            .accept(&mut Tally::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
    }

    #[test]
    fn test_function_code_mismatch() {
        let bytes = module(&[1, 4, 1, 0x60, 0, 0, 3, 2, 1, 0]);
        let err = ModuleReader::new(&bytes).accept(&mut Tally::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedEncoding);
    }

    #[test]
    fn test_custom_sections_anywhere() {
        let bytes = module(&[0, 2, 1, b'a', 1, 1, 0, 0, 3, 1, b'b', 0xff]);
        let mut tally = Tally::default();
        ModuleReader::new(&bytes).accept(&mut tally).unwrap();
        assert_eq!(tally.customs, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_declined_sections_are_skipped() {
        // an import section with garbage contents is never decoded
        let bytes = module(&[2, 3, 0xff, 0xff, 0xff]);
        ModuleReader::new(&bytes).accept(&mut Tally::default()).unwrap();
    }

    #[test]
    fn test_unknown_section_id() {
        let err = ModuleReader::new(&module(&[13, 0])).accept(&mut Tally::default()).unwrap_err();
        assert_eq!(err, Error::malformed(8, "malformed section id 13"));
    }

    #[test]
    fn test_data_count_before_code() {
        // data count (12) must come before code (10), and a repeat is rejected
        let bytes = module(&[12, 1, 0, 12, 1, 0]);
        let err = ModuleReader::new(&bytes).accept(&mut Tally::default()).unwrap_err();
        assert_eq!(
            err,
            Error::DuplicateOrMisorderedSection {
                section: 12,
                offset: 11
            }
        );
    }

    #[test]
    fn test_nesting_limit() {
        let bytes = module(&[
            1, 4, 1, 0x60, 0, 0, //
            3, 2, 1, 0, //
            10, 10, 1, 8, 0, 2, 0x40, 2, 0x40, 0x0b, 0x0b, 0x0b,
        ]);
        ModuleReader::new(&bytes).accept(&mut Tally::default()).unwrap();
        let config = Config::default().with_max_nesting_depth(1);
        let err = ModuleReader::with_config(&bytes, &config)
            .accept(&mut Tally::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
    }

    #[test]
    fn test_illegal_opcode() {
        let bytes = module(&[
            1, 4, 1, 0x60, 0, 0, //
            3, 2, 1, 0, //
            10, 5, 1, 3, 0, 0x06, 0x0b,
        ]);
        let err = ModuleReader::new(&bytes).accept(&mut Tally::default()).unwrap_err();
        assert_eq!(err, Error::malformed(23, "illegal opcode 0x06"));
    }

    #[test]
    fn test_reserved_byte() {
        let bytes = module(&[
            1, 4, 1, 0x60, 0, 0, //
            3, 2, 1, 0, //
            10, 7, 1, 5, 0, 0x3f, 0x01, 0x1a, 0x0b,
        ]);
        let err = ModuleReader::new(&bytes).accept(&mut Tally::default()).unwrap_err();
        assert_eq!(err, Error::malformed(24, "zero byte expected"));
    }

    #[test]
    fn test_block_types() {
        let read = |bytes: &[u8]| read_block_type(&mut Reader::new(bytes));
        assert_eq!(read(&[0x40]).unwrap(), BlockType::Empty);
        assert_eq!(read(&[0x7e]).unwrap(), BlockType::Value(ValueType::I64));
        assert_eq!(read(&[0x03]).unwrap(), BlockType::FuncType(3));
        assert_eq!(read(&[0x80, 0x01]).unwrap(), BlockType::FuncType(128));
        assert!(read(&[0x41]).is_err());
    }
}
