//! Module-level checks.
//!
//! [`ModuleValidator`] consumes the visitor protocol section by section,
//! building a [`ModuleContext`] as declarations arrive. Constant expressions
//! go to a [`ConstExprValidator`] and function bodies to a
//! [`FunctionValidator`] sharing the context frozen when the code section
//! starts.

use crate::config::Config;
use crate::error::{Error, IndexSpace, Location, Result};
use crate::parser::types::{ExternalKind, FuncType, GlobalType, Limits, TableType, ValueType};
use crate::parser::visitor::*;
use crate::validate::constant::ConstExprValidator;
use crate::validate::context::ModuleContext;
use crate::validate::function::FunctionValidator;
use std::collections::HashSet;
use std::sync::Arc;

/// The element segment being visited.
#[derive(Debug, Default)]
struct Segment {
    table: Option<u32>,
    elem_type: Option<ValueType>,
}

pub struct ModuleValidator {
    config: Config,
    ctx: ModuleContext,
    frozen: Option<Arc<ModuleContext>>,
    constant: ConstExprValidator,
    segment: Segment,
    export_names: HashSet<String>,
    function: Option<FunctionValidator>,
    codes: u32,
    datas: u32,
}

impl Default for ModuleValidator {
    fn default() -> Self {
        ModuleValidator::new(&Config::default())
    }
}

const MODULE: Location = Location::Module;

impl ModuleValidator {
    pub fn new(config: &Config) -> Self {
        ModuleValidator {
            config: config.clone(),
            ctx: ModuleContext::default(),
            frozen: None,
            constant: ConstExprValidator::new(ValueType::I32, &[], 0),
            segment: Segment::default(),
            export_names: HashSet::new(),
            function: None,
            codes: 0,
            datas: 0,
        }
    }

    /// The context built so far.
    pub fn context(&self) -> &ModuleContext {
        &self.ctx
    }

    /// The validator for the function body currently being visited.
    pub(crate) fn function(&mut self) -> Option<&mut FunctionValidator> {
        self.function.as_mut()
    }

    fn defined_funcs(&self) -> u32 {
        self.ctx.funcs.len() as u32 - self.ctx.imported_funcs
    }

    /// Moves `ref.func` targets seen in constant expressions into the
    /// declared references.
    fn settle(&mut self) {
        let refs = self.constant.take_refs();
        self.ctx.declared_refs.extend(refs);
    }

    fn const_expr(&mut self, expected: ValueType) -> &mut dyn ExprVisitor {
        self.settle();
        self.constant.reset(expected, &self.ctx);
        &mut self.constant
    }

    fn check_limits(&self, limits: &Limits, ceiling: u32, what: &str) -> Result<()> {
        if let Some(max) = limits.max {
            if limits.min > max {
                return Err(Error::invalid(
                    MODULE,
                    format!("{} minimum {} is greater than its maximum {}", what, limits.min, max),
                ));
            }
        }
        if limits.min > ceiling || limits.max.map_or(false, |max| max > ceiling) {
            return Err(Error::invalid(
                MODULE,
                format!("{} size must be at most {}", what, ceiling),
            ));
        }
        Ok(())
    }

    fn add_table(&mut self, table: TableType) -> Result<()> {
        if !table.elem_type.is_ref() {
            return Err(Error::invalid(MODULE, format!("{} is not a reference type", table.elem_type)));
        }
        self.check_limits(&table.limits, u32::MAX, "table")?;
        if !self.ctx.tables.is_empty() && !self.config.features.reference_types {
            return Err(Error::invalid(MODULE, "multiple tables"));
        }
        self.ctx.tables.push(table);
        Ok(())
    }

    fn add_memory(&mut self, limits: Limits) -> Result<()> {
        self.check_limits(&limits, self.config.max_memory_pages, "memory")?;
        if !self.ctx.mems.is_empty() && !self.config.features.multi_memory {
            return Err(Error::invalid(MODULE, "multiple memories"));
        }
        self.ctx.mems.push(limits);
        Ok(())
    }

    fn check_function_finished(&self) -> Result<()> {
        match &self.function {
            Some(f) if !f.is_finished() => Err(Error::invalid(
                Location::Instruction {
                    function: f.function(),
                    index: 0,
                },
                "function body was not terminated",
            )),
            _ => Ok(()),
        }
    }
}

impl ModuleVisitor for ModuleValidator {
    fn visit_types(&mut self) -> Result<Option<&mut dyn TypesVisitor>> {
        Ok(Some(self))
    }

    fn visit_imports(&mut self) -> Result<Option<&mut dyn ImportsVisitor>> {
        Ok(Some(self))
    }

    fn visit_funcs(&mut self) -> Result<Option<&mut dyn FunctionsVisitor>> {
        Ok(Some(self))
    }

    fn visit_tables(&mut self) -> Result<Option<&mut dyn TablesVisitor>> {
        Ok(Some(self))
    }

    fn visit_mems(&mut self) -> Result<Option<&mut dyn MemoriesVisitor>> {
        Ok(Some(self))
    }

    fn visit_globals(&mut self) -> Result<Option<&mut dyn GlobalsVisitor>> {
        Ok(Some(self))
    }

    fn visit_exports(&mut self) -> Result<Option<&mut dyn ExportsVisitor>> {
        self.settle();
        Ok(Some(self))
    }

    fn visit_start(&mut self, func: u32) -> Result<()> {
        let func_type = self.ctx.func_type(func, MODULE)?;
        if !func_type.params.is_empty() || !func_type.results.is_empty() {
            return Err(Error::invalid(
                MODULE,
                format!("start function must have type [] -> [], not {}", func_type),
            ));
        }
        Ok(())
    }

    fn visit_elems(&mut self) -> Result<Option<&mut dyn ElementSegmentsVisitor>> {
        self.settle();
        Ok(Some(self))
    }

    fn visit_data_count(&mut self, count: u32) -> Result<()> {
        self.ctx.data_count = Some(count);
        Ok(())
    }

    fn visit_code(&mut self) -> Result<Option<&mut dyn CodesVisitor>> {
        self.settle();
        self.frozen = Some(Arc::new(self.ctx.clone()));
        Ok(Some(self))
    }

    fn visit_datas(&mut self) -> Result<Option<&mut dyn DataSegmentsVisitor>> {
        self.settle();
        Ok(Some(self))
    }

    fn visit_end(&mut self) -> Result<()> {
        self.settle();
        if self.codes != self.defined_funcs() {
            return Err(Error::invalid(
                MODULE,
                format!(
                    "{} functions declared but {} bodies given",
                    self.defined_funcs(),
                    self.codes
                ),
            ));
        }
        if let Some(count) = self.ctx.data_count {
            if count != self.datas {
                return Err(Error::invalid(
                    MODULE,
                    format!("data count {} does not match {} data segments", count, self.datas),
                ));
            }
        }
        Ok(())
    }
}

impl TypesVisitor for ModuleValidator {
    fn visit_func_type(&mut self, params: &[ValueType], results: &[ValueType]) -> Result<()> {
        self.ctx.types.push(FuncType::new(params.to_vec(), results.to_vec()));
        Ok(())
    }
}

impl ImportsVisitor for ModuleValidator {
    fn visit_func_import(&mut self, _module: &str, _name: &str, type_index: u32) -> Result<()> {
        self.ctx.func_type_at(type_index, MODULE)?;
        self.ctx.funcs.push(type_index);
        self.ctx.imported_funcs += 1;
        Ok(())
    }

    fn visit_table_import(&mut self, _module: &str, _name: &str, table: TableType) -> Result<()> {
        self.add_table(table)?;
        self.ctx.imported_tables += 1;
        Ok(())
    }

    fn visit_mem_import(&mut self, _module: &str, _name: &str, limits: Limits) -> Result<()> {
        self.add_memory(limits)?;
        self.ctx.imported_mems += 1;
        Ok(())
    }

    fn visit_global_import(&mut self, _module: &str, _name: &str, global: GlobalType) -> Result<()> {
        self.ctx.globals.push(global);
        self.ctx.imported_globals += 1;
        Ok(())
    }
}

impl FunctionsVisitor for ModuleValidator {
    fn visit_func(&mut self, type_index: u32) -> Result<()> {
        self.ctx.func_type_at(type_index, MODULE)?;
        self.ctx.funcs.push(type_index);
        Ok(())
    }
}

impl TablesVisitor for ModuleValidator {
    fn visit_table(&mut self, table: TableType) -> Result<()> {
        self.add_table(table)
    }
}

impl MemoriesVisitor for ModuleValidator {
    fn visit_memory(&mut self, limits: Limits) -> Result<()> {
        self.add_memory(limits)
    }
}

impl GlobalsVisitor for ModuleValidator {
    fn visit_global(&mut self, global: GlobalType) -> Result<Option<&mut dyn ExprVisitor>> {
        // the initializer sees only the globals declared before this one
        self.settle();
        self.constant.reset(global.value_type, &self.ctx);
        self.ctx.globals.push(global);
        Ok(Some(&mut self.constant))
    }

    fn visit_end(&mut self) -> Result<()> {
        self.settle();
        Ok(())
    }
}

impl ExportsVisitor for ModuleValidator {
    fn visit_export(&mut self, name: &str, kind: ExternalKind, index: u32) -> Result<()> {
        if !self.export_names.insert(name.to_string()) {
            return Err(Error::invalid(MODULE, format!("duplicate export name {:?}", name)));
        }
        match kind {
            ExternalKind::Func => {
                self.ctx.func_type(index, MODULE)?;
                self.ctx.declared_refs.insert(index);
            }
            ExternalKind::Table => {
                self.ctx.table(index, MODULE)?;
            }
            ExternalKind::Memory => {
                self.ctx.memory(index, MODULE)?;
            }
            ExternalKind::Global => {
                self.ctx.global(index, MODULE)?;
            }
        }
        Ok(())
    }
}

impl ElementSegmentsVisitor for ModuleValidator {
    fn visit_elem(&mut self) -> Result<Option<&mut dyn ElementVisitor>> {
        self.settle();
        self.segment = Segment::default();
        Ok(Some(self))
    }
}

impl ElementVisitor for ModuleValidator {
    fn visit_active(&mut self, table: u32) -> Result<Option<&mut dyn ExprVisitor>> {
        self.ctx.table(table, MODULE)?;
        self.segment.table = Some(table);
        Ok(Some(self.const_expr(ValueType::I32)))
    }

    fn visit_type(&mut self, elem_type: ValueType) -> Result<()> {
        self.settle();
        if !elem_type.is_ref() {
            return Err(Error::invalid(MODULE, format!("{} is not a reference type", elem_type)));
        }
        if let Some(table) = self.segment.table {
            let table_type = self.ctx.table(table, MODULE)?.elem_type;
            if table_type != elem_type {
                return Err(Error::type_mismatch(
                    MODULE,
                    format!("{} segment cannot initialize {} table {}", elem_type, table_type, table),
                ));
            }
        }
        self.segment.elem_type = Some(elem_type);
        Ok(())
    }

    fn visit_func_indices(&mut self, funcs: &[u32]) -> Result<()> {
        if self.segment.elem_type.unwrap_or(ValueType::FuncRef) != ValueType::FuncRef {
            return Err(Error::type_mismatch(
                MODULE,
                "function indices need a funcref segment",
            ));
        }
        let count = self.ctx.funcs.len() as u32;
        for func in funcs {
            if *func >= count {
                return Err(Error::UnknownIndex {
                    space: IndexSpace::Function,
                    index: *func,
                    location: MODULE,
                });
            }
            self.ctx.declared_refs.insert(*func);
        }
        Ok(())
    }

    fn visit_init(&mut self) -> Result<Option<&mut dyn ExprVisitor>> {
        let elem_type = self.segment.elem_type.unwrap_or(ValueType::FuncRef);
        Ok(Some(self.const_expr(elem_type)))
    }

    fn visit_end(&mut self) -> Result<()> {
        self.settle();
        let elem_type = self.segment.elem_type.unwrap_or(ValueType::FuncRef);
        self.ctx.elem_types.push(elem_type);
        Ok(())
    }
}

impl CodesVisitor for ModuleValidator {
    fn visit_code(&mut self, locals: &[ValueType]) -> Result<Option<&mut dyn ExprVisitor>> {
        self.check_function_finished()?;
        if self.codes >= self.defined_funcs() {
            return Err(Error::invalid(
                MODULE,
                format!("function body {} has no declaration", self.codes),
            ));
        }
        let ctx = match &self.frozen {
            Some(ctx) => Arc::clone(ctx),
            None => Arc::new(self.ctx.clone()),
        };
        let index = self.ctx.imported_funcs + self.codes;
        self.codes += 1;
        self.function = Some(FunctionValidator::new(ctx, index, locals)?);
        Ok(self.function.as_mut().map(|f| f as &mut dyn ExprVisitor))
    }

    fn visit_end(&mut self) -> Result<()> {
        self.check_function_finished()
    }
}

impl DataSegmentsVisitor for ModuleValidator {
    fn visit_data(&mut self) -> Result<Option<&mut dyn DataVisitor>> {
        self.settle();
        self.datas += 1;
        Ok(Some(self))
    }
}

impl DataVisitor for ModuleValidator {
    fn visit_active(&mut self, memory: u32) -> Result<Option<&mut dyn ExprVisitor>> {
        self.ctx.memory(memory, MODULE)?;
        Ok(Some(self.const_expr(ValueType::I32)))
    }

    fn visit_end(&mut self) -> Result<()> {
        self.settle();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Features;
    use crate::error::ErrorKind;
    use crate::parser::opcodes::*;
    use crate::parser::types::{BlockType, Const};
    use ValueType::*;

    fn table(elem_type: ValueType) -> TableType {
        TableType {
            elem_type,
            limits: Limits::new(1, None),
        }
    }

    /// Declares `() -> ()` and `(i32) -> (i32)` and one function of each.
    fn declare(v: &mut ModuleValidator) {
        let types = v.visit_types().unwrap().unwrap();
        types.visit_func_type(&[], &[]).unwrap();
        types.visit_func_type(&[I32], &[I32]).unwrap();
        types.visit_end().unwrap();
        let funcs = v.visit_funcs().unwrap().unwrap();
        funcs.visit_func(0).unwrap();
        funcs.visit_func(1).unwrap();
        funcs.visit_end().unwrap();
    }

    fn empty_bodies(v: &mut ModuleValidator) {
        let codes = ModuleVisitor::visit_code(v).unwrap().unwrap();
        let body = codes.visit_code(&[]).unwrap().unwrap();
        body.visit_end().unwrap();
        let body = codes.visit_code(&[]).unwrap().unwrap();
        body.visit_variable(LOCAL_GET, 0).unwrap();
        body.visit_end().unwrap();
        codes.visit_end().unwrap();
    }

    #[test]
    fn test_valid_module() {
        let mut v = ModuleValidator::default();
        declare(&mut v);
        empty_bodies(&mut v);
        ModuleVisitor::visit_end(&mut v).unwrap();
        assert_eq!(v.context().funcs, vec![0, 1]);
    }

    #[test]
    fn test_unknown_function_type() {
        let mut v = ModuleValidator::default();
        let funcs = v.visit_funcs().unwrap().unwrap();
        let err = funcs.visit_func(0).unwrap_err();
        assert_eq!(
            err,
            Error::UnknownIndex {
                space: IndexSpace::Type,
                index: 0,
                location: Location::Module
            }
        );
    }

    #[test]
    fn test_missing_bodies() {
        let mut v = ModuleValidator::default();
        declare(&mut v);
        assert_eq!(ModuleVisitor::visit_end(&mut v).unwrap_err().kind(), ErrorKind::Invalid);
    }

    #[test]
    fn test_limits() {
        let mut v = ModuleValidator::default();
        let mems = v.visit_mems().unwrap().unwrap();
        assert_eq!(mems.visit_memory(Limits::new(2, Some(1))).unwrap_err().kind(), ErrorKind::Invalid);
        assert_eq!(mems.visit_memory(Limits::new(65_537, None)).unwrap_err().kind(), ErrorKind::Invalid);
        mems.visit_memory(Limits::new(1, Some(65_536))).unwrap();
        assert_eq!(mems.visit_memory(Limits::new(1, None)).unwrap_err().kind(), ErrorKind::Invalid);
    }

    #[test]
    fn test_multiple_memories_with_feature() {
        let config = Config::default().with_features(Features {
            multi_memory: true,
            reference_types: true,
        });
        let mut v = ModuleValidator::new(&config);
        let mems = v.visit_mems().unwrap().unwrap();
        mems.visit_memory(Limits::new(1, None)).unwrap();
        mems.visit_memory(Limits::new(1, None)).unwrap();
        assert_eq!(v.context().mems.len(), 2);
    }

    #[test]
    fn test_multiple_tables_need_reference_types() {
        let mut v = ModuleValidator::default();
        let tables = v.visit_tables().unwrap().unwrap();
        tables.visit_table(table(FuncRef)).unwrap();
        tables.visit_table(table(ExternRef)).unwrap();

        let config = Config::default().with_features(Features {
            multi_memory: false,
            reference_types: false,
        });
        let mut v = ModuleValidator::new(&config);
        let tables = v.visit_tables().unwrap().unwrap();
        tables.visit_table(table(FuncRef)).unwrap();
        assert_eq!(tables.visit_table(table(FuncRef)).unwrap_err().kind(), ErrorKind::Invalid);
    }

    #[test]
    fn test_start_signature() {
        let mut v = ModuleValidator::default();
        declare(&mut v);
        v.visit_start(0).unwrap();
        assert_eq!(v.visit_start(1).unwrap_err().kind(), ErrorKind::Invalid);
        assert_eq!(v.visit_start(2).unwrap_err().kind(), ErrorKind::UnknownIndex);
    }

    #[test]
    fn test_exports() {
        let mut v = ModuleValidator::default();
        declare(&mut v);
        let exports = v.visit_exports().unwrap().unwrap();
        exports.visit_export("f", ExternalKind::Func, 1).unwrap();
        assert_eq!(
            exports.visit_export("f", ExternalKind::Func, 0).unwrap_err().kind(),
            ErrorKind::Invalid
        );
        assert_eq!(
            exports.visit_export("m", ExternalKind::Memory, 0).unwrap_err().kind(),
            ErrorKind::UnknownIndex
        );
        exports.visit_end().unwrap();
        assert!(v.context().declared_refs.contains(&1));
    }

    #[test]
    fn test_global_initializers() {
        let mut v = ModuleValidator::default();
        let imports = v.visit_imports().unwrap().unwrap();
        imports
            .visit_global_import("env", "g", GlobalType { value_type: I64, mutable: false })
            .unwrap();
        imports.visit_end().unwrap();

        let globals = v.visit_globals().unwrap().unwrap();
        let init = globals
            .visit_global(GlobalType { value_type: I64, mutable: true })
            .unwrap()
            .unwrap();
        init.visit_variable(GLOBAL_GET, 0).unwrap();
        init.visit_end().unwrap();

        let init = globals
            .visit_global(GlobalType { value_type: I64, mutable: false })
            .unwrap()
            .unwrap();
        // global 1 is mutable
        assert_eq!(init.visit_variable(GLOBAL_GET, 1).unwrap_err().kind(), ErrorKind::Invalid);

        let init = globals
            .visit_global(GlobalType { value_type: I32, mutable: false })
            .unwrap()
            .unwrap();
        // a global cannot read itself
        assert_eq!(init.visit_variable(GLOBAL_GET, 3).unwrap_err().kind(), ErrorKind::UnknownIndex);
    }

    #[test]
    fn test_ref_func_declared_by_elements() {
        let mut v = ModuleValidator::default();
        declare(&mut v);
        let tables = v.visit_tables().unwrap().unwrap();
        tables.visit_table(table(FuncRef)).unwrap();
        tables.visit_end().unwrap();

        let segments = v.visit_elems().unwrap().unwrap();
        let segment = segments.visit_elem().unwrap().unwrap();
        let offset = segment.visit_active(0).unwrap().unwrap();
        offset.visit_const(Const::I32(0)).unwrap();
        offset.visit_end().unwrap();
        segment.visit_type(FuncRef).unwrap();
        segment.visit_func_indices(&[1]).unwrap();
        segment.visit_end().unwrap();

        let segment = segments.visit_elem().unwrap().unwrap();
        segment.visit_passive().unwrap();
        segment.visit_type(FuncRef).unwrap();
        let init = segment.visit_init().unwrap().unwrap();
        init.visit_ref_func(0).unwrap();
        init.visit_end().unwrap();
        segment.visit_end().unwrap();
        segments.visit_end().unwrap();

        let codes = ModuleVisitor::visit_code(&mut v).unwrap().unwrap();
        let body = codes.visit_code(&[]).unwrap().unwrap();
        body.visit_ref_func(0).unwrap();
        body.visit_ref_func(1).unwrap();
        body.visit_insn(DROP).unwrap();
        body.visit_insn(DROP).unwrap();
        body.visit_end().unwrap();
        let body = codes.visit_code(&[]).unwrap().unwrap();
        body.visit_variable(LOCAL_GET, 0).unwrap();
        body.visit_end().unwrap();
        codes.visit_end().unwrap();
        ModuleVisitor::visit_end(&mut v).unwrap();
        assert_eq!(v.context().elem_types, vec![FuncRef, FuncRef]);
    }

    #[test]
    fn test_undeclared_ref_func() {
        let mut v = ModuleValidator::default();
        declare(&mut v);
        let codes = ModuleVisitor::visit_code(&mut v).unwrap().unwrap();
        let body = codes.visit_code(&[]).unwrap().unwrap();
        assert_eq!(body.visit_ref_func(1).unwrap_err().kind(), ErrorKind::Invalid);
    }

    #[test]
    fn test_element_type_must_match_table() {
        let mut v = ModuleValidator::default();
        let tables = v.visit_tables().unwrap().unwrap();
        tables.visit_table(table(ExternRef)).unwrap();
        tables.visit_end().unwrap();

        let segments = v.visit_elems().unwrap().unwrap();
        let segment = segments.visit_elem().unwrap().unwrap();
        let offset = segment.visit_active(0).unwrap().unwrap();
        offset.visit_const(Const::I32(0)).unwrap();
        offset.visit_end().unwrap();
        assert_eq!(segment.visit_type(FuncRef).unwrap_err().kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_data_segments() {
        let mut v = ModuleValidator::default();
        v.visit_data_count(1).unwrap();
        let datas = v.visit_datas().unwrap().unwrap();
        let data = datas.visit_data().unwrap().unwrap();
        assert_eq!(data.visit_active(0).err().unwrap().kind(), ErrorKind::UnknownIndex);

        let mut v = ModuleValidator::default();
        v.visit_data_count(2).unwrap();
        let mems = v.visit_mems().unwrap().unwrap();
        mems.visit_memory(Limits::new(1, None)).unwrap();
        let datas = v.visit_datas().unwrap().unwrap();
        let data = datas.visit_data().unwrap().unwrap();
        let offset = data.visit_active(0).unwrap().unwrap();
        offset.visit_const(Const::I32(16)).unwrap();
        offset.visit_end().unwrap();
        data.visit_init(b"hi").unwrap();
        data.visit_end().unwrap();
        datas.visit_end().unwrap();
        assert_eq!(ModuleVisitor::visit_end(&mut v).unwrap_err().kind(), ErrorKind::Invalid);
    }

    #[test]
    fn test_unterminated_body() {
        let mut v = ModuleValidator::default();
        declare(&mut v);
        let codes = ModuleVisitor::visit_code(&mut v).unwrap().unwrap();
        let body = codes.visit_code(&[]).unwrap().unwrap();
        body.visit_block(BLOCK, BlockType::Empty).unwrap();
        assert_eq!(codes.visit_code(&[]).err().unwrap().kind(), ErrorKind::Invalid);
    }
}
