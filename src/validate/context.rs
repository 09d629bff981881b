//! What function bodies may refer to: the module's declarations, imported
//! ones first in each index space.

use crate::error::{Error, IndexSpace, Location, Result};
use crate::parser::types::{BlockType, FuncType, GlobalType, Limits, TableType, ValueType};
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct ModuleContext {
    pub types: Vec<FuncType>,
    /// Type index of every function.
    pub funcs: Vec<u32>,
    pub tables: Vec<TableType>,
    pub mems: Vec<Limits>,
    pub globals: Vec<GlobalType>,
    /// Element type of every element segment.
    pub elem_types: Vec<ValueType>,
    pub data_count: Option<u32>,
    /// Functions that `ref.func` may name inside a function body.
    pub declared_refs: HashSet<u32>,
    pub imported_funcs: u32,
    pub imported_tables: u32,
    pub imported_mems: u32,
    pub imported_globals: u32,
}

fn unknown(space: IndexSpace, index: u32, location: Location) -> Error {
    Error::UnknownIndex {
        space,
        index,
        location,
    }
}

impl ModuleContext {
    pub fn func_type_at(&self, index: u32, location: Location) -> Result<&FuncType> {
        self.types
            .get(index as usize)
            .ok_or_else(|| unknown(IndexSpace::Type, index, location))
    }

    /// The signature of function `func`.
    pub fn func_type(&self, func: u32, location: Location) -> Result<&FuncType> {
        let type_index = self
            .funcs
            .get(func as usize)
            .ok_or_else(|| unknown(IndexSpace::Function, func, location))?;
        self.func_type_at(*type_index, location)
    }

    pub fn table(&self, index: u32, location: Location) -> Result<&TableType> {
        self.tables
            .get(index as usize)
            .ok_or_else(|| unknown(IndexSpace::Table, index, location))
    }

    pub fn memory(&self, index: u32, location: Location) -> Result<&Limits> {
        self.mems
            .get(index as usize)
            .ok_or_else(|| unknown(IndexSpace::Memory, index, location))
    }

    pub fn global(&self, index: u32, location: Location) -> Result<&GlobalType> {
        self.globals
            .get(index as usize)
            .ok_or_else(|| unknown(IndexSpace::Global, index, location))
    }

    pub fn elem_type(&self, index: u32, location: Location) -> Result<ValueType> {
        self.elem_types
            .get(index as usize)
            .copied()
            .ok_or_else(|| unknown(IndexSpace::Element, index, location))
    }

    /// Checks a data segment index; instructions naming one need the data
    /// count section.
    pub fn data(&self, index: u32, location: Location) -> Result<()> {
        match self.data_count {
            None => Err(Error::invalid(location, "data count section required")),
            Some(count) if index >= count => Err(unknown(IndexSpace::Data, index, location)),
            Some(_) => Ok(()),
        }
    }

    /// Parameter and result types of a block.
    pub fn block_type(
        &self,
        block_type: BlockType,
        location: Location,
    ) -> Result<(Vec<ValueType>, Vec<ValueType>)> {
        match block_type {
            BlockType::Empty => Ok((vec![], vec![])),
            BlockType::Value(t) => Ok((vec![], vec![t])),
            BlockType::FuncType(index) => {
                let ft = self.func_type_at(index, location)?;
                Ok((ft.params.clone(), ft.results.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn context() -> ModuleContext {
        ModuleContext {
            types: vec![FuncType::new(vec![ValueType::I32], vec![ValueType::I64])],
            funcs: vec![0, 0],
            data_count: Some(1),
            ..Default::default()
        }
    }

    #[test]
    fn test_lookups() {
        let ctx = context();
        let at = Location::Module;
        assert_eq!(ctx.func_type(1, at).unwrap().results, vec![ValueType::I64]);
        assert_eq!(
            ctx.func_type(2, at).unwrap_err(),
            Error::UnknownIndex {
                space: IndexSpace::Function,
                index: 2,
                location: at
            }
        );
        assert_eq!(ctx.memory(0, at).unwrap_err().kind(), ErrorKind::UnknownIndex);
        assert!(ctx.data(0, at).is_ok());
        assert_eq!(ctx.data(1, at).unwrap_err().kind(), ErrorKind::UnknownIndex);
        assert_eq!(
            ModuleContext::default().data(0, at).unwrap_err().kind(),
            ErrorKind::Invalid
        );
    }

    #[test]
    fn test_block_types() {
        let ctx = context();
        let at = Location::Module;
        assert_eq!(ctx.block_type(BlockType::Empty, at).unwrap(), (vec![], vec![]));
        assert_eq!(
            ctx.block_type(BlockType::Value(ValueType::F32), at).unwrap(),
            (vec![], vec![ValueType::F32])
        );
        assert_eq!(
            ctx.block_type(BlockType::FuncType(0), at).unwrap(),
            (vec![ValueType::I32], vec![ValueType::I64])
        );
        assert!(ctx.block_type(BlockType::FuncType(1), at).is_err());
    }
}
