//! Reader and validator configuration.
//!
//! All knobs default to the limits in [`crate::parser::limits`]. A `Config`
//! can be built in code with the `with_*` setters or loaded from JSON, where
//! missing fields keep their defaults:
//!
//! ```
//! use kasm_visit::config::Config;
//!
//! let config = Config::from_json(r#"{ "strict_leb128": true, "max_nesting_depth": 64 }"#).unwrap();
//! assert!(config.strict_leb128);
//! assert_eq!(config.max_nesting_depth, 64);
//! assert_eq!(config.max_function_locals, 50_000);
//! ```

use crate::parser::limits;
use serde::{Deserialize, Serialize};

/// Optional extensions the validator may accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    /// Allow more than one memory to be declared or imported.
    ///
    /// This only lifts the memory count limit. A memory argument carries no
    /// memory index in the 2.0 binary format, so loads, stores and the bulk
    /// memory instructions still address memory 0, and a module with more
    /// than one memory validates them against memory 0 alone.
    pub multi_memory: bool,
    /// Reference types; among other things this allows more than one table.
    pub reference_types: bool,
}

impl Default for Features {
    fn default() -> Self {
        Features {
            multi_memory: false,
            reference_types: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reject LEB128 integers that use more bytes than necessary.
    pub strict_leb128: bool,
    pub max_nesting_depth: u32,
    pub max_types: u32,
    pub max_imports: u32,
    pub max_functions: u32,
    pub max_tables: u32,
    pub max_memories: u32,
    pub max_globals: u32,
    pub max_exports: u32,
    pub max_element_segments: u32,
    pub max_data_segments: u32,
    pub max_table_init_entries: u32,
    pub max_function_size: u32,
    pub max_function_params: u32,
    pub max_function_returns: u32,
    pub max_function_locals: u32,
    pub max_br_table_labels: u32,
    pub max_select_types: u32,
    pub max_memory_pages: u32,
    pub features: Features,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            strict_leb128: false,
            max_nesting_depth: limits::MAX_NESTING_DEPTH,
            max_types: limits::MAX_TYPES,
            max_imports: limits::MAX_IMPORTS,
            max_functions: limits::MAX_FUNCTIONS,
            max_tables: limits::MAX_TABLES,
            max_memories: limits::MAX_MEMORIES,
            max_globals: limits::MAX_GLOBALS,
            max_exports: limits::MAX_EXPORTS,
            max_element_segments: limits::MAX_ELEMENT_SEGMENTS,
            max_data_segments: limits::MAX_DATA_SEGMENTS,
            max_table_init_entries: limits::MAX_TABLE_INIT_ENTRIES,
            max_function_size: limits::MAX_FUNCTION_SIZE,
            max_function_params: limits::MAX_FUNCTION_PARAMS,
            max_function_returns: limits::MAX_FUNCTION_RETURNS,
            max_function_locals: limits::MAX_FUNCTION_LOCALS,
            max_br_table_labels: limits::MAX_BR_TABLE_LABELS,
            max_select_types: limits::MAX_SELECT_TYPES,
            max_memory_pages: limits::MAX_MEMORY_PAGES,
            features: Features::default(),
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Config, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_strict_leb128(mut self, strict: bool) -> Self {
        self.strict_leb128 = strict;
        self
    }

    pub fn with_max_nesting_depth(mut self, depth: u32) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    pub fn with_max_function_locals(mut self, locals: u32) -> Self {
        self.max_function_locals = locals;
        self
    }

    pub fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_limits() {
        let config = Config::default();
        assert!(!config.strict_leb128);
        assert_eq!(config.max_br_table_labels, limits::MAX_BR_TABLE_LABELS);
        assert_eq!(config.max_memory_pages, 65_536);
        assert!(config.features.reference_types);
        assert!(!config.features.multi_memory);
    }

    #[test]
    fn test_from_json_partial() {
        let config = Config::from_json(r#"{ "features": { "multi_memory": true } }"#).unwrap();
        assert!(config.features.multi_memory);
        assert!(config.features.reference_types);
        assert_eq!(config.max_types, limits::MAX_TYPES);
    }

    #[test]
    fn test_json_round_trip() {
        let config = Config::default().with_strict_leb128(true).with_max_nesting_depth(8);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(Config::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_from_json_rejects_wrong_types() {
        assert!(Config::from_json(r#"{ "strict_leb128": "yes" }"#).is_err());
    }
}
