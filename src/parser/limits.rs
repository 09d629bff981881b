//! Defaults for the [`crate::config::Config`] ceilings.
//!
//! Every count read from a module is checked against one of these before
//! anything is allocated for it, so a few bytes claiming a billion entries
//! fail with `LimitExceeded` instead of exhausting memory. The values follow
//! V8's `wasm-limits.h`.

// Entries per section.
pub const MAX_TYPES: u32 = 1_000_000;
pub const MAX_IMPORTS: u32 = 1_000_000;
pub const MAX_FUNCTIONS: u32 = 1_000_000;
pub const MAX_GLOBALS: u32 = 1_000_000;
pub const MAX_EXPORTS: u32 = 1_000_000;
pub const MAX_TABLES: u32 = 100_000;
/// Only more than one memory with the multi-memory feature.
pub const MAX_MEMORIES: u32 = 100_000;
pub const MAX_ELEMENT_SEGMENTS: u32 = 100_000;
pub const MAX_DATA_SEGMENTS: u32 = 100_000;

/// Function indices or initializer expressions in one element segment.
pub const MAX_TABLE_INIT_ENTRIES: u32 = 10_000_000;

// Per function. Locals are counted after the run-length groups are expanded.
pub const MAX_FUNCTION_SIZE: u32 = 7_654_321;
pub const MAX_FUNCTION_PARAMS: u32 = 1_000;
pub const MAX_FUNCTION_RETURNS: u32 = 1_000;
pub const MAX_FUNCTION_LOCALS: u32 = 50_000;

/// Open blocks, loops and ifs within one expression.
pub const MAX_NESTING_DEPTH: u32 = 1_024;

// Per instruction.
pub const MAX_BR_TABLE_LABELS: u32 = 65_536;
pub const MAX_SELECT_TYPES: u32 = 1_000;

/// 64 KiB pages addressable with 32-bit memory indices, i.e. 4 GiB.
pub const MAX_MEMORY_PAGES: u32 = 65_536;
