//! A streaming reader, writer and validator for WebAssembly binary modules.
//!
//! Nothing here builds a module tree. The reader walks the binary format and
//! reports what it decodes through the visitor traits in
//! [`parser::visitor`]; anything implementing those traits can consume a
//! module, including the writer in [`encoder`] and the validator in
//! [`validate`].
//!
//! # Modules
//!
//! - [`parser`] -- Binary format decoder, opcode tables and the visitor protocol.
//! - [`encoder`] -- Binary encoder driven by the same visitor calls.
//! - [`validate`] -- Type checking of function bodies and module-level rules.
//! - [`config`] -- Decoder limits and validation features.
//! - [`error`] -- The error type shared by all of the above.
//!
//! # Example
//!
//! Validate a module, then copy it through the writer:
//!
//! ```
//! use kasm_visit::encoder::ModuleWriter;
//! use kasm_visit::{parser, validate};
//!
//! // (module (func (result i32) i32.const 1))
//! let bytes = hex::decode("0061736d010000000105016000017f030201000a0601040041010b").unwrap();
//! validate::validate(&bytes).unwrap();
//!
//! let mut writer = ModuleWriter::new();
//! parser::read(&bytes, &mut writer).unwrap();
//! assert_eq!(writer.finish().unwrap(), bytes);
//! ```
//!
//! # Format
//!
//! Follows the [WebAssembly 2.0](https://webassembly.github.io/spec/core/)
//! binary format, including bulk memory operations, reference types, and the
//! full SIMD instruction set.

pub mod config;
pub mod encoder;
pub mod error;
pub mod parser;
pub mod validate;
