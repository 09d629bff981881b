//! Decoding side of the toolkit: the byte cursor, the primitive codec, the
//! opcode tables and the module reader that drives a [`ModuleVisitor`].

pub mod attributes;
pub mod encoding;
pub mod events;
pub mod limits;
pub mod module_reader;
pub mod opcodes;
pub mod reader;
pub mod types;
pub mod visitor;

use crate::config::Config;
use crate::error::Result;
use std::io;
use visitor::ModuleVisitor;

pub use module_reader::ModuleReader;

/// Reads `bytes` with the default configuration, reporting every decoded
/// element to `visitor`.
pub fn read(bytes: &[u8], visitor: &mut dyn ModuleVisitor) -> Result<()> {
    ModuleReader::new(bytes).accept(visitor)
}

pub fn read_with_config(bytes: &[u8], config: &Config, visitor: &mut dyn ModuleVisitor) -> Result<()> {
    ModuleReader::with_config(bytes, config).accept(visitor)
}

/// Drains `source` and reads the result. The module is decoded only after
/// the whole source has been read, so I/O errors never interleave with
/// visitor calls.
pub fn read_from<R: io::Read>(mut source: R, visitor: &mut dyn ModuleVisitor) -> Result<()> {
    let mut bytes = Vec::new();
    source.read_to_end(&mut bytes)?;
    read(&bytes, visitor)
}
