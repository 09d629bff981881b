//! The validation engine.
//!
//! Validation runs as the module is read: [`validate`] plugs a
//! [`ModuleValidator`] into the reader so that every section is checked as
//! soon as it is decoded, and the first violation stops both.

pub mod constant;
pub mod context;
pub mod dump;
pub mod function;
pub mod module;

use crate::config::Config;
use crate::error::Result;
use crate::parser;
use tracing::{debug, trace};

pub use function::{FunctionValidator, MaybeType};
pub use module::ModuleValidator;

/// Reads and validates `bytes` with the default configuration.
pub fn validate(bytes: &[u8]) -> Result<()> {
    validate_with_config(bytes, &Config::default())
}

pub fn validate_with_config(bytes: &[u8], config: &Config) -> Result<()> {
    let mut validator = ModuleValidator::new(config);
    match parser::read_with_config(bytes, config, &mut validator) {
        Ok(()) => {
            trace!(len = bytes.len(), "module is valid");
            Ok(())
        }
        Err(err) => {
            debug!(kind = ?err.kind(), error = %err, "module failed validation");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_validate_minimal_modules() {
        let empty = hex::decode("0061736d01000000").unwrap();
        validate(&empty).unwrap();

        // (func (result i32) i32.const 1)
        let module = hex::decode("0061736d01000000010501600001 7f03020100 0a0601040041010b".replace(' ', "")).unwrap();
        validate(&module).unwrap();

        // (func (result i32)) with an empty body
        let module = hex::decode("0061736d01000000010501600001 7f03020100 0a040102000b".replace(' ', "")).unwrap();
        assert_eq!(validate(&module).unwrap_err().kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_structural_errors_come_first() {
        let module = hex::decode("0061736d02000000").unwrap();
        assert_eq!(validate(&module).unwrap_err().kind(), ErrorKind::MalformedEncoding);
    }
}
