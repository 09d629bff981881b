//! Error taxonomy shared by the reader, the writer and the validator.
//!
//! Every failure is terminal for the unit being processed and carries the
//! byte offset or instruction position at which it was detected.

use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Where a failure was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Absolute byte offset into the module being read.
    Offset(usize),
    /// Instruction `index` (zero based) of function body `function`, where
    /// `function` counts imported functions first.
    Instruction { function: u32, index: usize },
    /// Instruction `index` of a constant expression.
    Expression { index: usize },
    /// A module-level rule with no single position.
    Module,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Offset(offset) => write!(f, "offset {:#x}", offset),
            Location::Instruction { function, index } => {
                write!(f, "function {} instruction {}", function, index)
            }
            Location::Expression { index } => write!(f, "constant expression instruction {}", index),
            Location::Module => write!(f, "module"),
        }
    }
}

/// The index spaces an `UnknownIndex` failure can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSpace {
    Type,
    Function,
    Table,
    Memory,
    Global,
    Local,
    Label,
    Element,
    Data,
}

impl fmt::Display for IndexSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IndexSpace::Type => "type",
            IndexSpace::Function => "function",
            IndexSpace::Table => "table",
            IndexSpace::Memory => "memory",
            IndexSpace::Global => "global",
            IndexSpace::Local => "local",
            IndexSpace::Label => "label",
            IndexSpace::Element => "element segment",
            IndexSpace::Data => "data segment",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("malformed encoding at offset {offset:#x}: {reason}")]
    MalformedEncoding { offset: usize, reason: String },

    #[error("unknown {space} {index} at {location}")]
    UnknownIndex {
        space: IndexSpace,
        index: u32,
        location: Location,
    },

    #[error("type mismatch at {location}: {reason}")]
    TypeMismatch { location: Location, reason: String },

    #[error("alignment must not be larger than natural at {location}: 2^{align} > {natural}")]
    InvalidAlignment {
        location: Location,
        align: u32,
        natural: u32,
    },

    #[error(
        "section {section} length mismatch at offset {offset:#x}: declared {declared}, consumed {consumed}"
    )]
    SectionLengthMismatch {
        section: u8,
        offset: usize,
        declared: usize,
        consumed: usize,
    },

    #[error("section {section} at offset {offset:#x} is duplicated or out of order")]
    DuplicateOrMisorderedSection { section: u8, offset: usize },

    #[error("invalid module at {location}: {reason}")]
    Invalid { location: Location, reason: String },

    #[error("{what} exceeds the configured limit of {limit} at offset {offset:#x}")]
    LimitExceeded {
        what: &'static str,
        limit: u64,
        offset: usize,
    },

    #[error("failed to read module source: {reason}")]
    Io { reason: String },
}

/// Fieldless discriminant of [`Error`], for matching on the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedEncoding,
    UnknownIndex,
    TypeMismatch,
    InvalidAlignment,
    SectionLengthMismatch,
    DuplicateOrMisorderedSection,
    Invalid,
    LimitExceeded,
    Io,
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            reason: err.to_string(),
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MalformedEncoding { .. } => ErrorKind::MalformedEncoding,
            Error::UnknownIndex { .. } => ErrorKind::UnknownIndex,
            Error::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Error::InvalidAlignment { .. } => ErrorKind::InvalidAlignment,
            Error::SectionLengthMismatch { .. } => ErrorKind::SectionLengthMismatch,
            Error::DuplicateOrMisorderedSection { .. } => ErrorKind::DuplicateOrMisorderedSection,
            Error::Invalid { .. } => ErrorKind::Invalid,
            Error::LimitExceeded { .. } => ErrorKind::LimitExceeded,
            Error::Io { .. } => ErrorKind::Io,
        }
    }

    /// The byte offset of the failure, when the failure has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::MalformedEncoding { offset, .. }
            | Error::SectionLengthMismatch { offset, .. }
            | Error::DuplicateOrMisorderedSection { offset, .. }
            | Error::LimitExceeded { offset, .. } => Some(*offset),
            Error::UnknownIndex { location, .. }
            | Error::TypeMismatch { location, .. }
            | Error::InvalidAlignment { location, .. }
            | Error::Invalid { location, .. } => match location {
                Location::Offset(offset) => Some(*offset),
                _ => None,
            },
            Error::Io { .. } => None,
        }
    }

    pub(crate) fn type_mismatch(location: Location, reason: impl Into<String>) -> Error {
        Error::TypeMismatch {
            location,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(location: Location, reason: impl Into<String>) -> Error {
        Error::Invalid {
            location,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Error {
        Error::MalformedEncoding {
            offset,
            reason: reason.into(),
        }
    }
}
