//! Error types shared across the crate.

use thiserror::Error;

/// Errors produced while parsing, transforming or checking a TinyScript
/// program.
#[derive(Debug, Error)]
pub enum Error {
    /// The input cannot be parsed into an AST.
    #[error("parse error at byte offset {offset}: {message}")]
    Parse {
        /// Byte offset into the source text where parsing failed.
        offset: usize,
        /// Human-readable description of what was expected.
        message: String,
    },

    /// A source program used a reserved ghost identifier, e.g. `#steps`.
    #[error("identifier {0:?} is reserved for instrumentation ghost state")]
    ReservedIdentifier(String),

    /// The solver could not be queried (e.g. a malformed timeout).
    #[error("solver error: {0}")]
    Solver(String),

    /// I/O failure while reading a source file.
    #[error("failed to read input file: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;
