//! Error types for the Z-machine core.
//!
//! `LoadError` covers the failures that can occur while constructing an
//! [`crate::engine::Engine`] from a story file stream. `ZError` is the wider
//! enum covering everything that can go wrong once the engine is running;
//! every `LoadError` converts into a `ZError` so callers that only care
//! about one error surface can still propagate with `?`.

use thiserror::Error;

/// Errors that can occur while loading a story file and constructing an engine.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read story file: {0}")]
    CantReadStoryFile(String),

    #[error("unsupported story file version: {found}")]
    UnsupportedVersion { found: u8 },

    #[error("invalid story file: {reason}")]
    InvalidStoryFile { reason: String },
}

/// Errors that can occur during engine construction or execution.
#[derive(Debug, Error)]
pub enum ZError {
    #[error("could not read story file: {0}")]
    CantReadStoryFile(String),

    #[error("unsupported story file version: {found}")]
    UnsupportedVersion { found: u8 },

    #[error("invalid story file: {reason}")]
    InvalidStoryFile { reason: String },

    #[error("unimplemented instruction: {category} opcode {opcode:#04x}")]
    UnimplementedInstruction { category: &'static str, opcode: u8 },

    #[error("wrong number of operands for {mnemonic}: got {got}, expected {expected}")]
    WrongNumberOfInstructionOperands {
        mnemonic: &'static str,
        got: usize,
        expected: &'static str,
    },

    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<LoadError> for ZError {
    fn from(e: LoadError) -> Self {
        match e {
            LoadError::CantReadStoryFile(s) => ZError::CantReadStoryFile(s),
            LoadError::UnsupportedVersion { found } => ZError::UnsupportedVersion { found },
            LoadError::InvalidStoryFile { reason } => ZError::InvalidStoryFile { reason },
        }
    }
}
