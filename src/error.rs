//! Error types for the settings persistence system.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Structural violations found while decoding a settings tree.
///
/// Offsets are byte positions into the buffer being decoded, so a caller
/// can point at the exact spot a corrupt file went wrong.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("unknown token byte {byte:#04x} at offset {offset}")]
    UnknownToken { offset: usize, byte: u8 },

    #[error("malformed length prefix at offset {offset}")]
    InvalidLength { offset: usize },

    #[error("length {length} at offset {offset} exceeds {remaining} remaining bytes")]
    LengthOutOfBounds {
        offset: usize,
        length: usize,
        remaining: usize,
    },

    #[error("malformed integer at offset {offset}")]
    InvalidInteger { offset: usize },

    #[error("nesting depth limit exceeded at offset {offset}")]
    DepthLimitExceeded { offset: usize },

    #[error("item limit exceeded at offset {offset}")]
    ItemLimitExceeded { offset: usize },

    #[error("trailing bytes after top-level value at offset {offset}")]
    TrailingBytes { offset: usize },
}

/// Errors surfaced by the settings store and its file protocol.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The settings file does not exist. Normal on first run; callers
    /// typically fall back to defaults.
    #[error("settings file not found: {0:?}")]
    NotFound(PathBuf),

    #[error("malformed settings data in {path:?}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    /// The file decoded cleanly but its top-level value is not a dictionary.
    #[error("settings file {path:?} does not contain a dictionary")]
    NotADictionary { path: PathBuf },

    #[error("{op} {path:?} failed: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(op: &'static str, path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    /// True when the error is the non-fatal "no settings file yet" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
