//! lnedit — Transactional Line-Level File Editor
//!
//! This crate provides the line-addressed document buffer, the batch editor that
//! commits a list of edits as one all-or-nothing write, and the windowed reader
//! used by the `lnedit` and `readlines` CLIs and by agent tool calls.

mod batch;
mod document;
mod ops;
mod tool;
mod window;

#[cfg(feature = "pyo3")]
mod python;

pub use batch::{apply_batch, edit_text, preview_batch};
pub use document::Document;
pub use ops::{parse_operations_from_json, parse_operations_from_value, Content, EditOperation, Lines, RawEdit};
pub use tool::{edit_file, read_lines, EditFileInput, ReadLinesInput, ToolInfo, EDIT_FILE_TOOL, READ_LINES_TOOL};
pub use window::{format_tagged_line, read_window};

/// Class of an [`EditError`], for callers that branch on the failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    OutOfRange,
    InvalidOperation,
    Io,
}

/// Library error type.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("out of range: {0}")]
    OutOfRange(String),
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl EditError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::OutOfRange(_) => ErrorKind::OutOfRange,
            Self::InvalidOperation(_) => ErrorKind::InvalidOperation,
            Self::Io { .. } => ErrorKind::Io,
        }
    }
}
