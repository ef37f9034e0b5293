use std::fmt;

use crate::cursor::Column;
use crate::value::CellKind;

/// Error kind for cursor errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Cursor used after exhaustion/close, or before the first row.
    State,
    /// Column name or position not present in the row.
    NoSuchColumn,
    /// Requested getter does not match the stored value.
    TypeMismatch,
    /// Backing data source failed (connectivity, read error).
    Io,
    /// Malformed data coming from the backing source.
    Format,
}

/// Cursor error, returned by all `RowCursor` methods.
///
/// Opaque to the table layer: it is propagated unchanged.
#[derive(Debug, Clone)]
pub struct CursorError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CursorError {
    pub fn state(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::State, message: msg.into() }
    }

    pub fn no_such_column(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::NoSuchColumn, message: msg.into() }
    }

    pub fn type_mismatch(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::TypeMismatch, message: msg.into() }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Io, message: msg.into() }
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Format, message: msg.into() }
    }

    /// Getter kind does not match the value stored in `column`.
    pub fn mismatch(column: Column<'_>, expected: CellKind, found: CellKind) -> Self {
        Self::type_mismatch(format!("expected {expected}, found {found}")).at_column(column)
    }

    /// Prefix the message with the column address: `"column 'name': ..."` or
    /// `"column #2: ..."`.
    pub fn at_column(self, column: Column<'_>) -> Self {
        self.with_context(format!("column {column}"))
    }

    /// Add context to the error, preserving the original ErrorKind.
    ///
    /// Produces: `"context: original message"`.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
        }
    }
}

impl fmt::Display for CursorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for CursorError {}

// ---------------------------------------------------------------------------
// From impls: standard error types → CursorError with correct ErrorKind
// ---------------------------------------------------------------------------

impl From<std::io::Error> for CursorError {
    fn from(e: std::io::Error) -> Self {
        Self::io(e.to_string())
    }
}

impl From<serde_json::Error> for CursorError {
    fn from(e: serde_json::Error) -> Self {
        Self::format(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_prepended_and_kind_kept() {
        let e = CursorError::type_mismatch("expected int").with_context("column 'id'");
        assert_eq!(e.kind, ErrorKind::TypeMismatch);
        assert_eq!(e.to_string(), "TypeMismatch: column 'id': expected int");
    }

    #[test]
    fn mismatch_names_column_and_both_kinds() {
        let e = CursorError::mismatch(Column::Index(2), CellKind::Bool, CellKind::Structured);
        assert_eq!(e.kind, ErrorKind::TypeMismatch);
        assert_eq!(e.message, "column #2: expected boolean, found structured");

        let e = CursorError::format("1.5 is not a 64-bit integer").at_column(Column::Name("id"));
        assert_eq!(e.kind, ErrorKind::Format);
        assert_eq!(e.message, "column 'id': 1.5 is not a 64-bit integer");
    }

    #[test]
    fn io_errors_map_to_io_kind() {
        let e: CursorError = std::io::Error::other("connection reset").into();
        assert_eq!(e.kind, ErrorKind::Io);
    }
}
