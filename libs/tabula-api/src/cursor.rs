use std::fmt;

use crate::error::CursorError;
use crate::value::{Cell, CellKind, Structured};

/// Column address: 0-based position or exact (case-sensitive) name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column<'a> {
    Index(usize),
    Name(&'a str),
}

impl fmt::Display for Column<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Index(i) => write!(f, "#{i}"),
            Column::Name(name) => write!(f, "'{name}'"),
        }
    }
}

impl From<usize> for Column<'_> {
    fn from(i: usize) -> Self {
        Column::Index(i)
    }
}

impl<'a> From<&'a str> for Column<'a> {
    fn from(name: &'a str) -> Self {
        Column::Name(name)
    }
}

/// Forward-only, single-pass row cursor.
///
/// The table layer doesn't know concrete backends (query result set,
/// in-process array, ...). For the table, a backend is just this trait.
///
/// Contract:
/// - Getters are only called while positioned on a row (after `advance()`
///   returned `true`). The table layer enforces this before delegating.
/// - Type mismatch and I/O failures are returned as `CursorError`; they must
///   not leave the cursor in a corrupt state.
/// - `close()` releases resources exactly once in effect. It is valid before
///   the first `advance()` and repeated calls are no-ops.
/// - Getters return `Ok(None)` for NULL / absent values.
pub trait RowCursor: Send {
    /// Move to the next row. `false` means the cursor is exhausted.
    fn advance(&mut self) -> Result<bool, CursorError>;

    /// Release backing resources.
    fn close(&mut self);

    fn get_string(&mut self, column: Column<'_>) -> Result<Option<String>, CursorError>;
    fn get_int(&mut self, column: Column<'_>) -> Result<Option<i64>, CursorError>;
    fn get_float(&mut self, column: Column<'_>) -> Result<Option<f64>, CursorError>;
    fn get_bool(&mut self, column: Column<'_>) -> Result<Option<bool>, CursorError>;
    fn get_structured(&mut self, column: Column<'_>) -> Result<Option<Structured>, CursorError>;

    /// Text rendering of any column regardless of its declared type.
    fn get_as_string(&mut self, column: Column<'_>) -> Result<Option<String>, CursorError>;

    /// Read a column as the requested kind.
    ///
    /// Default: dispatch to the typed getter. Backends with a native
    /// coercion path can override it.
    fn get(&mut self, column: Column<'_>, kind: CellKind) -> Result<Option<Cell>, CursorError> {
        Ok(match kind {
            CellKind::String => self.get_string(column)?.map(Cell::String),
            CellKind::Int => self.get_int(column)?.map(Cell::Int),
            CellKind::Float => self.get_float(column)?.map(Cell::Float),
            CellKind::Bool => self.get_bool(column)?.map(Cell::Bool),
            CellKind::Structured => self.get_structured(column)?.map(Cell::Structured),
        })
    }
}

impl<C: RowCursor + ?Sized> RowCursor for Box<C> {
    fn advance(&mut self) -> Result<bool, CursorError> {
        (**self).advance()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn get_string(&mut self, column: Column<'_>) -> Result<Option<String>, CursorError> {
        (**self).get_string(column)
    }

    fn get_int(&mut self, column: Column<'_>) -> Result<Option<i64>, CursorError> {
        (**self).get_int(column)
    }

    fn get_float(&mut self, column: Column<'_>) -> Result<Option<f64>, CursorError> {
        (**self).get_float(column)
    }

    fn get_bool(&mut self, column: Column<'_>) -> Result<Option<bool>, CursorError> {
        (**self).get_bool(column)
    }

    fn get_structured(&mut self, column: Column<'_>) -> Result<Option<Structured>, CursorError> {
        (**self).get_structured(column)
    }

    fn get_as_string(&mut self, column: Column<'_>) -> Result<Option<String>, CursorError> {
        (**self).get_as_string(column)
    }

    fn get(&mut self, column: Column<'_>, kind: CellKind) -> Result<Option<Cell>, CursorError> {
        (**self).get(column, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Single-row cursor holding one int column.
    struct OneInt {
        rows_left: usize,
    }

    impl RowCursor for OneInt {
        fn advance(&mut self) -> Result<bool, CursorError> {
            if self.rows_left == 0 {
                return Ok(false);
            }
            self.rows_left -= 1;
            Ok(true)
        }

        fn close(&mut self) {}

        fn get_string(&mut self, c: Column<'_>) -> Result<Option<String>, CursorError> {
            Err(CursorError::type_mismatch(format!("{c} is int")))
        }

        fn get_int(&mut self, _: Column<'_>) -> Result<Option<i64>, CursorError> {
            Ok(Some(7))
        }

        fn get_float(&mut self, _: Column<'_>) -> Result<Option<f64>, CursorError> {
            Ok(Some(7.0))
        }

        fn get_bool(&mut self, c: Column<'_>) -> Result<Option<bool>, CursorError> {
            Err(CursorError::type_mismatch(format!("{c} is int")))
        }

        fn get_structured(&mut self, _: Column<'_>) -> Result<Option<Structured>, CursorError> {
            Ok(None)
        }

        fn get_as_string(&mut self, _: Column<'_>) -> Result<Option<String>, CursorError> {
            Ok(Some("7".into()))
        }
    }

    #[test]
    fn default_get_dispatches_by_kind() {
        let mut c: Box<dyn RowCursor> = Box::new(OneInt { rows_left: 1 });
        assert!(c.advance().unwrap());
        assert_eq!(c.get(Column::Index(0), CellKind::Int).unwrap(), Some(Cell::Int(7)));
        assert_eq!(c.get("n".into(), CellKind::Structured).unwrap(), None);
        let err = c.get(Column::Name("n"), CellKind::Bool).unwrap_err();
        assert_eq!(err.message, "'n' is int");
        assert!(!c.advance().unwrap());
    }
}
