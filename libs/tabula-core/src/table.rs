use std::fmt;
use std::sync::Arc;

use tabula_api::{Cell, CellKind, Column, CursorError, Properties, RowCursor, Schema, Structured};

use crate::document::json::JsonSource;
use crate::document::xml::XmlSource;
use crate::error::TableError;

/// Largest column index accepted by positional accessors.
///
/// The public index type is `i64`, internal addressing is limited to the
/// positive `i32` range.
pub const MAX_COLUMN_INDEX: i64 = i32::MAX as i64;

/// Logical cursor state tracked by the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    NotStarted,
    Positioned,
    Exhausted,
    Closed,
}

impl fmt::Display for CursorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CursorState::NotStarted => "not started",
            CursorState::Positioned => "positioned",
            CursorState::Exhausted => "exhausted",
            CursorState::Closed => "closed",
        })
    }
}

/// Tabular result: a forward-only cursor, its column schema and an opaque
/// property bag.
///
/// Owns the cursor exclusively. Holds no row buffer: every accessor is a
/// direct passthrough to the cursor at its current row.
///
/// The cursor is closed at most once: by `close()`, by a document source
/// reaching the end (or failing), or on drop.
pub struct TableValue {
    cursor: Box<dyn RowCursor>,
    properties: Properties,
    schema: Arc<Schema>,
    state: CursorState,
    rows_read: u64,
}

impl TableValue {
    pub fn new(cursor: Box<dyn RowCursor>, properties: Properties, schema: Arc<Schema>) -> Self {
        tracing::debug!(columns = schema.len(), "table opened");
        Self {
            cursor,
            properties,
            schema,
            state: CursorState::NotStarted,
            rows_read: 0,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn shared_schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == CursorState::Closed
    }

    /// Number of successful `advance()` calls so far.
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Move to the next row. Returns whether a row is now available.
    ///
    /// After `false` (or a cursor failure) the table is exhausted and any
    /// further `advance()` is a `CursorState` error.
    pub fn advance(&mut self) -> Result<bool, TableError> {
        match self.state {
            CursorState::Exhausted | CursorState::Closed => {
                return Err(TableError::CursorState { op: "advance", state: self.state });
            }
            CursorState::NotStarted | CursorState::Positioned => {}
        }

        match self.cursor.advance() {
            Ok(true) => {
                self.state = CursorState::Positioned;
                self.rows_read += 1;
                Ok(true)
            }
            Ok(false) => {
                self.state = CursorState::Exhausted;
                tracing::debug!(rows = self.rows_read, "cursor exhausted");
                Ok(false)
            }
            Err(e) => {
                self.state = CursorState::Exhausted;
                Err(TableError::Cursor(e).with_context(format!("advance after row {}", self.rows_read)))
            }
        }
    }

    /// Release the cursor. Safe to call any number of times, in any state.
    pub fn close(&mut self) {
        if self.state == CursorState::Closed {
            return;
        }
        self.cursor.close();
        self.state = CursorState::Closed;
        tracing::debug!(rows = self.rows_read, "table closed");
    }

    /// Render as an array of row-objects, pulled lazily.
    pub fn to_json(self) -> JsonSource {
        JsonSource::new(self)
    }

    /// Render as a root element of row elements, pulled lazily.
    ///
    /// `None` names fall back to `results` / `result`.
    pub fn to_xml(self, root: Option<&str>, row: Option<&str>) -> XmlSource {
        XmlSource::new(self, root, row)
    }

    // ---- positional accessors ----

    pub fn get_string(&mut self, index: i64) -> Result<Option<String>, TableError> {
        let column = check_index(index)?;
        self.read("get_string", column, |c, col| c.get_string(col))
    }

    pub fn get_int(&mut self, index: i64) -> Result<Option<i64>, TableError> {
        let column = check_index(index)?;
        self.read("get_int", column, |c, col| c.get_int(col))
    }

    pub fn get_float(&mut self, index: i64) -> Result<Option<f64>, TableError> {
        let column = check_index(index)?;
        self.read("get_float", column, |c, col| c.get_float(col))
    }

    pub fn get_bool(&mut self, index: i64) -> Result<Option<bool>, TableError> {
        let column = check_index(index)?;
        self.read("get_bool", column, |c, col| c.get_bool(col))
    }

    pub fn get_structured(&mut self, index: i64) -> Result<Option<Structured>, TableError> {
        let column = check_index(index)?;
        self.read("get_structured", column, |c, col| c.get_structured(col))
    }

    pub fn get_as_string(&mut self, index: i64) -> Result<Option<String>, TableError> {
        let column = check_index(index)?;
        self.read("get_as_string", column, |c, col| c.get_as_string(col))
    }

    pub fn get(&mut self, index: i64, kind: CellKind) -> Result<Option<Cell>, TableError> {
        let column = check_index(index)?;
        self.read("get", column, |c, col| c.get(col, kind))
    }

    // ---- by-name accessors ----

    pub fn get_string_by_name(&mut self, name: &str) -> Result<Option<String>, TableError> {
        self.read("get_string", Column::Name(name), |c, col| c.get_string(col))
    }

    pub fn get_int_by_name(&mut self, name: &str) -> Result<Option<i64>, TableError> {
        self.read("get_int", Column::Name(name), |c, col| c.get_int(col))
    }

    pub fn get_float_by_name(&mut self, name: &str) -> Result<Option<f64>, TableError> {
        self.read("get_float", Column::Name(name), |c, col| c.get_float(col))
    }

    pub fn get_bool_by_name(&mut self, name: &str) -> Result<Option<bool>, TableError> {
        self.read("get_bool", Column::Name(name), |c, col| c.get_bool(col))
    }

    pub fn get_structured_by_name(&mut self, name: &str) -> Result<Option<Structured>, TableError> {
        self.read("get_structured", Column::Name(name), |c, col| c.get_structured(col))
    }

    pub fn get_as_string_by_name(&mut self, name: &str) -> Result<Option<String>, TableError> {
        self.read("get_as_string", Column::Name(name), |c, col| c.get_as_string(col))
    }

    pub fn get_by_name(&mut self, name: &str, kind: CellKind) -> Result<Option<Cell>, TableError> {
        self.read("get", Column::Name(name), |c, col| c.get(col, kind))
    }

    /// Read column `index` of the current row with the getter selected by
    /// `kind`; `None` kind means string coercion.
    pub(crate) fn read_column(
        &mut self,
        index: usize,
        kind: Option<CellKind>,
    ) -> Result<Option<Cell>, TableError> {
        let column = Column::Index(index);
        match kind {
            Some(kind) => self.read("get", column, |c, col| c.get(col, kind)),
            None => Ok(self
                .read("get_as_string", column, |c, col| c.get_as_string(col))?
                .map(Cell::String)),
        }
    }

    fn read<'n, T>(
        &mut self,
        op: &'static str,
        column: Column<'n>,
        f: impl FnOnce(&mut dyn RowCursor, Column<'n>) -> Result<T, CursorError>,
    ) -> Result<T, TableError> {
        if self.state != CursorState::Positioned {
            return Err(TableError::CursorState { op, state: self.state });
        }
        f(self.cursor.as_mut(), column).map_err(TableError::from)
    }
}

impl Drop for TableValue {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for TableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableValue")
            .field("schema", &self.schema)
            .field("properties", &self.properties)
            .field("state", &self.state)
            .field("rows_read", &self.rows_read)
            .finish_non_exhaustive()
    }
}

fn check_index(index: i64) -> Result<Column<'static>, TableError> {
    if !(0..=MAX_COLUMN_INDEX).contains(&index) {
        return Err(TableError::IndexTooLarge(index));
    }
    Ok(Column::Index(index as usize))
}
