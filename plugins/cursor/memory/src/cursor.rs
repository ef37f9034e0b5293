use std::sync::Arc;

use tabula_api::{Cell, CellKind, Column, CursorError, RowCursor, Schema, Structured};

/// One row of cells in column order. `None` is NULL.
pub type MemoryRow = Vec<Option<Cell>>;

// ════════════════════════════════════════════════════════════════
//  MemoryCursor
// ════════════════════════════════════════════════════════════════

/// Forward-only cursor over rows held in memory.
///
/// Rows already visited are dropped as the cursor advances.
pub struct MemoryCursor {
    schema: Arc<Schema>,
    rows: std::vec::IntoIter<MemoryRow>,
    current: Option<MemoryRow>,
    closed: bool,
}

impl MemoryCursor {
    /// Every row must have exactly one cell per schema column.
    pub fn new(schema: Arc<Schema>, rows: Vec<MemoryRow>) -> Result<Self, CursorError> {
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != schema.len()) {
            return Err(CursorError::format(format!(
                "row {}: expected {} cells, found {}",
                i + 1,
                schema.len(),
                row.len()
            )));
        }
        Ok(Self {
            schema,
            rows: rows.into_iter(),
            current: None,
            closed: false,
        })
    }

    /// Rows not yet visited.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }

    fn position(&self, column: Column<'_>) -> Result<usize, CursorError> {
        match column {
            Column::Index(i) if i < self.schema.len() => Ok(i),
            Column::Index(i) => Err(CursorError::no_such_column(format!(
                "column #{i} out of range, table has {} columns",
                self.schema.len()
            ))),
            Column::Name(name) => self
                .schema
                .index_of(name)
                .ok_or_else(|| CursorError::no_such_column(format!("no column named '{name}'"))),
        }
    }

    fn cell(&self, column: Column<'_>) -> Result<Option<&Cell>, CursorError> {
        if self.closed {
            return Err(CursorError::state("cursor is closed"));
        }
        let row = self
            .current
            .as_ref()
            .ok_or_else(|| CursorError::state("cursor is not positioned on a row"))?;
        let index = self.position(column)?;
        Ok(row[index].as_ref())
    }
}

impl RowCursor for MemoryCursor {
    fn advance(&mut self) -> Result<bool, CursorError> {
        if self.closed {
            return Err(CursorError::state("advance on closed cursor"));
        }
        self.current = self.rows.next();
        Ok(self.current.is_some())
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.current = None;
        let dropped = self.rows.len();
        self.rows = Vec::new().into_iter();
        tracing::trace!(dropped, "memory cursor closed");
    }

    fn get_string(&mut self, column: Column<'_>) -> Result<Option<String>, CursorError> {
        match self.cell(column)? {
            None => Ok(None),
            Some(Cell::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(CursorError::mismatch(column, CellKind::String, other.kind())),
        }
    }

    fn get_int(&mut self, column: Column<'_>) -> Result<Option<i64>, CursorError> {
        match self.cell(column)? {
            None => Ok(None),
            Some(Cell::Int(n)) => Ok(Some(*n)),
            Some(other) => Err(CursorError::mismatch(column, CellKind::Int, other.kind())),
        }
    }

    /// Int cells widen to float.
    fn get_float(&mut self, column: Column<'_>) -> Result<Option<f64>, CursorError> {
        match self.cell(column)? {
            None => Ok(None),
            Some(Cell::Float(f)) => Ok(Some(*f)),
            Some(Cell::Int(n)) => Ok(Some(*n as f64)),
            Some(other) => Err(CursorError::mismatch(column, CellKind::Float, other.kind())),
        }
    }

    fn get_bool(&mut self, column: Column<'_>) -> Result<Option<bool>, CursorError> {
        match self.cell(column)? {
            None => Ok(None),
            Some(Cell::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(CursorError::mismatch(column, CellKind::Bool, other.kind())),
        }
    }

    fn get_structured(&mut self, column: Column<'_>) -> Result<Option<Structured>, CursorError> {
        match self.cell(column)? {
            None => Ok(None),
            Some(Cell::Structured(m)) => Ok(Some(m.clone())),
            Some(other) => Err(CursorError::mismatch(column, CellKind::Structured, other.kind())),
        }
    }

    fn get_as_string(&mut self, column: Column<'_>) -> Result<Option<String>, CursorError> {
        Ok(self.cell(column)?.map(Cell::render))
    }
}
