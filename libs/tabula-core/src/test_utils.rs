use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tabula_api::{Cell, CellKind, Column, ColumnDef, ColumnType, CursorError, RowCursor, Schema, Structured};

/// Counters shared between a `StubCursor` and the test observing it.
#[derive(Default)]
pub struct CallLog {
    touches: AtomicUsize,
    advances: AtomicUsize,
    closes: AtomicUsize,
}

impl CallLog {
    /// Any call into the cursor, including `advance` and `close`.
    pub fn touches(&self) -> usize {
        self.touches.load(Ordering::SeqCst)
    }

    pub fn advances(&self) -> usize {
        self.advances.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// Recording cursor over fixed rows. Counts every call and `close()`
/// invocations (not deduplicated, so double closes are visible).
pub struct StubCursor {
    schema: Arc<Schema>,
    rows: std::vec::IntoIter<Vec<Option<Cell>>>,
    current: Option<Vec<Option<Cell>>>,
    fail_on_advance: Option<usize>,
    calls: Arc<CallLog>,
}

impl StubCursor {
    pub fn new(schema: Arc<Schema>, rows: Vec<Vec<Option<Cell>>>) -> (Self, Arc<CallLog>) {
        let calls = Arc::new(CallLog::default());
        let cursor = Self {
            schema,
            rows: rows.into_iter(),
            current: None,
            fail_on_advance: None,
            calls: Arc::clone(&calls),
        };
        (cursor, calls)
    }

    /// Make the `n`-th `advance()` call (1-based) fail with an I/O error.
    pub fn fail_on_advance(mut self, n: usize) -> Self {
        self.fail_on_advance = Some(n);
        self
    }

    fn cell(&self, column: Column<'_>) -> Result<Option<Cell>, CursorError> {
        self.calls.touches.fetch_add(1, Ordering::SeqCst);
        let row = self
            .current
            .as_ref()
            .ok_or_else(|| CursorError::state("not positioned on a row"))?;
        let index = match column {
            Column::Index(i) => i,
            Column::Name(name) => self
                .schema
                .index_of(name)
                .ok_or_else(|| CursorError::no_such_column(format!("column {column}")))?,
        };
        row.get(index)
            .cloned()
            .ok_or_else(|| CursorError::no_such_column(format!("column {column}")))
    }
}

impl RowCursor for StubCursor {
    fn advance(&mut self) -> Result<bool, CursorError> {
        self.calls.touches.fetch_add(1, Ordering::SeqCst);
        let n = self.calls.advances.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_advance == Some(n) {
            self.current = None;
            return Err(CursorError::io("connection lost"));
        }
        self.current = self.rows.next();
        Ok(self.current.is_some())
    }

    fn close(&mut self) {
        self.calls.touches.fetch_add(1, Ordering::SeqCst);
        self.calls.closes.fetch_add(1, Ordering::SeqCst);
        self.current = None;
    }

    fn get_string(&mut self, column: Column<'_>) -> Result<Option<String>, CursorError> {
        match self.cell(column)? {
            None => Ok(None),
            Some(Cell::String(s)) => Ok(Some(s)),
            Some(other) => Err(CursorError::mismatch(column, CellKind::String, other.kind())),
        }
    }

    fn get_int(&mut self, column: Column<'_>) -> Result<Option<i64>, CursorError> {
        match self.cell(column)? {
            None => Ok(None),
            Some(Cell::Int(n)) => Ok(Some(n)),
            Some(other) => Err(CursorError::mismatch(column, CellKind::Int, other.kind())),
        }
    }

    fn get_float(&mut self, column: Column<'_>) -> Result<Option<f64>, CursorError> {
        match self.cell(column)? {
            None => Ok(None),
            Some(Cell::Float(f)) => Ok(Some(f)),
            Some(other) => Err(CursorError::mismatch(column, CellKind::Float, other.kind())),
        }
    }

    fn get_bool(&mut self, column: Column<'_>) -> Result<Option<bool>, CursorError> {
        match self.cell(column)? {
            None => Ok(None),
            Some(Cell::Bool(b)) => Ok(Some(b)),
            Some(other) => Err(CursorError::mismatch(column, CellKind::Bool, other.kind())),
        }
    }

    fn get_structured(&mut self, column: Column<'_>) -> Result<Option<Structured>, CursorError> {
        match self.cell(column)? {
            None => Ok(None),
            Some(Cell::Structured(m)) => Ok(Some(m)),
            Some(other) => Err(CursorError::mismatch(column, CellKind::Structured, other.kind())),
        }
    }

    fn get_as_string(&mut self, column: Column<'_>) -> Result<Option<String>, CursorError> {
        Ok(self.cell(column)?.map(|c| c.render()))
    }
}

pub fn id_name_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        ColumnDef::new("id", ColumnType::Int),
        ColumnDef::new("name", ColumnType::String),
    ]))
}

pub fn id_name_rows() -> Vec<Vec<Option<Cell>>> {
    vec![
        vec![Some(Cell::Int(1)), Some(Cell::from("a"))],
        vec![Some(Cell::Int(2)), Some(Cell::from("b"))],
    ]
}
