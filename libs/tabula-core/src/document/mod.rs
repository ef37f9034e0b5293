//! Lazy document sources over a `TableValue`.
//!
//! Both sources pull one row per step from the cursor and hand it to the
//! consuming serializer as a structural event, so memory stays bounded by a
//! single row. Whatever ends the stream (exhaustion or failure) closes the
//! cursor first; a failure is then yielded once and the source is fused.

pub mod json;
pub mod xml;

use std::sync::Arc;

use tabula_api::{Cell, CellKind, Schema};

use crate::error::TableError;
use crate::table::TableValue;

pub(crate) enum Step {
    Open,
    /// Cells of one row, in column order.
    Row(Vec<Option<Cell>>),
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    Rows,
    Done,
}

/// Pull loop shared by the JSON and XML sources.
pub(crate) struct RowPuller {
    table: TableValue,
    schema: Arc<Schema>,
    /// Getter per column, chosen from the declared type. `None` = string coercion.
    kinds: Vec<Option<CellKind>>,
    phase: Phase,
    rows_emitted: u64,
}

impl RowPuller {
    pub(crate) fn new(table: TableValue) -> Self {
        let schema = table.shared_schema();
        let kinds = schema
            .iter()
            .map(|c| CellKind::for_column(c.column_type()))
            .collect();
        Self {
            table,
            schema,
            kinds,
            phase: Phase::Start,
            rows_emitted: 0,
        }
    }

    pub(crate) fn schema(&self) -> &Schema {
        &self.schema
    }

    pub(crate) fn table(&self) -> &TableValue {
        &self.table
    }

    pub(crate) fn rows_emitted(&self) -> u64 {
        self.rows_emitted
    }

    /// Next structural step. `None` once the stream ended or failed.
    pub(crate) fn pull(&mut self) -> Option<Result<Step, TableError>> {
        match self.phase {
            Phase::Done => None,
            Phase::Start => {
                self.phase = Phase::Rows;
                Some(Ok(Step::Open))
            }
            Phase::Rows => match self.table.advance() {
                Ok(true) => match self.read_row() {
                    Ok(cells) => {
                        self.rows_emitted += 1;
                        tracing::trace!(row = self.rows_emitted, "row emitted");
                        Some(Ok(Step::Row(cells)))
                    }
                    Err(e) => Some(Err(self.abort(e))),
                },
                Ok(false) => {
                    self.table.close();
                    self.phase = Phase::Done;
                    tracing::debug!(rows = self.rows_emitted, "document stream finished");
                    Some(Ok(Step::Close))
                }
                Err(e) => Some(Err(self.abort(e))),
            },
        }
    }

    fn read_row(&mut self) -> Result<Vec<Option<Cell>>, TableError> {
        let mut cells = Vec::with_capacity(self.kinds.len());
        for (index, kind) in self.kinds.iter().enumerate() {
            let cell = self.table.read_column(index, *kind).map_err(|e| {
                let name = self.schema.column(index).map(|c| c.name()).unwrap_or_default();
                e.with_context(format!("row {}, column '{name}'", self.rows_emitted + 1))
            })?;
            cells.push(cell);
        }
        Ok(cells)
    }

    fn abort(&mut self, e: TableError) -> TableError {
        self.table.close();
        self.phase = Phase::Done;
        tracing::warn!(rows = self.rows_emitted, error = %e, "document stream aborted");
        e
    }
}
