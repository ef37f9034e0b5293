use std::io::Read;
use std::sync::Arc;

use serde_json::Value;
use tabula_api::{Cell, Column, ColumnDef, ColumnType, CursorError, Properties, Schema, Structured};
use tabula_core::TableValue;

use crate::config::MemoryCursorConfig;
use crate::cursor::{MemoryCursor, MemoryRow};

/// Tabular dataset as found in a JSON document:
///
/// ```json
/// {
///   "columns": [{"name": "id", "type": "int"}, {"name": "name", "type": "string"}],
///   "rows": [[1, "a"], [2, "b"]],
///   "properties": {"source": "fixtures"}
/// }
/// ```
///
/// `null` is NULL for every column type. Values are checked against the
/// declared column type when the dataset is turned into a cursor.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Dataset {
    pub columns: Vec<ColumnDef>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
    #[serde(default)]
    pub properties: Properties,
}

impl Dataset {
    pub fn from_json_str(s: &str) -> Result<Self, CursorError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, CursorError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn schema(&self) -> Schema {
        self.columns.iter().cloned().collect()
    }

    /// Convert rows to cells and build the cursor.
    pub fn into_cursor(
        self,
        config: &MemoryCursorConfig,
    ) -> Result<(Arc<Schema>, Properties, MemoryCursor), CursorError> {
        if self.rows.len() > config.max_rows {
            return Err(CursorError::format(format!(
                "dataset has {} rows, limit is {}",
                self.rows.len(),
                config.max_rows
            )));
        }

        let schema = Arc::new(self.schema());
        let mut rows = Vec::with_capacity(self.rows.len());
        for (r, values) in self.rows.into_iter().enumerate() {
            rows.push(
                convert_row(&schema, values).map_err(|e| e.with_context(format!("row {}", r + 1)))?,
            );
        }
        tracing::debug!(columns = schema.len(), rows = rows.len(), "dataset loaded");

        let cursor = MemoryCursor::new(Arc::clone(&schema), rows)?;
        Ok((schema, self.properties, cursor))
    }

    pub fn into_table(self, config: &MemoryCursorConfig) -> Result<TableValue, CursorError> {
        let (schema, properties, cursor) = self.into_cursor(config)?;
        Ok(TableValue::new(Box::new(cursor), properties, schema))
    }
}

fn convert_row(schema: &Schema, values: Vec<Value>) -> Result<MemoryRow, CursorError> {
    if values.len() != schema.len() {
        return Err(CursorError::format(format!(
            "expected {} cells, found {}",
            schema.len(),
            values.len()
        )));
    }
    schema
        .iter()
        .zip(values)
        .map(|(column, value)| {
            convert_value(column.column_type(), value)
                .map_err(|e| e.at_column(Column::Name(column.name())))
        })
        .collect()
}

fn convert_value(column_type: &ColumnType, value: Value) -> Result<Option<Cell>, CursorError> {
    let cell = match (column_type, value) {
        (_, Value::Null) => return Ok(None),
        (ColumnType::String, Value::String(s)) => Cell::String(s),
        (ColumnType::Int, Value::Number(n)) => match n.as_i64() {
            Some(i) => Cell::Int(i),
            None => return Err(CursorError::format(format!("{n} is not a 64-bit integer"))),
        },
        (ColumnType::Float, Value::Number(n)) => match n.as_f64() {
            Some(f) => Cell::Float(f),
            None => return Err(CursorError::format(format!("{n} is not a float"))),
        },
        (ColumnType::Boolean, Value::Bool(b)) => Cell::Bool(b),
        (ColumnType::Array, Value::Object(map)) => Cell::Structured(map),
        (ColumnType::Array, Value::Array(items)) => Cell::Structured(indexed(items)),
        (ColumnType::Other(_), value) => natural_cell(value),
        (expected, value) => {
            return Err(CursorError::format(format!(
                "expected {expected}, found {}",
                json_kind(&value)
            )));
        }
    };
    Ok(Some(cell))
}

/// Cell for a column of a type the core does not know; keeps the JSON shape.
fn natural_cell(value: Value) -> Cell {
    match value {
        Value::String(s) => Cell::String(s),
        Value::Bool(b) => Cell::Bool(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Cell::Int(i),
            None => Cell::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::Object(map) => Cell::Structured(map),
        Value::Array(items) => Cell::Structured(indexed(items)),
        Value::Null => Cell::String(String::new()),
    }
}

/// Array-valued structured cell: keys are the 0-based item positions, which
/// the document sources read back as a list.
fn indexed(items: Vec<Value>) -> Structured {
    items
        .into_iter()
        .enumerate()
        .map(|(i, v)| (i.to_string(), v))
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
