use serde_json::{Map, Value};
use tabula_api::Cell;

use crate::document::{RowPuller, Step};
use crate::error::TableError;
use crate::table::TableValue;

/// Structural event of the JSON-shaped document: an array of row-objects.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonEvent {
    StartArray,
    /// Column name → cell value. NULL cells are `null`; structured cells are
    /// nested objects, or arrays when keyed by position.
    Row(Map<String, Value>),
    EndArray,
}

/// Lazy JSON-shaped document over a table.
///
/// Yields `StartArray`, one `Row` per successful `advance()`, then `EndArray`.
/// The cursor is closed before `EndArray` or before an error is yielded.
///
/// With duplicate column names the row-object keeps the first key position
/// and the value of the last column carrying that name.
pub struct JsonSource {
    puller: RowPuller,
}

impl JsonSource {
    pub fn new(table: TableValue) -> Self {
        Self { puller: RowPuller::new(table) }
    }

    pub fn rows_emitted(&self) -> u64 {
        self.puller.rows_emitted()
    }

    pub fn table(&self) -> &TableValue {
        self.puller.table()
    }

    /// Drain the source into a single JSON array.
    ///
    /// Materializes every row; meant for small results and tests.
    pub fn into_array(self) -> Result<Value, TableError> {
        let mut rows = Vec::new();
        for event in self {
            if let JsonEvent::Row(row) = event? {
                rows.push(Value::Object(row));
            }
        }
        Ok(Value::Array(rows))
    }

    fn row_object(&self, cells: Vec<Option<Cell>>) -> Map<String, Value> {
        let mut row = Map::with_capacity(cells.len());
        for (column, cell) in self.puller.schema().iter().zip(cells) {
            let value = cell.map(|c| c.into_json()).unwrap_or(Value::Null);
            row.insert(column.name().to_string(), value);
        }
        row
    }
}

impl Iterator for JsonSource {
    type Item = Result<JsonEvent, TableError>;

    fn next(&mut self) -> Option<Self::Item> {
        let step = match self.puller.pull()? {
            Ok(step) => step,
            Err(e) => return Some(Err(e)),
        };
        Some(Ok(match step {
            Step::Open => JsonEvent::StartArray,
            Step::Row(cells) => JsonEvent::Row(self.row_object(cells)),
            Step::Close => JsonEvent::EndArray,
        }))
    }
}

impl std::iter::FusedIterator for JsonSource {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{id_name_rows, id_name_schema, StubCursor};
    use serde_json::json;
    use std::sync::Arc;
    use tabula_api::{Cell, ColumnDef, ColumnType, ErrorKind, Properties, Schema, Structured};

    fn rows(source: JsonSource) -> Vec<Result<JsonEvent, TableError>> {
        source.collect()
    }

    #[test]
    fn renders_rows_in_cursor_order() {
        let (cursor, calls) = StubCursor::new(id_name_schema(), id_name_rows());
        let table = TableValue::new(Box::new(cursor), Properties::new(), id_name_schema());

        let value = table.to_json().into_array().unwrap();
        assert_eq!(value, json!([{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]));
        assert_eq!(value.to_string(), r#"[{"id":1,"name":"a"},{"id":2,"name":"b"}]"#);
        assert_eq!(calls.closes(), 1);
    }

    #[test]
    fn emits_one_row_per_successful_advance() {
        let many: Vec<_> = (0..50)
            .map(|i| vec![Some(Cell::Int(i)), Some(Cell::String(format!("n{i}")))])
            .collect();
        let (cursor, calls) = StubCursor::new(id_name_schema(), many);
        let table = TableValue::new(Box::new(cursor), Properties::new(), id_name_schema());

        let mut source = table.to_json();
        assert_eq!(source.next().unwrap().unwrap(), JsonEvent::StartArray);
        let mut ids = Vec::new();
        for event in source.by_ref() {
            match event.unwrap() {
                JsonEvent::Row(row) => ids.push(row["id"].as_i64().unwrap()),
                JsonEvent::EndArray => break,
                JsonEvent::StartArray => panic!("second StartArray"),
            }
        }
        assert_eq!(ids, (0..50).collect::<Vec<_>>());
        assert_eq!(source.rows_emitted(), 50);
        assert_eq!(calls.advances(), 51);
        assert!(source.next().is_none());
    }

    #[test]
    fn cursor_failure_mid_stream_closes_then_propagates() {
        let (cursor, calls) = StubCursor::new(id_name_schema(), id_name_rows());
        let cursor = cursor.fail_on_advance(3);
        let table = TableValue::new(Box::new(cursor), Properties::new(), id_name_schema());

        let events = rows(table.to_json());
        assert_eq!(events.len(), 4);
        let emitted = events
            .iter()
            .filter(|e| matches!(e, Ok(JsonEvent::Row(_))))
            .count();
        assert_eq!(emitted, 2);
        match events.last() {
            Some(Err(TableError::Cursor(e))) => assert_eq!(e.kind, ErrorKind::Io),
            other => panic!("expected cursor error, got {other:?}"),
        }
        assert!(!events.iter().any(|e| matches!(e, Ok(JsonEvent::EndArray))));
        assert_eq!(calls.closes(), 1);
    }

    #[test]
    fn close_happens_before_error_is_observed() {
        let (cursor, calls) = StubCursor::new(id_name_schema(), id_name_rows());
        let table = TableValue::new(Box::new(cursor.fail_on_advance(2)), Properties::new(), id_name_schema());
        let mut source = table.to_json();
        source.next();
        assert!(matches!(source.next(), Some(Ok(JsonEvent::Row(_)))));
        assert_eq!(calls.closes(), 0);
        assert!(matches!(source.next(), Some(Err(_))));
        assert_eq!(calls.closes(), 1);
        assert!(source.table().is_closed());
        assert!(source.next().is_none());
        drop(source);
        assert_eq!(calls.closes(), 1);
    }

    #[test]
    fn dropping_source_early_closes_cursor_once() {
        let (cursor, calls) = StubCursor::new(id_name_schema(), id_name_rows());
        let table = TableValue::new(Box::new(cursor), Properties::new(), id_name_schema());
        let mut source = table.to_json();
        source.next();
        source.next();
        drop(source);
        assert_eq!(calls.closes(), 1);
    }

    #[test]
    fn getter_is_chosen_by_declared_type() {
        let schema = Arc::new(Schema::new(vec![
            ColumnDef::new("price", ColumnType::Float),
            ColumnDef::new("active", ColumnType::Boolean),
            ColumnDef::new("tags", ColumnType::Array),
            ColumnDef::new("created", ColumnType::Other("timestamp".into())),
            ColumnDef::new("note", ColumnType::String),
        ]));
        let mut tags = Structured::new();
        tags.insert("primary".into(), json!("red"));
        tags.insert("all".into(), json!(["red", "blue"]));
        let row = vec![
            Some(Cell::Float(9.5)),
            Some(Cell::Bool(true)),
            Some(Cell::Structured(tags)),
            Some(Cell::Int(1_700_000_000)),
            None,
        ];
        let (cursor, _) = StubCursor::new(Arc::clone(&schema), vec![row]);
        let table = TableValue::new(Box::new(cursor), Properties::new(), schema);

        let value = table.to_json().into_array().unwrap();
        assert_eq!(
            value,
            json!([{
                "price": 9.5,
                "active": true,
                "tags": {"primary": "red", "all": ["red", "blue"]},
                "created": "1700000000",
                "note": null
            }])
        );
    }

    #[test]
    fn position_keyed_structured_cell_is_an_array() {
        let schema = Arc::new(Schema::new(vec![ColumnDef::new("tags", ColumnType::Array)]));
        let mut tags = Structured::new();
        tags.insert("0".into(), json!("x"));
        tags.insert("1".into(), json!("y"));
        let (cursor, _) = StubCursor::new(Arc::clone(&schema), vec![vec![Some(Cell::Structured(tags))]]);
        let table = TableValue::new(Box::new(cursor), Properties::new(), schema);

        let value = table.to_json().into_array().unwrap();
        assert_eq!(value, json!([{"tags": ["x", "y"]}]));
    }

    #[test]
    fn type_mismatch_names_row_and_column() {
        let schema = Arc::new(Schema::new(vec![ColumnDef::new("id", ColumnType::Int)]));
        let rows = vec![vec![Some(Cell::Int(1))], vec![Some(Cell::from("oops"))]];
        let (cursor, calls) = StubCursor::new(Arc::clone(&schema), rows);
        let table = TableValue::new(Box::new(cursor), Properties::new(), schema);

        let err = table.to_json().into_array().unwrap_err();
        match err {
            TableError::Cursor(e) => {
                assert_eq!(e.kind, ErrorKind::TypeMismatch);
                assert!(e.message.starts_with("row 2, column 'id'"), "{}", e.message);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(calls.closes(), 1);
    }

    #[test]
    fn empty_table_renders_empty_array() {
        let (cursor, calls) = StubCursor::new(id_name_schema(), vec![]);
        let table = TableValue::new(Box::new(cursor), Properties::new(), id_name_schema());
        let events: Vec<_> = table.to_json().map(Result::unwrap).collect();
        assert_eq!(events, vec![JsonEvent::StartArray, JsonEvent::EndArray]);
        assert_eq!(calls.closes(), 1);
    }
}
