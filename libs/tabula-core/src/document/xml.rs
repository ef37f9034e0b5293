use serde_json::Value;
use tabula_api::{is_list, Cell};

use crate::document::{RowPuller, Step};
use crate::error::TableError;
use crate::table::TableValue;

pub const DEFAULT_ROOT_NAME: &str = "results";
pub const DEFAULT_ROW_NAME: &str = "result";

#[derive(Debug, Clone, PartialEq)]
pub enum XmlContent {
    /// NULL cell, `null` nested value, or an empty structured cell.
    Empty,
    Text(String),
    Children(Vec<XmlElement>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub content: XmlContent,
}

impl XmlElement {
    pub fn new(name: impl Into<String>, content: XmlContent) -> Self {
        Self { name: name.into(), content }
    }

    /// Child elements, empty for text and empty content.
    pub fn children(&self) -> &[XmlElement] {
        match &self.content {
            XmlContent::Children(children) => children,
            XmlContent::Empty | XmlContent::Text(_) => &[],
        }
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children().iter().find(|c| c.name == name)
    }

    pub fn text_content(&self) -> Option<&str> {
        match &self.content {
            XmlContent::Text(text) => Some(text),
            XmlContent::Empty | XmlContent::Children(_) => None,
        }
    }
}

/// Structural event of the XML-shaped document.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlEvent {
    StartRoot(String),
    /// One row element; one child element per column, in column order.
    Row(XmlElement),
    EndRoot(String),
}

/// Lazy XML-shaped document over a table.
///
/// Each column becomes a child element named after the column. Structured
/// cells recurse with the same rule on their keys; a nested array, or a
/// structured cell keyed by position, repeats the element once per item.
///
/// Element names are taken verbatim; validating them as XML names is left to
/// the serializer.
pub struct XmlSource {
    puller: RowPuller,
    root_name: String,
    row_name: String,
}

impl XmlSource {
    /// `None` or empty names fall back to `DEFAULT_ROOT_NAME` / `DEFAULT_ROW_NAME`.
    pub fn new(table: TableValue, root_name: Option<&str>, row_name: Option<&str>) -> Self {
        Self {
            puller: RowPuller::new(table),
            root_name: name_or_default(root_name, DEFAULT_ROOT_NAME),
            row_name: name_or_default(row_name, DEFAULT_ROW_NAME),
        }
    }

    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    pub fn row_name(&self) -> &str {
        &self.row_name
    }

    pub fn rows_emitted(&self) -> u64 {
        self.puller.rows_emitted()
    }

    pub fn table(&self) -> &TableValue {
        self.puller.table()
    }

    /// Drain the source into a single root element.
    ///
    /// Materializes every row; meant for small results and tests.
    pub fn into_element(self) -> Result<XmlElement, TableError> {
        let root = self.root_name.clone();
        let mut rows = Vec::new();
        for event in self {
            if let XmlEvent::Row(row) = event? {
                rows.push(row);
            }
        }
        Ok(XmlElement::new(root, XmlContent::Children(rows)))
    }

    fn row_element(&self, cells: Vec<Option<Cell>>) -> XmlElement {
        let mut children = Vec::with_capacity(cells.len());
        for (column, cell) in self.puller.schema().iter().zip(cells) {
            let content = match cell {
                None => XmlContent::Empty,
                Some(Cell::Structured(map)) if is_list(&map) => {
                    for (_, item) in map {
                        push_value(column.name(), item, &mut children);
                    }
                    continue;
                }
                Some(Cell::Structured(map)) => object_content(map),
                Some(scalar) => XmlContent::Text(scalar.render()),
            };
            children.push(XmlElement::new(column.name(), content));
        }
        XmlElement::new(self.row_name.clone(), XmlContent::Children(children))
    }
}

impl Iterator for XmlSource {
    type Item = Result<XmlEvent, TableError>;

    fn next(&mut self) -> Option<Self::Item> {
        let step = match self.puller.pull()? {
            Ok(step) => step,
            Err(e) => return Some(Err(e)),
        };
        Some(Ok(match step {
            Step::Open => XmlEvent::StartRoot(self.root_name.clone()),
            Step::Row(cells) => XmlEvent::Row(self.row_element(cells)),
            Step::Close => XmlEvent::EndRoot(self.root_name.clone()),
        }))
    }
}

impl std::iter::FusedIterator for XmlSource {}

fn name_or_default(name: Option<&str>, default: &str) -> String {
    match name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => default.to_string(),
    }
}

fn object_content(map: serde_json::Map<String, Value>) -> XmlContent {
    if map.is_empty() {
        return XmlContent::Empty;
    }
    let mut children = Vec::with_capacity(map.len());
    for (key, value) in map {
        push_value(&key, value, &mut children);
    }
    XmlContent::Children(children)
}

fn push_value(name: &str, value: Value, out: &mut Vec<XmlElement>) {
    let content = match value {
        Value::Array(items) => {
            for item in items {
                push_value(name, item, out);
            }
            return;
        }
        Value::Object(map) => object_content(map),
        Value::Null => XmlContent::Empty,
        Value::String(s) => XmlContent::Text(s),
        Value::Bool(b) => XmlContent::Text(b.to_string()),
        Value::Number(n) => XmlContent::Text(n.to_string()),
    };
    out.push(XmlElement::new(name, content));
}
