pub mod document;
pub mod error;
pub mod table;

pub use document::json::{JsonEvent, JsonSource};
pub use document::xml::{XmlContent, XmlElement, XmlEvent, XmlSource, DEFAULT_ROOT_NAME, DEFAULT_ROW_NAME};
pub use error::TableError;
pub use table::{CursorState, TableValue, MAX_COLUMN_INDEX};

#[cfg(test)]
mod test_utils;
