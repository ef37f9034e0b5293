pub mod cursor;
pub mod error;
pub mod props;
pub mod schema;
pub mod value;

pub use cursor::{Column, RowCursor};
pub use error::{CursorError, ErrorKind};
pub use props::Properties;
pub use schema::{ColumnDef, ColumnType, Schema};
pub use value::{is_list, Cell, CellKind, Structured};
