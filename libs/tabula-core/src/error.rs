use tabula_api::CursorError;

use crate::table::CursorState;

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// Column index outside the addressable range. Raised before the cursor
    /// is touched.
    #[error("index number too large: {0}")]
    IndexTooLarge(i64),

    #[error("cursor misuse: {op} called while cursor is {state}")]
    CursorState { op: &'static str, state: CursorState },

    #[error("cursor error: {0}")]
    Cursor(#[from] CursorError),
}

impl TableError {
    /// Add context to the error.
    ///
    /// For `Cursor` variant, context is added to the inner `CursorError`.
    /// Bounds and state errors are returned as is.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            TableError::Cursor(e) => TableError::Cursor(e.with_context(ctx)),
            other => other,
        }
    }

    pub fn is_bounds(&self) -> bool {
        matches!(self, TableError::IndexTooLarge(_))
    }

    pub fn is_cursor_state(&self) -> bool {
        matches!(self, TableError::CursorState { .. })
    }
}
