use std::collections::HashMap;

/// Opaque table metadata supplied by the data source adapter.
///
/// The core stores and hands it back; it never interprets keys or values.
pub type Properties = HashMap<String, serde_json::Value>;
