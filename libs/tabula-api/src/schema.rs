use std::fmt;

/// Declared column type. Closed set plus `Other` for column kinds the core
/// does not know about yet.
///
/// Serialized as its type name:
/// - `"string"`, `"int"` / `"integer"`, `"float"` / `"double"`,
///   `"boolean"` / `"bool"`
/// - `"array"` / `"map"` / `"structured"` for nested columns
/// - anything else becomes `Other(name)` and is rendered via string coercion
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    String,
    Int,
    Float,
    Boolean,
    /// Structured cell: nested record or array-like value.
    Array,
    Other(String),
}

impl ColumnType {
    pub fn name(&self) -> &str {
        match self {
            ColumnType::String => "string",
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Array => "array",
            ColumnType::Other(name) => name,
        }
    }
}

impl From<&str> for ColumnType {
    fn from(name: &str) -> Self {
        match name {
            "string" => ColumnType::String,
            "int" | "integer" => ColumnType::Int,
            "float" | "double" => ColumnType::Float,
            "boolean" | "bool" => ColumnType::Boolean,
            "array" | "map" | "structured" => ColumnType::Array,
            other => ColumnType::Other(other.to_string()),
        }
    }
}

impl From<String> for ColumnType {
    fn from(name: String) -> Self {
        ColumnType::from(name.as_str())
    }
}

impl From<ColumnType> for String {
    fn from(t: ColumnType) -> Self {
        match t {
            ColumnType::Other(name) => name,
            known => known.name().to_string(),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single column: name + declared type. Immutable after construction.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColumnDef {
    name: String,
    #[serde(rename = "type")]
    column_type: ColumnType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self { name: name.into(), column_type }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> &ColumnType {
        &self.column_type
    }
}

/// Ordered column list describing the table shape.
///
/// Column position in `columns` is its index, the same index used by
/// positional getters on the cursor.
///
/// Name lookup is case-sensitive exact match. Duplicate names are accepted;
/// lookup then returns the first match and the later columns are reachable
/// by position only.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Schema {
    columns: Vec<ColumnDef>,
}

impl Schema {
    pub fn new(columns: Vec<ColumnDef>) -> Self {
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, index: usize) -> Option<&ColumnDef> {
        self.columns.get(index)
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter()
    }

    /// Position of the first column named exactly `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

impl FromIterator<ColumnDef> for Schema {
    fn from_iter<I: IntoIterator<Item = ColumnDef>>(iter: I) -> Self {
        Self { columns: iter.into_iter().collect() }
    }
}
