use std::fmt;
use std::str::FromStr;

use crate::schema::ColumnType;

/// Structured cell: ordered mapping from key to an untyped value.
///
/// Key order is insertion order (`serde_json` is built with `preserve_order`).
pub type Structured = serde_json::Map<String, serde_json::Value>;

/// Whether a structured cell holds a list: its keys are exactly `"0"`, `"1"`,
/// ... in order. Backends without a native list shape key items by position.
pub fn is_list(map: &Structured) -> bool {
    !map.is_empty() && map.keys().enumerate().all(|(i, key)| *key == i.to_string())
}

/// Value of one cell as returned by a typed getter.
///
/// There is no null variant: getters return `Option<Cell>` (or `Option<T>`)
/// and `None` is the backend's NULL / absent value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Structured(Structured),
}

impl Cell {
    pub fn kind(&self) -> CellKind {
        match self {
            Cell::String(_) => CellKind::String,
            Cell::Int(_) => CellKind::Int,
            Cell::Float(_) => CellKind::Float,
            Cell::Bool(_) => CellKind::Bool,
            Cell::Structured(_) => CellKind::Structured,
        }
    }

    /// Native JSON form. Non-finite floats have no JSON number and become `null`;
    /// list-shaped structured cells become arrays.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Cell::String(s) => serde_json::Value::String(s.clone()),
            Cell::Int(n) => serde_json::Value::Number((*n).into()),
            Cell::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Cell::Bool(b) => serde_json::Value::Bool(*b),
            Cell::Structured(m) if is_list(m) => {
                serde_json::Value::Array(m.values().cloned().collect())
            }
            Cell::Structured(m) => serde_json::Value::Object(m.clone()),
        }
    }

    /// Owned form of `to_json`.
    pub fn into_json(self) -> serde_json::Value {
        match self {
            Cell::String(s) => serde_json::Value::String(s),
            Cell::Structured(m) if is_list(&m) => {
                serde_json::Value::Array(m.into_iter().map(|(_, v)| v).collect())
            }
            Cell::Structured(m) => serde_json::Value::Object(m),
            scalar => scalar.to_json(),
        }
    }

    /// Text form used for string coercion and XML text nodes.
    /// Structured cells render as compact JSON.
    pub fn render(&self) -> String {
        match self {
            Cell::String(s) => s.clone(),
            Cell::Int(n) => n.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::Structured(_) => self.to_json().to_string(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::String(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::String(s)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Int(n)
    }
}

impl From<f64> for Cell {
    fn from(f: f64) -> Self {
        Cell::Float(f)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

impl From<Structured> for Cell {
    fn from(m: Structured) -> Self {
        Cell::Structured(m)
    }
}

/// Target kind for the generic "get as requested kind" operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    String,
    Int,
    Float,
    Bool,
    Structured,
}

impl CellKind {
    pub fn name(self) -> &'static str {
        match self {
            CellKind::String => "string",
            CellKind::Int => "int",
            CellKind::Float => "float",
            CellKind::Bool => "boolean",
            CellKind::Structured => "structured",
        }
    }

    /// Getter kind matching a declared column type.
    ///
    /// `None` for `ColumnType::Other`; such columns are read through string
    /// coercion.
    pub fn for_column(column_type: &ColumnType) -> Option<CellKind> {
        match column_type {
            ColumnType::String => Some(CellKind::String),
            ColumnType::Int => Some(CellKind::Int),
            ColumnType::Float => Some(CellKind::Float),
            ColumnType::Boolean => Some(CellKind::Bool),
            ColumnType::Array => Some(CellKind::Structured),
            ColumnType::Other(_) => None,
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CellKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(CellKind::String),
            "int" | "integer" => Ok(CellKind::Int),
            "float" | "double" => Ok(CellKind::Float),
            "boolean" | "bool" => Ok(CellKind::Bool),
            "structured" | "array" | "map" => Ok(CellKind::Structured),
            other => Err(format!("unknown cell kind '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_finite_float_renders_as_json_null() {
        assert_eq!(Cell::Float(f64::NAN).to_json(), serde_json::Value::Null);
        assert_eq!(Cell::Float(1.5).to_json(), json!(1.5));
    }

    #[test]
    fn structured_render_keeps_key_order() {
        let mut m = Structured::new();
        m.insert("z".into(), json!(1));
        m.insert("a".into(), json!([true, null]));
        assert_eq!(Cell::Structured(m).render(), r#"{"z":1,"a":[true,null]}"#);
    }

    #[test]
    fn position_keyed_cells_render_as_arrays() {
        let list: Structured = [("0", json!("x")), ("1", json!({"k": 1}))]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert!(is_list(&list));
        assert_eq!(Cell::Structured(list.clone()).to_json(), json!(["x", {"k": 1}]));
        assert_eq!(Cell::Structured(list.clone()).render(), r#"["x",{"k":1}]"#);
        assert_eq!(Cell::Structured(list).into_json(), json!(["x", {"k": 1}]));

        let mut gap = Structured::new();
        gap.insert("0".into(), json!(1));
        gap.insert("2".into(), json!(2));
        assert!(!is_list(&gap));
        let mut padded = Structured::new();
        padded.insert("00".into(), json!(1));
        assert!(!is_list(&padded));
        assert!(!is_list(&Structured::new()));
        assert_eq!(Cell::Structured(gap).into_json(), json!({"0": 1, "2": 2}));
    }

    #[test]
    fn kind_follows_declared_type() {
        assert_eq!(CellKind::for_column(&ColumnType::Array), Some(CellKind::Structured));
        assert_eq!(CellKind::for_column(&ColumnType::Other("blob".into())), None);
        assert_eq!("bool".parse::<CellKind>(), Ok(CellKind::Bool));
        assert!("blob".parse::<CellKind>().is_err());
    }
}
