//! Value and record types for rivven-datasource
//!
//! - `Value` / `Row`: raw catalog rows as returned by a connection
//! - `TableField`: the normalized column description returned to callers
//! - `TableKind`: normalized catalog object kind

use serde::{Deserialize, Serialize};

/// Catalog cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// SQL NULL
    Null,
    /// Boolean value
    Bool(bool),
    /// Signed integer
    Int64(i64),
    /// Unsigned integer
    UInt64(u64),
    /// Floating point
    Float64(f64),
    /// Text string
    String(String),
    /// Binary data
    Bytes(Vec<u8>),
}

impl Value {
    /// Check if value is NULL
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Convert to owned string representation
    pub fn as_string(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Int64(n) => Some(n.to_string()),
            Self::UInt64(n) => Some(n.to_string()),
            Self::Float64(n) => Some(n.to_string()),
            Self::String(s) => Some(s.clone()),
            Self::Bytes(b) => String::from_utf8(b.clone()).ok(),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::UInt64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Self::Null,
        }
    }
}

/// Database row as ordered column values
#[derive(Debug, Clone)]
pub struct Row {
    /// Column labels
    columns: Vec<String>,
    /// Column values (same order as columns)
    values: Vec<Value>,
}

impl Row {
    /// Create a new row
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Build a row from `(label, value)` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let (columns, values) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self { columns, values }
    }

    /// Get column count
    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if row is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get value by column label (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a non-null value by label as an owned string
    pub fn string(&self, name: &str) -> Option<String> {
        self.get_by_name(name).and_then(Value::as_string)
    }
}

/// Normalized kind of a catalog relation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableKind {
    /// Ordinary base table
    Table,
    /// View
    View,
    /// Engine-internal view
    SystemView,
    /// Anything else the catalog reports, kept verbatim
    Other(String),
}

impl TableKind {
    /// Whether this relation is an ordinary table
    #[inline]
    pub fn is_table(&self) -> bool {
        matches!(self, Self::Table)
    }
}

/// Column description of a table, as returned by field introspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableField {
    /// Column name (never blank)
    pub name: String,
    /// Engine-native type name
    #[serde(rename = "type")]
    pub type_name: String,
    /// Column comment
    pub comment: Option<String>,
    /// Whether the column accepts NULL
    pub nullable: bool,
    /// Whether this column is the table's primary key column
    pub primary_key: bool,
}

impl TableField {
    /// Create a non-nullable, non-key field
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            comment: None,
            nullable: false,
            primary_key: false,
        }
    }

    /// Set the comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Set nullability
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set the primary key flag
    pub fn with_primary_key(mut self, primary_key: bool) -> Self {
        self.primary_key = primary_key;
        self
    }
}

/// Whether a catalog name should be dropped as blank
#[inline]
pub(crate) fn is_blank(name: &str) -> bool {
    name.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_conversions() {
        assert!(Value::Null.is_null());
        assert_eq!(Value::Bytes(b"app_db".to_vec()).as_string(), Some("app_db".into()));
        assert_eq!(Value::UInt64(3).as_string(), Some("3".into()));
        assert_eq!(Value::Int64(7).as_string(), Some("7".into()));
        assert_eq!(Value::Null.as_string(), None);

        let v: Value = None::<String>.into();
        assert!(v.is_null());
    }

    #[test]
    fn test_row_lookup_is_case_insensitive() {
        let row = Row::from_pairs([("Database", "app_db")]);

        assert_eq!(row.len(), 1);
        assert_eq!(row.string("database"), Some("app_db".into()));
        assert_eq!(row.string("DATABASE"), Some("app_db".into()));
        assert_eq!(row.string("missing"), None);
    }

    #[test]
    fn test_table_field_serializes_like_the_rpc_shape() {
        let field = TableField::new("id", "BIGINT").with_primary_key(true);
        let json = serde_json::to_value(&field).unwrap();

        assert_eq!(json["name"], "id");
        assert_eq!(json["type"], "BIGINT");
        assert_eq!(json["primaryKey"], true);
        assert_eq!(json["nullable"], false);
        assert!(json["comment"].is_null());
    }

    #[test]
    fn test_blank_names() {
        assert!(is_blank(""));
        assert!(is_blank("  \t"));
        assert!(!is_blank("a"));
    }
}
