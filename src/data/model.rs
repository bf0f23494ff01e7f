use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::error::{LoadError, Result};

/// Name of the step counter column used as the redo key.
pub const STEP_COLUMN: &str = "model_number";

// ---------------------------------------------------------------------------
// HeaderValue – a single run header field
// ---------------------------------------------------------------------------

/// A scalar from the run header, typed by its literal form.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Integer(i64),
    Float(f64),
    String(String),
}

impl HeaderValue {
    /// Parse a header token as an integer, else a float, else a string.
    ///
    /// Quoted tokens (`'abc'` or `"abc"`) become the unquoted string. Integer
    /// literals outside the `i64` range are kept verbatim as strings rather
    /// than rounded through `f64`. Nothing is ever evaluated.
    pub fn parse_literal(token: &str) -> Self {
        if let Some(inner) = strip_quotes(token) {
            return HeaderValue::String(inner.to_string());
        }
        if let Ok(i) = token.parse::<i64>() {
            return HeaderValue::Integer(i);
        }
        if is_integer_literal(token) {
            return HeaderValue::String(token.to_string());
        }
        // `f64::from_str` also accepts "inf"/"nan"; those stay strings.
        if token.bytes().any(|b| b.is_ascii_digit()) {
            if let Ok(f) = token.parse::<f64>() {
                return HeaderValue::Float(f);
            }
        }
        HeaderValue::String(token.to_string())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HeaderValue::Integer(i) => Some(*i as f64),
            HeaderValue::Float(f) => Some(*f),
            HeaderValue::String(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::String(s) => Some(s),
            _ => None,
        }
    }
}

fn is_integer_literal(token: &str) -> bool {
    let digits = token.strip_prefix(['+', '-']).unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn strip_quotes(token: &str) -> Option<&str> {
    ['\'', '"'].into_iter().find_map(|q| {
        token
            .strip_prefix(q)
            .and_then(|rest| rest.strip_suffix(q))
    })
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Integer(i) => write!(f, "{i}"),
            HeaderValue::Float(v) => write!(f, "{v}"),
            HeaderValue::String(s) => write!(f, "{s}"),
        }
    }
}

// ---------------------------------------------------------------------------
// RunHeader – lines 2 and 3 of a history file
// ---------------------------------------------------------------------------

/// Run metadata, in the order the fields appear in the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunHeader {
    fields: Vec<(String, HeaderValue)>,
}

impl RunHeader {
    pub(crate) fn push(&mut self, name: String, value: HeaderValue) {
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for RunHeader {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// ColumnIndex – lines 5 and 6 of a history file
// ---------------------------------------------------------------------------

/// Column name → zero-based position within a data row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnIndex {
    /// Names in schema order.
    names: Vec<String>,
    positions: BTreeMap<String, usize>,
}

impl ColumnIndex {
    /// Register a column. Returns `false` if the name is already taken.
    pub(crate) fn insert(&mut self, name: String, position: usize) -> bool {
        if self.positions.contains_key(&name) {
            return false;
        }
        self.positions.insert(name.clone(), position);
        self.names.push(name);
        true
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Column names in schema order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Table – column-oriented numeric data
// ---------------------------------------------------------------------------

/// Loaded columns, all of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Load order of the columns.
    column_names: Vec<String>,
    data: BTreeMap<String, Vec<f64>>,
}

impl Table {
    pub(crate) fn from_columns(columns: Vec<(String, Vec<f64>)>) -> Self {
        let mut table = Table::default();
        for (name, values) in columns {
            table.column_names.push(name.clone());
            table.data.insert(name, values);
        }
        table
    }

    /// Values of a loaded column.
    pub fn get(&self, name: &str) -> Result<&[f64]> {
        self.data
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| LoadError::Key(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Columns in load order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.column_names
            .iter()
            .filter_map(|n| self.data.get(n).map(|v| (n.as_str(), v.as_slice())))
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.data.values().next().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn map_columns(&mut self, mut f: impl FnMut(&[f64]) -> Vec<f64>) {
        for values in self.data.values_mut() {
            *values = f(values.as_slice());
        }
    }
}

// ---------------------------------------------------------------------------
// IndexEntry – one row of profiles.index
// ---------------------------------------------------------------------------

/// A `(model_number, file_id)` pair from a profile index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexEntry {
    pub model_number: f64,
    pub file_id: f64,
}
