use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Values that cross the driver boundary, as query parameters or row columns.
///
/// One enum for both directions keeps helper code free of driver types:
/// ```rust
/// use pg_helper::prelude::*;
///
/// let params = vec![
///     DbValue::Int(1),
///     DbValue::Text("alice".into()),
///     DbValue::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DbValue {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    Json(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl DbValue {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let DbValue::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let DbValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let DbValue::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let DbValue::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // Try "YYYY-MM-DD HH:MM:SS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            // Try "YYYY-MM-DD HH:MM:SS.SSS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S.%3f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let DbValue::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let DbValue::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }
}

/// The value bound to one named parameter: a scalar, or an ordered sequence of
/// scalars that the transformer spreads into a run of positional placeholders.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Scalar(DbValue),
    List(Vec<DbValue>),
}

impl From<DbValue> for ParamValue {
    fn from(value: DbValue) -> Self {
        ParamValue::Scalar(value)
    }
}

impl From<Vec<DbValue>> for ParamValue {
    fn from(values: Vec<DbValue>) -> Self {
        ParamValue::List(values)
    }
}

/// An insertion-ordered set of named parameters, keys including the leading `$`.
///
/// Insertion order matters: when two names have the same length, the
/// transformer assigns positional indices in the order the names were set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedParams {
    entries: Vec<(String, ParamValue)>,
}

impl NamedParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert. Setting a name twice replaces the earlier value
    /// without changing its position.
    #[must_use]
    pub fn set(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert a parameter, replacing an existing entry with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub(crate) fn into_entries(self) -> Vec<(String, ParamValue)> {
        self.entries
    }
}

/// Parameters handed to the executor alongside a query string.
///
/// A positional list passes through the transformer untouched; a named set is
/// rewritten into positional form. Mixed styles in one query are not supported.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum QueryParams {
    /// No parameters.
    #[default]
    None,
    /// An already-ordered list; index `i` (1-based) binds placeholder `$i`.
    Positional(Vec<DbValue>),
    /// Named parameters to be rewritten into positional form.
    Named(NamedParams),
}

impl QueryParams {
    #[must_use]
    pub fn none() -> Self {
        QueryParams::None
    }

    #[must_use]
    pub fn positional(values: Vec<DbValue>) -> Self {
        QueryParams::Positional(values)
    }

    #[must_use]
    pub fn named(params: NamedParams) -> Self {
        QueryParams::Named(params)
    }
}

impl From<Vec<DbValue>> for QueryParams {
    fn from(values: Vec<DbValue>) -> Self {
        QueryParams::Positional(values)
    }
}

impl From<NamedParams> for QueryParams {
    fn from(params: NamedParams) -> Self {
        QueryParams::Named(params)
    }
}
