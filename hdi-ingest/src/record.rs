//! Cleaned source records

use crate::fields::Field;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Cleaned records of one source, keyed by identifier
///
/// Ordered by identifier so every scan over a source map (merge order, zip
/// code repair tie-break) is deterministic.
pub type SourceMap = BTreeMap<String, CleanRecord>;

/// Value of one field after cleaning
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Value as read from the feed
    Text(String),
    /// Replacement produced by the repairer
    Repaired(i64),
}

impl FieldValue {
    /// Integer reading of the value; `None` if the text is not an integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Text(text) => text.trim().parse().ok(),
            FieldValue::Repaired(n) => Some(*n),
        }
    }

    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(text) => Cow::Borrowed(text),
            FieldValue::Repaired(n) => Cow::Owned(n.to_string()),
        }
    }
}

/// A row that survived loading: no corrupted field remains
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanRecord {
    pub guid: String,
    pub values: BTreeMap<Field, FieldValue>,
}

impl CleanRecord {
    pub fn new(guid: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, field: Field, value: FieldValue) -> Self {
        self.values.insert(field, value);
        self
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    /// Original text of a field that was not repaired
    pub fn text(&self, field: Field) -> Option<&str> {
        match self.values.get(&field) {
            Some(FieldValue::Text(text)) => Some(text),
            _ => None,
        }
    }
}
