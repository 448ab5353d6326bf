//! Records and record lists: the data side of a report run.
//!
//! A [`Record`] is one ordered row of named text values. A [`RecordList`] is a
//! 1-indexed sequence of optional records bound to a repeating table; an empty
//! slot means "no data on this line". Both are read-only while rendering.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ReportError;

/// One named field of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: String,
}

/// An ordered list of named text values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Record {
    fields: Vec<Field>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Record {
            fields: pairs
                .into_iter()
                .map(|(name, value)| Field {
                    name: name.into(),
                    value: value.into(),
                })
                .collect(),
        }
    }

    /// Append a field, keeping insertion order.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Exact match on a field name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// 1-based positional access.
    pub fn position(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.fields.get(i))
            .map(|f| f.value.as_str())
    }

    /// Look a column up by name, by `field<N>` or by a bare 1-based number.
    pub fn column(&self, column: &str) -> Option<&str> {
        if let Some(v) = self.get(column) {
            return Some(v);
        }
        let digits = column.strip_prefix("field").unwrap_or(column);
        digits.parse::<usize>().ok().and_then(|n| self.position(n))
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Record {
            fields: map
                .into_iter()
                .map(|(name, value)| Field {
                    name,
                    value: value_to_text(&value),
                })
                .collect(),
        }
    }
}

impl From<Record> for Map<String, Value> {
    fn from(record: Record) -> Self {
        record
            .fields
            .into_iter()
            .map(|f| (f.name, Value::String(f.value)))
            .collect()
    }
}

/// JSON scalars become their textual form; nested structures are
/// serialized compactly.
fn value_to_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// An ordered sequence of optional records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordList {
    rows: Vec<Option<Record>>,
}

impl RecordList {
    pub fn new(rows: Vec<Option<Record>>) -> Self {
        Self { rows }
    }

    pub fn push(&mut self, row: Option<Record>) {
        self.rows.push(row);
    }

    /// Number of lines, including empty ones.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The record on a 1-based line; `None` for empty or missing lines.
    pub fn line(&self, line: usize) -> Option<&Record> {
        line.checked_sub(1)
            .and_then(|i| self.rows.get(i))
            .and_then(|r| r.as_ref())
    }
}

impl FromIterator<Option<Record>> for RecordList {
    fn from_iter<T: IntoIterator<Item = Option<Record>>>(iter: T) -> Self {
        RecordList {
            rows: iter.into_iter().collect(),
        }
    }
}

/// The complete input data of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSet {
    /// The active record for plain `{name}` and `{field<N>}` references.
    #[serde(default)]
    pub record: Record,
    /// Record lists, referenced 1-based.
    #[serde(default)]
    pub lists: Vec<RecordList>,
}

impl DataSet {
    pub fn new(record: Record, lists: Vec<RecordList>) -> Self {
        Self { record, lists }
    }

    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        Ok(serde_json::from_str(json)?)
    }

    /// A 1-based list.
    pub fn list(&self, index: usize) -> Option<&RecordList> {
        index.checked_sub(1).and_then(|i| self.lists.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_lookup_by_name_and_position() {
        let r = Record::from_pairs([("name", "Ada"), ("qty", "3")]);
        assert_eq!(r.column("name"), Some("Ada"));
        assert_eq!(r.column("field2"), Some("3"));
        assert_eq!(r.column("2"), Some("3"));
        assert_eq!(r.column("field3"), None);
        assert_eq!(r.column("0"), None);
        assert_eq!(r.column("missing"), None);
    }

    #[test]
    fn exact_name_wins_over_position() {
        let r = Record::from_pairs([("field2", "named"), ("b", "second")]);
        assert_eq!(r.column("field2"), Some("named"));
    }

    #[test]
    fn list_lines_are_one_based() {
        let list: RecordList = vec![Some(Record::from_pairs([("a", "1")])), None]
            .into_iter()
            .collect();
        assert_eq!(list.len(), 2);
        assert!(list.line(0).is_none());
        assert_eq!(list.line(1).and_then(|r| r.get("a")), Some("1"));
        assert!(list.line(2).is_none());
        assert!(list.line(3).is_none());
    }

    #[test]
    fn json_data_set_preserves_field_order() {
        let data = DataSet::from_json(
            r#"{
                "record": { "zeta": "z", "alpha": 1.5, "flag": true },
                "lists": [ [ { "b": "x", "a": "y" }, null ] ]
            }"#,
        )
        .unwrap();
        assert_eq!(data.record.column("field1"), Some("z"));
        assert_eq!(data.record.column("alpha"), Some("1.5"));
        assert_eq!(data.record.column("flag"), Some("true"));
        let list = data.list(1).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.line(1).and_then(|r| r.column("1")), Some("x"));
        assert!(list.line(2).is_none());
        assert!(data.list(2).is_none());
    }
}
