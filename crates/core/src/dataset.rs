use std::collections::HashMap;

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

/// One track: a flat column-name -> value map.
pub type Row = HashMap<String, FieldValue>;

/// Typed field values as they arrive from the library export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(DateTime<Utc>),
    Null,
}

impl FieldValue {
    /// Extract as string, returning None for non-text values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Integer view. Floats are truncated, numeric text is parsed.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(v) => Some(*v),
            FieldValue::Float(v) if v.is_finite() => Some(*v as i64),
            FieldValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            FieldValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

/// Immutable tabular view over the library: rows are tracks, columns are
/// the union of every field name seen, in first-seen order.
///
/// Built once per batch and shared read-only across workers behind an `Arc`.
/// Worker processes receive it serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: IndexSet<String>,
    rows: Vec<Row>,
}

impl Dataset {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut columns = IndexSet::new();
        for row in &rows {
            // HashMap order is arbitrary; sort per row so column order is stable.
            let mut names: Vec<&String> = row.keys().collect();
            names.sort();
            for name in names {
                if !columns.contains(name) {
                    columns.insert(name.clone());
                }
            }
        }
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    /// Fail with every missing column listed, not just the first.
    pub fn ensure_columns(&self, required: &[&str]) -> Result<(), DatasetError> {
        let missing: Vec<String> = required
            .iter()
            .filter(|c| !self.has_column(c))
            .map(|c| c.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(DatasetError::MissingColumns(missing))
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Rows where every listed column is present and non-null.
    pub fn rows_with<'a>(&'a self, required: &'a [&'a str]) -> impl Iterator<Item = &'a Row> + 'a {
        self.rows.iter().filter(move |row| {
            required
                .iter()
                .all(|c| row.get(*c).is_some_and(|v| !v.is_null()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[(&str, FieldValue)]) -> Row {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn columns_are_union_of_rows() {
        let ds = Dataset::from_rows(vec![
            row(&[("Name", FieldValue::Text("a".into()))]),
            row(&[
                ("Name", FieldValue::Text("b".into())),
                ("Play Count", FieldValue::Integer(3)),
            ]),
        ]);
        assert_eq!(ds.len(), 2);
        assert!(ds.has_column("Name"));
        assert!(ds.has_column("Play Count"));
        assert!(!ds.has_column("Genre"));
    }

    #[test]
    fn ensure_columns_lists_all_missing() {
        let ds = Dataset::from_rows(vec![row(&[("Artist", FieldValue::Text("x".into()))])]);
        assert!(ds.ensure_columns(&["Artist"]).is_ok());

        match ds.ensure_columns(&["Artist", "Album", "Play Count"]) {
            Err(DatasetError::MissingColumns(missing)) => {
                assert_eq!(missing, vec!["Album".to_string(), "Play Count".to_string()]);
            }
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn rows_with_skips_null_and_absent() {
        let ds = Dataset::from_rows(vec![
            row(&[("Genre", FieldValue::Text("Rock".into()))]),
            row(&[("Genre", FieldValue::Null)]),
            row(&[("Name", FieldValue::Text("no genre".into()))]),
        ]);
        assert_eq!(ds.rows_with(&["Genre"]).count(), 1);
    }

    #[test]
    fn field_value_conversions() {
        assert_eq!(FieldValue::Integer(7).as_i64(), Some(7));
        assert_eq!(FieldValue::Float(7.9).as_i64(), Some(7));
        assert_eq!(FieldValue::Text(" 12 ".into()).as_i64(), Some(12));
        assert_eq!(FieldValue::Boolean(true).as_i64(), None);
        assert_eq!(FieldValue::Integer(2).as_f64(), Some(2.0));
        assert_eq!(FieldValue::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(FieldValue::Text("x".into()).as_date(), None);
        assert_eq!(FieldValue::Text("x".into()).as_str(), Some("x"));
        assert!(FieldValue::Null.is_null());
    }

    #[test]
    fn empty_dataset() {
        let ds = Dataset::default();
        assert!(ds.is_empty());
        assert!(!ds.has_column("Name"));
    }

    #[test]
    fn survives_a_json_round_trip() {
        let ds = Dataset::from_rows(vec![row(&[
            ("Name", FieldValue::Text("a".into())),
            ("Date Added", FieldValue::Date("2021-03-04T05:06:07Z".parse().unwrap())),
        ])]);
        let back: Dataset = serde_json::from_str(&serde_json::to_string(&ds).unwrap()).unwrap();
        assert_eq!(back, ds);
        assert!(back.rows().next().unwrap()["Date Added"].as_date().is_some());
    }
}
