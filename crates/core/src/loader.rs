//! Library export loader.
//!
//! The native input is the music library property list (XML, or binary
//! plist). A top-level `Tracks` dictionary maps track ids to flat track
//! dictionaries:
//!
//! ```xml
//! <key>Tracks</key>
//! <dict>
//!     <key>1001</key>
//!     <dict><key>Name</key><string>...</string><key>Play Count</key><integer>12</integer></dict>
//! </dict>
//! ```
//!
//! Files ending in `.json` are read as the same structure in JSON, with
//! dates as RFC 3339 strings.

use std::io::Cursor;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::dataset::{Dataset, FieldValue, Row};
use crate::error::DatasetError;

const TRACKS: &str = "Tracks";

/// Load a library export from disk into a [`Dataset`].
pub fn load_library(path: &Path) -> Result<Dataset, DatasetError> {
    let io_err = |source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    };
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let dataset = if is_json {
        parse_library(&std::fs::read_to_string(path).map_err(io_err)?)?
    } else {
        parse_plist(&std::fs::read(path).map_err(io_err)?)?
    };
    debug!(path = %path.display(), tracks = dataset.len(), "library loaded");
    Ok(dataset)
}

/// Parse an in-memory property list (XML or binary).
pub fn parse_plist(content: &[u8]) -> Result<Dataset, DatasetError> {
    let root = plist::Value::from_reader(Cursor::new(content))?;
    let tracks = root
        .as_dictionary()
        .and_then(|d| d.get(TRACKS))
        .ok_or_else(|| DatasetError::Shape("missing \"Tracks\" dictionary".into()))?
        .as_dictionary()
        .ok_or_else(|| DatasetError::Shape("\"Tracks\" is not a dictionary".into()))?;

    let mut keyed: Vec<(&str, Row)> = Vec::with_capacity(tracks.len());
    for (id, track) in tracks.iter() {
        let fields = track
            .as_dictionary()
            .ok_or_else(|| DatasetError::Shape(format!("track {} is not a dictionary", id)))?;
        let row: Row = fields
            .iter()
            .filter_map(|(k, v)| plist_field(v).map(|v| (k.clone(), v)))
            .collect();
        keyed.push((id.as_str(), row));
    }
    Ok(into_dataset(keyed))
}

/// Parse an in-memory JSON library export.
pub fn parse_library(content: &str) -> Result<Dataset, DatasetError> {
    let root: Value = serde_json::from_str(content)?;
    let tracks = root
        .get(TRACKS)
        .ok_or_else(|| DatasetError::Shape("missing \"Tracks\" dictionary".into()))?
        .as_object()
        .ok_or_else(|| DatasetError::Shape("\"Tracks\" is not a dictionary".into()))?;

    let mut keyed: Vec<(&str, Row)> = Vec::with_capacity(tracks.len());
    for (id, track) in tracks {
        let fields = track
            .as_object()
            .ok_or_else(|| DatasetError::Shape(format!("track {} is not a dictionary", id)))?;
        let row: Row = fields
            .iter()
            .map(|(k, v)| (k.clone(), json_field(v)))
            .collect();
        keyed.push((id.as_str(), row));
    }
    Ok(into_dataset(keyed))
}

fn into_dataset(mut keyed: Vec<(&str, Row)>) -> Dataset {
    // Track ids are numeric strings; order numerically, falling back to text.
    keyed.sort_by(|(a, _), (b, _)| match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    });
    Dataset::from_rows(keyed.into_iter().map(|(_, row)| row).collect())
}

/// Scalar plist values only. Nested arrays, dictionaries and raw data are
/// dropped from the row.
fn plist_field(value: &plist::Value) -> Option<FieldValue> {
    let field = match value {
        plist::Value::String(s) => FieldValue::Text(s.clone()),
        plist::Value::Boolean(b) => FieldValue::Boolean(*b),
        plist::Value::Real(f) => FieldValue::Float(*f),
        // Only unsigned values above i64::MAX fail the signed view.
        plist::Value::Integer(i) => FieldValue::Integer(i.as_signed().unwrap_or(i64::MAX)),
        plist::Value::Date(d) => FieldValue::Date(DateTime::<Utc>::from(SystemTime::from(*d))),
        _ => return None,
    };
    Some(field)
}

fn json_field(value: &Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Null,
        Value::Bool(b) => FieldValue::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => FieldValue::Integer(i),
            None => n.as_f64().map(FieldValue::Float).unwrap_or(FieldValue::Null),
        },
        Value::String(s) => match DateTime::parse_from_rfc3339(s) {
            Ok(d) => FieldValue::Date(d.with_timezone(&Utc)),
            Err(_) => FieldValue::Text(s.clone()),
        },
        // Nested values never show up in track dictionaries; keep them as text.
        other => FieldValue::Text(other.to_string()),
    }
}
