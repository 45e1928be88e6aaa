use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Parameter key for the "top N" cutoff.
pub const TOP: &str = "top";
/// Parameter key for the debug flag.
pub const DEBUG: &str = "debug";
/// Parameter key for the zone local times are shown in.
pub const TIME_ZONE: &str = "time_zone";

/// A single option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

/// Per-run options shared by every job in a batch.
///
/// Global values apply to all units. Unit-specific overrides are stored
/// alongside and resolved at read time by [`ParamBundle::get_for`], so the
/// same bundle instance is handed to every job unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamBundle {
    #[serde(default)]
    global: BTreeMap<String, ParamValue>,
    #[serde(default)]
    overrides: BTreeMap<String, BTreeMap<String, ParamValue>>,
}

impl ParamBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<ParamValue>) {
        self.global.insert(key.to_string(), value.into());
    }

    /// Add an override that only `unit` sees.
    pub fn set_override(&mut self, unit: &str, key: &str, value: impl Into<ParamValue>) {
        self.overrides
            .entry(unit.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.global.get(key)
    }

    /// Override for `unit` first, then the global value.
    pub fn get_for(&self, unit: &str, key: &str) -> Option<&ParamValue> {
        self.overrides
            .get(unit)
            .and_then(|o| o.get(key))
            .or_else(|| self.global.get(key))
    }

    /// The cutoff a unit should apply. Only meaningful after [`validate`](Self::validate).
    pub fn top_for(&self, unit: &str) -> usize {
        self.get_for(unit, TOP)
            .and_then(ParamValue::as_i64)
            .filter(|v| *v > 0)
            .map(|v| v as usize)
            .unwrap_or(0)
    }

    /// Whether the batch runs with debug logging. Worker processes set up
    /// their own logging from this.
    pub fn debug(&self) -> bool {
        self.get(DEBUG).and_then(ParamValue::as_bool).unwrap_or(false)
    }

    /// `top` must be present and a positive integer, globally and in every
    /// override that sets it.
    pub fn validate(&self) -> Result<(), String> {
        match self.get(TOP) {
            Some(ParamValue::Int(v)) if *v > 0 => {}
            Some(other) => return Err(format!("'{}' must be an integer greater than zero, got {}", TOP, other)),
            None => return Err(format!("'{}' is required", TOP)),
        }
        for (unit, values) in &self.overrides {
            if let Some(v) = values.get(TOP) {
                if !matches!(v, ParamValue::Int(n) if *n > 0) {
                    return Err(format!(
                        "'{}' override for {} must be an integer greater than zero, got {}",
                        TOP, unit, v
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_global() {
        let mut params = ParamBundle::new().with(TOP, 25);
        params.set_override("artist_plays", TOP, 5);

        assert_eq!(params.top_for("artist_plays"), 5);
        assert_eq!(params.top_for("album_plays"), 25);
        assert_eq!(params.get(TOP), Some(&ParamValue::Int(25)));
    }

    #[test]
    fn validate_rejects_non_positive_top() {
        assert!(ParamBundle::new().with(TOP, 10).validate().is_ok());
        assert!(ParamBundle::new().with(TOP, 0).validate().is_err());
        assert!(ParamBundle::new().with(TOP, -3).validate().is_err());
        assert!(ParamBundle::new().with(TOP, "ten").validate().is_err());
        assert!(ParamBundle::new().validate().is_err());
    }

    #[test]
    fn validate_checks_overrides() {
        let mut params = ParamBundle::new().with(TOP, 10);
        params.set_override("genre_plays", TOP, 0);
        let err = params.validate().unwrap_err();
        assert!(err.contains("genre_plays"));
    }

    #[test]
    fn debug_defaults_to_false() {
        assert!(!ParamBundle::new().debug());
        assert!(ParamBundle::new().with(DEBUG, true).debug());
    }

    #[test]
    fn untagged_values_deserialize() {
        let v: BTreeMap<String, ParamValue> =
            serde_yaml::from_str("top: 5\ndebug: true\nratio: 0.5\nlabel: x").unwrap();
        assert_eq!(v["top"], ParamValue::Int(5));
        assert_eq!(v["debug"], ParamValue::Bool(true));
        assert_eq!(v["ratio"], ParamValue::Float(0.5));
        assert_eq!(v["label"], ParamValue::Text("x".into()));
    }
}
