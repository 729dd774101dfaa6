use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value as Json;

use crate::path;

/// Parsed response body with path-based lookups.
///
/// Construction never fails: a body that is not valid JSON produces a
/// document whose lookups all resolve to a missing [`Value`], while
/// [`Document::raw`] still returns the original text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    raw: String,
    value: Option<Json>,
}

impl Document {
    /// Parses raw response bytes.
    pub fn parse(bytes: impl AsRef<[u8]>) -> Self {
        let raw = String::from_utf8_lossy(bytes.as_ref()).into_owned();
        let value = serde_json::from_str(&raw).ok();
        Self { raw, value }
    }

    /// Original body text as received.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Pretty-printed JSON, or the raw text when the body did not parse.
    pub fn pretty(&self) -> String {
        self.value
            .as_ref()
            .and_then(|value| serde_json::to_string_pretty(value).ok())
            .unwrap_or_else(|| self.raw.clone())
    }

    /// Returns `true` when the body held no parseable JSON.
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    /// The whole document as a [`Value`].
    pub fn root(&self) -> Value {
        Value(self.value.clone())
    }

    /// Resolves a dot-path such as `"SearchResult.resources.#.name"`.
    ///
    /// Absent paths yield a missing value, never an error.
    pub fn get(&self, path: &str) -> Value {
        Value(
            self.value
                .as_ref()
                .and_then(|value| path::lookup(value, path)),
        )
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for Document {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

/// Result of a path lookup.
///
/// Accessors never fail: a missing value or a type mismatch yields the
/// zero value of the requested type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Value(Option<Json>);

impl Value {
    pub fn exists(&self) -> bool {
        self.0.is_some()
    }

    pub fn is_null(&self) -> bool {
        matches!(self.0, Some(Json::Null))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.0, Some(Json::Array(_)))
    }

    pub fn is_object(&self) -> bool {
        matches!(self.0, Some(Json::Object(_)))
    }

    /// Borrow of the underlying JSON value.
    pub fn as_json(&self) -> Option<&Json> {
        self.0.as_ref()
    }

    /// String view; empty unless the value is a JSON string.
    pub fn str(&self) -> &str {
        match &self.0 {
            Some(Json::String(text)) => text.as_str(),
            _ => "",
        }
    }

    /// Text form of any value: strings verbatim, scalars formatted,
    /// containers as compact JSON. Empty for missing and `null`.
    pub fn string(&self) -> String {
        match &self.0 {
            None | Some(Json::Null) => String::new(),
            Some(Json::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn int(&self) -> i64 {
        match &self.0 {
            Some(Json::Number(number)) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|float| float as i64))
                .unwrap_or(0),
            Some(Json::String(text)) => {
                let text = text.trim();
                text.parse::<i64>()
                    .ok()
                    .or_else(|| text.parse::<f64>().ok().map(|float| float as i64))
                    .unwrap_or(0)
            }
            Some(Json::Bool(true)) => 1,
            _ => 0,
        }
    }

    pub fn uint(&self) -> u64 {
        match &self.0 {
            Some(Json::Number(number)) => number
                .as_u64()
                .or_else(|| number.as_f64().map(|float| float as u64))
                .unwrap_or(0),
            Some(Json::String(text)) => {
                let text = text.trim();
                text.parse::<u64>()
                    .ok()
                    .or_else(|| text.parse::<f64>().ok().map(|float| float as u64))
                    .unwrap_or(0)
            }
            Some(Json::Bool(true)) => 1,
            _ => 0,
        }
    }

    pub fn float(&self) -> f64 {
        match &self.0 {
            Some(Json::Number(number)) => number.as_f64().unwrap_or(0.0),
            Some(Json::String(text)) => text.trim().parse::<f64>().unwrap_or(0.0),
            Some(Json::Bool(true)) => 1.0,
            _ => 0.0,
        }
    }

    pub fn bool(&self) -> bool {
        match &self.0 {
            Some(Json::Bool(flag)) => *flag,
            Some(Json::Number(number)) => number.as_f64().is_some_and(|float| float != 0.0),
            Some(Json::String(text)) => {
                let text = text.trim();
                text.eq_ignore_ascii_case("true") || text == "1"
            }
            _ => false,
        }
    }

    /// Array elements; empty unless the value is an array.
    pub fn array(&self) -> Vec<Value> {
        match &self.0 {
            Some(Json::Array(items)) => items
                .iter()
                .cloned()
                .map(|item| Value(Some(item)))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Object entries in document order; empty unless the value is an object.
    pub fn map(&self) -> Vec<(String, Value)> {
        match &self.0 {
            Some(Json::Object(map)) => map
                .iter()
                .map(|(key, value)| (key.clone(), Value(Some(value.clone()))))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Compact JSON text, empty when missing.
    pub fn raw(&self) -> String {
        self.0.as_ref().map(Json::to_string).unwrap_or_default()
    }

    /// Chained lookup relative to this value.
    pub fn get(&self, path: &str) -> Value {
        Value(self.0.as_ref().and_then(|value| path::lookup(value, path)))
    }

    /// Deserializes the value into `T`, `None` when missing or mismatched.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Option<T> {
        self.0
            .as_ref()
            .and_then(|value| T::deserialize(value).ok())
    }
}
