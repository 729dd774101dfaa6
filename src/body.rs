//! Path-based JSON builder for POST/PUT payloads.

use std::{fmt, str::FromStr};

use serde_json::{Map, Value as Json};

use crate::{path, Document};

/// Most `null`s a single write may pad onto an array.
const MAX_PADDING: usize = 1024;

/// JSON request body assembled with dot-paths.
///
/// ```
/// use ise_http::Body;
///
/// let body = Body::new()
///     .set("InternalUser.name", "guest")
///     .set("InternalUser.identityGroups.-1", "Employees");
/// assert_eq!(
///     body.to_string(),
///     r#"{"InternalUser":{"name":"guest","identityGroups":["Employees"]}}"#
/// );
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    value: Json,
}

impl Default for Body {
    fn default() -> Self {
        Self::new()
    }
}

impl Body {
    /// Starts from an empty object.
    pub fn new() -> Self {
        Self {
            value: Json::Object(Map::new()),
        }
    }

    /// Writes `value` at `path`, creating intermediate objects.
    ///
    /// On arrays a numeric segment indexes (padding with `null`), and `-1`
    /// appends. A numeric segment under a missing key creates an array.
    /// Scalars in the way of a deeper path are replaced by objects.
    /// A write that would pad an array with more than 1024 `null`s is
    /// ignored.
    pub fn set(mut self, path: &str, value: impl Into<Json>) -> Self {
        let keys = write_keys(path);
        if !keys.is_empty() && within_padding(Some(&self.value), &keys) {
            set_at(&mut self.value, &keys, value.into());
        }
        self
    }

    /// Writes pre-serialised JSON at `path`.
    ///
    /// Text that is not valid JSON is stored as a JSON string.
    pub fn set_raw(self, path: &str, raw: &str) -> Self {
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Json::String(raw.to_owned()));
        self.set(path, value)
    }

    /// Removes the key or array element at `path`; absent paths are ignored.
    pub fn delete(mut self, path: &str) -> Self {
        let keys = write_keys(path);
        if let Some((last, parents)) = keys.split_last() {
            if let Some(parent) = walk_mut(&mut self.value, parents) {
                remove_child(parent, last);
            }
        }
        self
    }

    /// Read view of the payload built so far.
    pub fn res(&self) -> Document {
        Document::parse(self.value.to_string())
    }

    pub fn into_string(self) -> String {
        self.value.to_string()
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl FromStr for Body {
    type Err = serde_json::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(Self {
            value: serde_json::from_str(raw)?,
        })
    }
}

impl From<Body> for String {
    fn from(body: Body) -> Self {
        body.into_string()
    }
}

fn write_keys(path: &str) -> Vec<String> {
    path::segments(path)
        .into_iter()
        .map(|segment| segment.key)
        .collect()
}

fn set_at(target: &mut Json, keys: &[String], value: Json) {
    let Some((head, rest)) = keys.split_first() else {
        *target = value;
        return;
    };

    if target.is_null() && is_index(head) {
        *target = Json::Array(Vec::new());
    }

    if let Json::Array(items) = target {
        if let Some(index) = array_index(items.len(), head) {
            if items.len() <= index {
                items.resize(index + 1, Json::Null);
            }
            set_at(&mut items[index], rest, value);
            return;
        }
    }

    if !target.is_object() {
        *target = Json::Object(Map::new());
    }
    if let Json::Object(map) = target {
        let child = map.entry(head.clone()).or_insert(Json::Null);
        set_at(child, rest, value);
    }
}

fn array_index(len: usize, key: &str) -> Option<usize> {
    if key == "-1" {
        Some(len)
    } else {
        key.parse::<usize>().ok()
    }
}

fn is_index(key: &str) -> bool {
    array_index(0, key).is_some()
}

/// Dry run of [`set_at`]: `false` when some array along `keys` would need
/// more than [`MAX_PADDING`] filler elements.
fn within_padding(target: Option<&Json>, keys: &[String]) -> bool {
    let Some((head, rest)) = keys.split_first() else {
        return true;
    };
    match target {
        Some(Json::Array(items)) => match array_index(items.len(), head) {
            Some(index) if index.saturating_sub(items.len()) > MAX_PADDING => false,
            Some(index) => within_padding(items.get(index), rest),
            None => within_padding(None, rest),
        },
        Some(Json::Object(map)) => within_padding(map.get(head), rest),
        None | Some(Json::Null) => match array_index(0, head) {
            Some(index) if index > MAX_PADDING => false,
            _ => within_padding(None, rest),
        },
        Some(_) => within_padding(None, rest),
    }
}

fn walk_mut<'a>(target: &'a mut Json, keys: &[String]) -> Option<&'a mut Json> {
    let Some((head, rest)) = keys.split_first() else {
        return Some(target);
    };
    let child = match target {
        Json::Object(map) => map.get_mut(head)?,
        Json::Array(items) => items.get_mut(head.parse::<usize>().ok()?)?,
        _ => return None,
    };
    walk_mut(child, rest)
}

fn remove_child(parent: &mut Json, key: &str) {
    match parent {
        Json::Object(map) => {
            map.shift_remove(key);
        }
        Json::Array(items) => {
            let index = if key == "-1" {
                items.len().checked_sub(1)
            } else {
                key.parse::<usize>().ok()
            };
            if let Some(index) = index.filter(|index| *index < items.len()) {
                items.remove(index);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::Body;

    #[test]
    fn creates_intermediate_objects() {
        let body = Body::new()
            .set("NetworkDevice.name", "sw1")
            .set(
                "NetworkDevice.authenticationSettings.radiusSharedSecret",
                "s3cr3t",
            )
            .set("NetworkDevice.profileName", "Cisco");
        assert_eq!(
            body.to_string(),
            r#"{"NetworkDevice":{"name":"sw1","authenticationSettings":{"radiusSharedSecret":"s3cr3t"},"profileName":"Cisco"}}"#
        );
    }

    #[test]
    fn appends_and_indexes_arrays() {
        let body = Body::new()
            .set_raw("list", "[]")
            .set("list.-1", 1)
            .set("list.-1", 2)
            .set("list.0", 10)
            .set("list.3", 4);
        assert_eq!(body.res().get("list").raw(), "[10,2,null,4]");
    }

    #[test]
    fn numeric_segment_under_missing_key_creates_array() {
        let body = Body::new().set("groups.-1", "a").set("slots.1", "b");
        assert_eq!(body.to_string(), r#"{"groups":["a"],"slots":[null,"b"]}"#);
    }

    #[test]
    fn oversized_index_leaves_body_unchanged() {
        let body = Body::new()
            .set("list.-1", 1)
            .set("list.18446744073709551615", 2)
            .set("list.99999999999", 3)
            .set("fresh.18446744073709551615", 4)
            .set("deep.0.ids.5000", 5)
            .set("list.2", 6);
        assert_eq!(body.to_string(), r#"{"list":[1,null,6]}"#);

        let padded = Body::new().set("list.1024", true);
        assert_eq!(padded.res().get("list.#").int(), 1025);
    }

    #[test]
    fn nested_fields_inside_array_elements() {
        let body = Body::new()
            .set("ips.0.ipaddress", "10.0.0.1")
            .set("ips.0.mask", 32);
        assert_eq!(body.res().get("ips.0.mask").int(), 32);
        assert_eq!(body.res().get("ips.#.ipaddress").array().len(), 1);
    }

    #[test]
    fn set_raw_falls_back_to_string() {
        let body = Body::new()
            .set_raw("obj", r#"{"a":[1,2]}"#)
            .set_raw("text", "not json");
        assert_eq!(body.res().get("obj.a.1").int(), 2);
        assert_eq!(body.res().get("text").str(), "not json");
    }

    #[test]
    fn scalars_in_the_way_become_objects() {
        let body = Body::new().set("a", 1).set("a.b", true);
        assert_eq!(body.to_string(), r#"{"a":{"b":true}}"#);
    }

    #[test]
    fn delete_removes_keys_and_elements() {
        let body: Body = r#"{"a":{"b":1,"c":2},"list":[1,2,3]}"#
            .parse()
            .expect("valid json");
        let body = body
            .delete("a.b")
            .delete("list.0")
            .delete("list.-1")
            .delete("missing.path");
        assert_eq!(body.to_string(), r#"{"a":{"c":2},"list":[2]}"#);
    }

    #[test]
    fn escaped_dots_stay_in_keys() {
        let body = Body::new().set(r"attrs.a\.b", json!("v"));
        assert_eq!(body.to_string(), r#"{"attrs":{"a.b":"v"}}"#);
    }

    #[test]
    fn converts_into_request_data() {
        let data: String = Body::new().set("x", "y").into();
        assert_eq!(data, r#"{"x":"y"}"#);
    }
}
