//! JSON extraction helpers for API-backed adapters.
//!
//! Paths use dot notation; numeric segments index into arrays.
//!
//! ```rust
//! use shiori::net::json;
//! use serde_json::json;
//!
//! let data = json!({
//!     "data": {
//!         "attributes": { "title": { "en": "Berserk" } },
//!         "relationships": [{ "type": "author", "id": "a1" }]
//!     }
//! });
//!
//! assert_eq!(json::str_at(&data, "data.attributes.title.en"), Some("Berserk"));
//! assert_eq!(json::str_at(&data, "data.relationships.0.id"), Some("a1"));
//! assert_eq!(json::extract_array(&data, "data.relationships").len(), 1);
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;

fn walk<'a>(json: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = json;

    for key in path.split('.') {
        current = match current {
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => current.get(key)?,
        };
    }

    Some(current)
}

/// Extracts a value from nested JSON using dot notation.
///
/// ```rust
/// use shiori::net::json;
/// use serde_json::json;
///
/// let data = json!({ "manga": { "title": "One Piece" } });
/// assert_eq!(json::extract_path(&data, "manga.title").unwrap().as_str(), Some("One Piece"));
/// assert_eq!(json::extract_path(&data, "manga.author"), None);
/// ```
pub fn extract_path(json: &Value, path: &str) -> Option<Value> {
    walk(json, path).cloned()
}

/// Extracts and deserializes the value at `path`.
///
/// # Errors
///
/// * [`Error::Parse`](crate::Error::Parse) - If the path doesn't exist
/// * [`Error::Json`](crate::Error::Json) - If deserialization fails
pub fn extract_as<T>(json: &Value, path: &str) -> crate::Result<T>
where
    T: DeserializeOwned,
{
    extract_path(json, path)
        .ok_or_else(|| crate::Error::parse(format!("Path not found: {}", path)))
        .and_then(|v| serde_json::from_value(v).map_err(Into::into))
}

/// The array at `path`, or an empty vector when missing or not an array.
pub fn extract_array(json: &Value, path: &str) -> Vec<Value> {
    walk(json, path)
        .and_then(|v| v.as_array().cloned())
        .unwrap_or_default()
}

/// Borrowed string at `path`.
pub fn str_at<'a>(json: &'a Value, path: &str) -> Option<&'a str> {
    walk(json, path).and_then(Value::as_str)
}
