//! Wire records and request payloads for the HackerThink admin REST API.
//!
//! The backend is loose about types: numeric counters sometimes arrive as
//! strings, identifiers as integers, and nullable lists as `null`. Every
//! record here decodes through [`lenient`] so that coercion happens once, at
//! the boundary, and the rest of the codebase only sees validated values.

pub mod lenient;
pub mod records;

use serde::Serialize;
use serde::de::{DeserializeOwned, Error as _};
use serde_json::Value;

pub use records::{
    Category, Interview, NewsItem, Product, ProductStatus, PublicationStatus, Tutorial,
};

/// Partial update flipping a record's `status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusPatch<'a> {
    pub status: &'a str,
}

/// Partial update flipping a tutorial's `is_active` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActivePatch {
    pub is_active: bool,
}

/// Extract the collection stored under `key` in a response envelope.
///
/// A missing or `null` key yields an empty collection. A bare JSON array is
/// accepted as the collection itself.
pub fn decode_collection<T: DeserializeOwned>(
    body: Value,
    key: &str,
) -> Result<Vec<T>, serde_json::Error> {
    match body {
        Value::Object(mut map) => match map.remove(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(items) => serde_json::from_value(items),
        },
        Value::Array(_) => serde_json::from_value(body),
        Value::Null => Ok(Vec::new()),
        other => Err(serde_json::Error::custom(format!(
            "expected an object with key `{key}`, found {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_envelope_key_is_empty() {
        let items: Vec<Category> =
            decode_collection(json!({ "other": [] }), "categories").expect("decoded");
        assert!(items.is_empty());
    }

    #[test]
    fn envelope_key_is_decoded() {
        let items: Vec<Category> = decode_collection(
            json!({ "categories": [{ "id": 7, "name": "Research" }] }),
            "categories",
        )
        .expect("decoded");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "7");
        assert_eq!(items[0].name, "Research");
    }

    #[test]
    fn scalar_body_is_rejected() {
        let err = decode_collection::<Category>(json!("nope"), "categories")
            .expect_err("scalar rejected");
        assert!(err.to_string().contains("categories"));
    }

    #[test]
    fn status_patch_serializes_status_only() {
        let body = serde_json::to_value(StatusPatch {
            status: "published",
        })
        .expect("serialized");
        assert_eq!(body, json!({ "status": "published" }));
    }
}
