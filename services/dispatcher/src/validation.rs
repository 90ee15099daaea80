//! Request body decoding and required-field checks

use serde_json::{Map, Value};

/// Decoded JSON body of a dispatch request
///
/// Field lookups treat an absent key and an explicit `null` the same way:
/// both count as missing.
#[derive(Debug, Clone, Default)]
pub struct RequestBody {
    fields: Map<String, Value>,
}

impl RequestBody {
    /// Decode a raw body. Returns `None` unless the bytes hold a JSON object.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(fields)) => Some(Self { fields }),
            _ => None,
        }
    }

    /// The `method` field naming the operation to dispatch
    pub fn method(&self) -> Option<&str> {
        self.text("method")
    }

    /// A string field
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// An integer field, given either as a JSON number or a numeric string
    pub fn integer(&self, key: &str) -> Option<i64> {
        match self.fields.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// A board coordinate
    pub fn coordinate(&self, key: &str) -> Option<i32> {
        self.integer(key).and_then(|v| i32::try_from(v).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_non_objects() {
        assert!(RequestBody::parse(b"").is_none());
        assert!(RequestBody::parse(b"not json").is_none());
        assert!(RequestBody::parse(b"[1, 2, 3]").is_none());
        assert!(RequestBody::parse(b"\"register\"").is_none());
        assert!(RequestBody::parse(b"{}").is_some());
    }

    #[test]
    fn test_method_must_be_a_string() {
        let body = RequestBody::parse(br#"{"method": "login"}"#).unwrap();
        assert_eq!(body.method(), Some("login"));

        let body = RequestBody::parse(br#"{"method": null}"#).unwrap();
        assert_eq!(body.method(), None);

        let body = RequestBody::parse(br#"{"method": 3}"#).unwrap();
        assert_eq!(body.method(), None);
    }

    #[test]
    fn test_integer_accepts_numbers_and_numeric_strings() {
        let body = RequestBody::parse(
            br#"{"a": 12, "b": "34", "c": " 56 ", "d": "x", "e": 1.5, "f": true}"#,
        )
        .unwrap();

        assert_eq!(body.integer("a"), Some(12));
        assert_eq!(body.integer("b"), Some(34));
        assert_eq!(body.integer("c"), Some(56));
        assert_eq!(body.integer("d"), None);
        assert_eq!(body.integer("e"), None);
        assert_eq!(body.integer("f"), None);
        assert_eq!(body.integer("missing"), None);
    }

    #[test]
    fn test_coordinate_range() {
        let body = RequestBody::parse(br#"{"x": 3, "y": 4294967296, "z": -1}"#).unwrap();

        assert_eq!(body.coordinate("x"), Some(3));
        assert_eq!(body.coordinate("y"), None);
        assert_eq!(body.coordinate("z"), Some(-1));
    }

    #[test]
    fn test_text_ignores_other_types() {
        let body = RequestBody::parse(br#"{"username": "alice", "password": 42}"#).unwrap();

        assert_eq!(body.text("username"), Some("alice"));
        assert_eq!(body.text("password"), None);
    }
}
