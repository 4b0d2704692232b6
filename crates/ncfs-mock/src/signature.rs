//! Call signatures: the key a simulated request is matched on.
//!
//! A signature is `(method, path-and-query, body)`. Bodies that parse as JSON
//! are compared structurally, so key order and whitespace do not matter;
//! anything else is compared as text. The literal request text is kept for
//! the call log.

use std::fmt;
use std::hash::{Hash, Hasher};

use axum::http::Method;
use serde_json::Value;

/// A classified request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(Value),
    Raw(String),
}

impl Body {
    pub fn parse(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Body::Empty;
        }
        let text = String::from_utf8_lossy(bytes);
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Body::Json(value),
            Err(_) => Body::Raw(text.into_owned()),
        }
    }

    /// Order-independent rendering used for hashing.
    fn canonical(&self) -> String {
        match self {
            Body::Empty => String::new(),
            Body::Raw(text) => format!("raw:{text}"),
            Body::Json(value) => {
                let mut out = String::from("json:");
                write_canonical(value, &mut out);
                out
            }
        }
    }
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// The identity of one simulated request.
#[derive(Debug, Clone)]
pub struct Signature {
    method: Method,
    path: String,
    body: Body,
    literal_body: String,
}

impl Signature {
    pub fn new(method: Method, path: impl Into<String>, body: &[u8]) -> Self {
        Self {
            method,
            path: path.into(),
            body: Body::parse(body),
            literal_body: String::from_utf8_lossy(body).into_owned(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path, b"")
    }

    pub fn post(path: impl Into<String>, body: &str) -> Self {
        Self::new(Method::POST, path, body.as_bytes())
    }

    pub fn put(path: impl Into<String>, body: &str) -> Self {
        Self::new(Method::PUT, path, body.as_bytes())
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &Body {
        &self.body
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.method == other.method && self.path == other.path && self.body == other.body
    }
}

impl Eq for Signature {}

impl Hash for Signature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.method.as_str().hash(state);
        self.path.hash(state);
        self.body.canonical().hash(state);
    }
}

/// `"<METHOD> <path> <body>"`, with the body exactly as sent.
impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.method, self.path, self.literal_body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(sig: &Signature) -> u64 {
        let mut h = DefaultHasher::new();
        sig.hash(&mut h);
        h.finish()
    }

    #[test]
    fn test_json_bodies_compare_structurally() {
        let a = Signature::post("/x", r#"{"path":"/subdir","resource_id":{"opaque_id":"o"}}"#);
        let b = Signature::post("/x", r#"{ "resource_id": {"opaque_id": "o"}, "path": "/subdir" }"#);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_different_values_differ() {
        let a = Signature::post("/x", r#"{"path":"/subdir"}"#);
        let b = Signature::post("/x", r#"{"path":"/newdir"}"#);
        assert_ne!(a, b);
    }

    #[test]
    fn test_method_and_path_matter() {
        assert_ne!(Signature::post("/x", ""), Signature::get("/x"));
        assert_ne!(Signature::post("/x", ""), Signature::post("/y", ""));
    }

    #[test]
    fn test_raw_body() {
        let sig = Signature::put("/Upload/some/file/path.txt", "shiny!");
        assert_eq!(sig.body(), &Body::Raw("shiny!".into()));
        assert_eq!(sig, Signature::put("/Upload/some/file/path.txt", "shiny!"));
        assert_ne!(sig, Signature::put("/Upload/some/file/path.txt", "shiny?"));
    }

    #[test]
    fn test_display_is_literal() {
        assert_eq!(
            Signature::post("/apps/sciencemesh/~tester/api/GetHome", "").to_string(),
            "POST /apps/sciencemesh/~tester/api/GetHome "
        );
        let body = r#"{ "path": "/subdir" }"#;
        assert_eq!(
            Signature::post("/p", body).to_string(),
            format!("POST /p {body}")
        );
    }

    #[test]
    fn test_canonical_sorts_nested_keys() {
        let body = Body::parse(br#"{"b":{"z":1,"a":[{"y":2,"x":3}]},"a":null}"#);
        assert_eq!(body.canonical(), r#"json:{"a":null,"b":{"a":[{"x":3,"y":2}],"z":1}}"#);
    }
}
