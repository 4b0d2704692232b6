//! JSON wire codec.
//!
//! `encode` is deterministic: the same value always produces byte-identical
//! text. `decode` never panics on garbage; it returns [`CodecError`].

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Codec failure.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Value could not be serialized.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Body did not match the expected shape.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// A plain-text reply was not UTF-8.
    #[error("reply is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Serialize a request body.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> CodecResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(CodecError::Encode)
}

/// Deserialize a JSON reply body.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> CodecResult<T> {
    serde_json::from_slice(bytes).map_err(CodecError::Decode)
}

/// Interpret a reply body as plain text (GetHome, GetPathByID).
pub fn decode_text(bytes: &[u8]) -> CodecResult<String> {
    Ok(String::from_utf8(bytes.to_vec())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Reference, ResourceId, ResourceInfo};
    use std::collections::BTreeMap;

    #[test]
    fn test_encoding_is_deterministic() {
        let r = Reference::new(ResourceId::new("storage-id", "opaque-id"), "/some/path");
        let a = encode(&r).unwrap();
        let b = encode(&r.clone()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_map_keys_are_sorted() {
        let mut m = BTreeMap::new();
        m.insert("key3", "val3");
        m.insert("key1", "val1");
        m.insert("key2", "val2");
        assert_eq!(
            encode(&m).unwrap(),
            br#"{"key1":"val1","key2":"val2","key3":"val3"}"#
        );
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        let result: CodecResult<ResourceInfo> = decode(b"response not defined! GET /x ");
        assert!(matches!(result, Err(CodecError::Decode(_))));
    }

    #[test]
    fn test_empty_body_is_a_decode_error() {
        let result: CodecResult<Vec<ResourceInfo>> = decode(b"");
        assert!(matches!(result, Err(CodecError::Decode(_))));
    }

    #[test]
    fn test_decode_text() {
        assert_eq!(decode_text(b"yes we are").unwrap(), "yes we are");
        assert!(matches!(decode_text(&[0xff, 0xfe]), Err(CodecError::Utf8(_))));
    }
}
