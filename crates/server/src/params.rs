//! The explicit capture context a server request is built from.
//!
//! Whatever accepted the connection fills a [`ServerParams`] (or deserializes one) and hands it
//! to [`ServerRequestFactory`](crate::ServerRequestFactory). Nothing is read from process-wide
//! state.

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;

use crate::Params;

/// Everything the receiving server captured about one request.
///
/// ```
/// use micro_message_server::ServerParams;
///
/// let params: ServerParams = serde_json::from_str(r#"{
///     "server": { "REQUEST_METHOD": "POST", "HTTP_HOST": "example.com", "REQUEST_URI": "/upload" },
///     "headers": { "Accept": "text/html, application/json" },
///     "body": "raw body"
/// }"#).unwrap();
///
/// assert_eq!(params.method(), "POST");
/// assert_eq!(&params.body[..], b"raw body");
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerParams {
    /// Server and environment info, CGI style (`REQUEST_METHOD`, `HTTP_HOST`, `REQUEST_URI`, ...).
    pub server: Params,
    /// Header name to its comma separated values.
    pub headers: Params,
    pub query: Params,
    pub cookies: Params,
    pub files: BTreeMap<String, FileSpec>,
    pub parsed_body: Option<Value>,
    pub attributes: BTreeMap<String, Value>,
    #[serde(deserialize_with = "deserialize_body")]
    pub body: Bytes,
}

impl ServerParams {
    pub fn server_param(&self, name: &str) -> Option<&str> {
        self.server.get(name).map(String::as_str).filter(|value| !value.is_empty())
    }

    /// `REQUEST_METHOD`, `GET` when absent.
    pub fn method(&self) -> &str {
        self.server_param("REQUEST_METHOD").unwrap_or("GET")
    }

    /// Whether the request arrived over TLS: `HTTPS` is set and not `off`.
    pub fn is_https(&self) -> bool {
        self.server_param("HTTPS").is_some_and(|https| !https.eq_ignore_ascii_case("off"))
    }
}

/// The description of one upload field.
///
/// A field posted once is a [`FileSpec::Single`]. A field posted with an array-style name
/// (`docs[]`, `docs[a][b]`) arrives as [`FileSpec::Multi`]: one tree per attribute, all with
/// the same shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FileSpec {
    Single(FileEntry),
    Multi(FileArrays),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub media_type: Option<String>,
    pub tmp_name: String,
    pub error: i64,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileArrays {
    #[serde(default)]
    pub name: Option<SpecTree<Option<String>>>,
    #[serde(default, rename = "type")]
    pub media_type: Option<SpecTree<Option<String>>>,
    pub tmp_name: SpecTree<String>,
    pub error: SpecTree<i64>,
    #[serde(default)]
    pub size: Option<SpecTree<Option<u64>>>,
}

/// One attribute of a multi-file upload: a value, a list, or a map of further trees.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SpecTree<T> {
    Leaf(T),
    List(Vec<SpecTree<T>>),
    Map(BTreeMap<String, SpecTree<T>>),
}

impl<T> SpecTree<T> {
    pub fn leaf(&self) -> Option<&T> {
        match self {
            SpecTree::Leaf(value) => Some(value),
            _ => None,
        }
    }

    /// The subtree at `key`, list positions addressed by their decimal index.
    pub fn child(&self, key: &str) -> Option<&SpecTree<T>> {
        match self {
            SpecTree::Leaf(_) => None,
            SpecTree::List(items) => key.parse::<usize>().ok().and_then(|index| items.get(index)),
            SpecTree::Map(entries) => entries.get(key),
        }
    }

    /// Keys of the direct subtrees, empty for a leaf.
    pub fn keys(&self) -> Vec<String> {
        match self {
            SpecTree::Leaf(_) => Vec::new(),
            SpecTree::List(items) => (0..items.len()).map(|index| index.to_string()).collect(),
            SpecTree::Map(entries) => entries.keys().cloned().collect(),
        }
    }
}

/// Accepts the body as a string or as an array of bytes.
fn deserialize_body<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
    struct BodyVisitor;

    impl<'de> Visitor<'de> for BodyVisitor {
        type Value = Bytes;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or a sequence of bytes")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Bytes, E> {
            Ok(Bytes::copy_from_slice(v.as_bytes()))
        }

        fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Bytes, E> {
            Ok(Bytes::copy_from_slice(v))
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Bytes, A::Error> {
            let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or_default());
            while let Some(byte) = seq.next_element::<u8>()? {
                bytes.push(byte);
            }
            Ok(Bytes::from(bytes))
        }
    }

    deserializer.deserialize_any(BodyVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let params = ServerParams::default();

        assert_eq!(params.method(), "GET");
        assert!(!params.is_https());
        assert!(params.body.is_empty());
    }

    #[test]
    fn https_flag() {
        let mut params = ServerParams::default();
        params.server.insert("HTTPS".to_string(), "on".to_string());
        assert!(params.is_https());

        params.server.insert("HTTPS".to_string(), "OFF".to_string());
        assert!(!params.is_https());

        params.server.insert("HTTPS".to_string(), String::new());
        assert!(!params.is_https());
    }

    #[test]
    fn body_from_bytes() {
        let params: ServerParams = serde_json::from_str(r#"{ "body": [104, 105] }"#).unwrap();
        assert_eq!(&params.body[..], b"hi");
    }

    #[test]
    fn single_and_multi_files() {
        let params: ServerParams = serde_json::from_str(
            r#"{
                "files": {
                    "avatar": { "name": "me.png", "type": "image/png", "tmp_name": "/tmp/a", "error": 0, "size": 10 },
                    "docs": {
                        "name": ["a.pdf", "b.pdf"],
                        "type": ["application/pdf", "application/pdf"],
                        "tmp_name": ["/tmp/b", "/tmp/c"],
                        "error": [0, 4],
                        "size": [1, null]
                    }
                }
            }"#,
        )
        .unwrap();

        match &params.files["avatar"] {
            FileSpec::Single(entry) => {
                assert_eq!(entry.name.as_deref(), Some("me.png"));
                assert_eq!(entry.media_type.as_deref(), Some("image/png"));
                assert_eq!(entry.size, Some(10));
            }
            FileSpec::Multi(_) => panic!("avatar should be a single file"),
        }

        match &params.files["docs"] {
            FileSpec::Multi(arrays) => {
                assert_eq!(arrays.error.keys(), ["0", "1"]);
                assert_eq!(arrays.tmp_name.child("1").and_then(SpecTree::leaf).map(String::as_str), Some("/tmp/c"));
                assert_eq!(arrays.size.as_ref().and_then(|s| s.child("1")), Some(&SpecTree::Leaf(None)));
            }
            FileSpec::Single(_) => panic!("docs should be a multi file field"),
        }
    }

    #[test]
    fn nested_spec_tree() {
        let tree: SpecTree<i64> = serde_json::from_str(r#"{ "a": { "b": 1 }, "c": [2, 3] }"#).unwrap();

        assert_eq!(tree.keys(), ["a", "c"]);
        assert_eq!(tree.child("a").and_then(|a| a.child("b")).and_then(SpecTree::leaf), Some(&1));
        assert_eq!(tree.child("c").and_then(|c| c.child("1")).and_then(SpecTree::leaf), Some(&3));
        assert!(tree.child("c").and_then(|c| c.child("x")).is_none());
        assert!(tree.leaf().is_none());
    }
}
