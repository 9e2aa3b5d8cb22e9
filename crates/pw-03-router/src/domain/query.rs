//! Query string parsing.
//!
//! The part after `?` becomes a flat map. `key=value` pairs map to text,
//! a bare `key` maps to a flag. Later duplicates win.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Text(String),
    /// Key present without `=`.
    Flag,
}

impl QueryValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Flag => None,
        }
    }

    #[must_use]
    pub fn is_flag(&self) -> bool {
        matches!(self, Self::Flag)
    }
}

impl Serialize for QueryValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Flag => serializer.serialize_bool(true),
        }
    }
}

pub type Query = BTreeMap<String, QueryValue>;

/// Split `path?query` into the path and the raw query.
#[must_use]
pub fn split_query(full_path: &str) -> (&str, &str) {
    let without_fragment = full_path.split('#').next().unwrap_or_default();
    without_fragment
        .split_once('?')
        .unwrap_or((without_fragment, ""))
}

#[must_use]
pub fn parse_query(raw: &str) -> Query {
    raw.trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| match pair.split_once('=') {
            Some((key, value)) => {
                let key = decode(key);
                (!key.is_empty()).then(|| (key, QueryValue::Text(decode(value))))
            }
            None => Some((decode(pair), QueryValue::Flag)),
        })
        .collect()
}

/// Percent-decode a query component; `+` is a space. Invalid escapes are
/// kept verbatim.
fn decode(component: &str) -> String {
    let bytes = component.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                match (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 2;
                    }
                    _ => out.push(b'%'),
                }
            }
            byte => out.push(byte),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_flag_values() {
        let query = parse_query("tab=results&live&lap=12");
        assert_eq!(query["tab"], QueryValue::Text("results".into()));
        assert_eq!(query["live"], QueryValue::Flag);
        assert_eq!(query["lap"].as_str(), Some("12"));
    }

    #[test]
    fn test_split_query_drops_fragment() {
        assert_eq!(split_query("/races/42?tab=results#top"), ("/races/42", "tab=results"));
        assert_eq!(split_query("/feed"), ("/feed", ""));
    }

    #[test]
    fn test_decoding_and_duplicates() {
        let query = parse_query("q=monza+gp&q=spa%20francorchamps&bad=%zz");
        assert_eq!(query["q"].as_str(), Some("spa francorchamps"));
        assert_eq!(query["bad"].as_str(), Some("%zz"));
    }

    #[test]
    fn test_empty_query() {
        assert!(parse_query("").is_empty());
        assert!(parse_query("&&").is_empty());
    }

    #[test]
    fn test_flag_serializes_as_true() {
        let query = parse_query("live&tab=x");
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            serde_json::json!({ "live": true, "tab": "x" })
        );
    }
}
