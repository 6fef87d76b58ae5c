//! Global object identifiers
//!
//! A global ID is the standard base64 encoding of `"{tag}:{local_id}"`.
//! It hides the pair from casual inspection but is not a secret.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::{GraphQLError, Result};

const SEPARATOR: char = ':';

/// Every kind of node reachable through a global ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    User,
    Setting,
    Option,
    Page,
    Post,
    Postmeta,
    Menu,
}

impl NodeKind {
    /// All kinds, in registration order
    pub const ALL: [NodeKind; 7] = [
        NodeKind::User,
        NodeKind::Setting,
        NodeKind::Option,
        NodeKind::Page,
        NodeKind::Post,
        NodeKind::Postmeta,
        NodeKind::Menu,
    ];

    /// Tag written into global IDs
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::User => "User",
            NodeKind::Setting => "Setting",
            NodeKind::Option => "Option",
            NodeKind::Page => "Page",
            NodeKind::Post => "Post",
            NodeKind::Postmeta => "Postmeta",
            NodeKind::Menu => "Menu",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = GraphQLError;

    fn from_str(s: &str) -> Result<Self> {
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| GraphQLError::UnknownTag(s.to_string()))
    }
}

/// Decoded global ID of a registered kind
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlobalId {
    pub kind: NodeKind,
    pub local_id: String,
}

impl GlobalId {
    pub fn new(kind: NodeKind, local_id: impl fmt::Display) -> Self {
        Self {
            kind,
            local_id: local_id.to_string(),
        }
    }

    /// Encoded form; registered tags never contain the separator
    pub fn encode(&self) -> String {
        encode_unchecked(self.kind.as_str(), &self.local_id)
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for GlobalId {
    type Err = GraphQLError;

    fn from_str(s: &str) -> Result<Self> {
        decode(s)
    }
}

/// Encode a `(tag, local_id)` pair
///
/// The tag does not have to be registered, but it must be non-empty and free
/// of `:`. The local ID is used as-is.
pub fn encode(type_tag: &str, local_id: impl fmt::Display) -> Result<String> {
    if type_tag.is_empty() {
        return Err(GraphQLError::InvalidTag("tag is empty".to_string()));
    }
    if type_tag.contains(SEPARATOR) {
        return Err(GraphQLError::InvalidTag(format!(
            "'{}' contains the '{}' separator",
            type_tag, SEPARATOR
        )));
    }
    Ok(encode_unchecked(type_tag, &local_id.to_string()))
}

fn encode_unchecked(type_tag: &str, local_id: &str) -> String {
    BASE64.encode(format!("{}{}{}", type_tag, SEPARATOR, local_id))
}

/// Decode a global ID into its raw `(tag, local_id)` pair
pub fn decode_raw(global_id: &str) -> Result<(String, String)> {
    let bytes = BASE64
        .decode(global_id.as_bytes())
        .map_err(|e| GraphQLError::MalformedIdentifier(e.to_string()))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| GraphQLError::MalformedIdentifier(e.to_string()))?;
    let (tag, local_id) = text.split_once(SEPARATOR).ok_or_else(|| {
        GraphQLError::MalformedIdentifier(format!("missing '{}' separator", SEPARATOR))
    })?;
    if tag.is_empty() {
        return Err(GraphQLError::MalformedIdentifier("empty type tag".to_string()));
    }
    Ok((tag.to_string(), local_id.to_string()))
}

/// Decode a global ID naming a registered kind
pub fn decode(global_id: &str) -> Result<GlobalId> {
    let (tag, local_id) = decode_raw(global_id)?;
    let kind = tag.parse::<NodeKind>()?;
    Ok(GlobalId { kind, local_id })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_matches_relay_format() {
        // base64("Post:42")
        assert_eq!(encode("Post", 42).unwrap(), "UG9zdDo0Mg==");
    }

    #[test]
    fn test_roundtrip_every_kind() {
        for kind in NodeKind::ALL {
            let encoded = encode(kind.as_str(), "7").unwrap();
            let decoded = decode(&encoded).unwrap();
            assert_eq!(decoded, GlobalId::new(kind, "7"));
        }
    }

    #[test]
    fn test_local_id_may_contain_separator() {
        let encoded = encode("Menu", "main:footer").unwrap();
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded.kind, NodeKind::Menu);
        assert_eq!(decoded.local_id, "main:footer");
    }

    #[test]
    fn test_empty_local_id_is_kept() {
        let decoded = decode(&encode("Setting", "").unwrap()).unwrap();
        assert_eq!(decoded.local_id, "");
    }

    #[test]
    fn test_invalid_tags() {
        assert!(matches!(encode("", 1), Err(GraphQLError::InvalidTag(_))));
        assert!(matches!(encode("A:B", 1), Err(GraphQLError::InvalidTag(_))));
    }

    #[test]
    fn test_malformed_identifiers() {
        let inputs = vec![
            "not base64!".to_string(),
            "UG9zdDo0Mg".to_string(),
            String::new(),
            BASE64.encode("no-separator"),
            BASE64.encode(":7"),
            BASE64.encode([0xff, 0xfe, b':', b'1']),
        ];
        for input in inputs {
            assert!(
                matches!(decode(&input), Err(GraphQLError::MalformedIdentifier(_))),
                "{input:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_unknown_tag_is_distinguished() {
        let encoded = encode("Comment", 9).unwrap();
        assert!(matches!(decode(&encoded), Err(GraphQLError::UnknownTag(tag)) if tag == "Comment"));
        assert_eq!(decode_raw(&encoded).unwrap(), ("Comment".to_string(), "9".to_string()));
    }

    #[test]
    fn test_global_id_display_and_parse() {
        let id = GlobalId::new(NodeKind::Postmeta, 11);
        let parsed: GlobalId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }
}
