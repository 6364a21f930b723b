//! Request tree nodes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Kind of a tree node. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// A leaf describing one HTTP call.
    Request,
    /// A container referencing other items.
    Folder,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => write!(f, "request"),
            Self::Folder => write!(f, "folder"),
        }
    }
}

/// HTTP methods accepted on request items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method
    Get,
    /// HTTP POST method
    Post,
    /// HTTP PUT method
    Put,
    /// HTTP PATCH method
    Patch,
    /// HTTP DELETE method
    Delete,
    /// HTTP HEAD method
    Head,
    /// HTTP OPTIONS method
    Options,
    /// HTTP CONNECT method
    Connect,
    /// HTTP TRACE method
    Trace,
}

impl HttpMethod {
    /// Returns all recognized HTTP methods.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Get,
            Self::Post,
            Self::Put,
            Self::Patch,
            Self::Delete,
            Self::Head,
            Self::Options,
            Self::Connect,
            Self::Trace,
        ]
    }

    /// Returns the method as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Connect => "CONNECT",
            Self::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a token is not a recognized HTTP method.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported HTTP method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    /// Parses a method token, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

/// A node of the request tree.
///
/// The id is not stored here: items live in a map keyed by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Request or folder.
    #[serde(rename = "type")]
    pub item_type: ItemType,

    /// Display name, never empty.
    pub name: String,

    /// HTTP method. Required on requests, absent on folders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Request path. Required on requests, absent on folders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Ordered child ids. Folders only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,

    /// Fields this version does not model, kept for round-trip fidelity.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Item {
    /// Creates a request item.
    #[must_use]
    pub fn request(
        name: impl Into<String>,
        method: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            item_type: ItemType::Request,
            name: name.into(),
            method: Some(method.into()),
            path: Some(path.into()),
            children: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Creates an empty folder item.
    #[must_use]
    pub fn folder(name: impl Into<String>) -> Self {
        Self {
            item_type: ItemType::Folder,
            name: name.into(),
            method: None,
            path: None,
            children: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Sets the child list.
    #[must_use]
    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    /// Returns true if this item is a folder.
    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.item_type == ItemType::Folder
    }

    /// Returns true if this item is a request.
    #[must_use]
    pub fn is_request(&self) -> bool {
        self.item_type == ItemType::Request
    }

    /// Method, treating an empty string as absent.
    #[must_use]
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref().filter(|m| !m.is_empty())
    }

    /// Path, treating an empty string as absent.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref().filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_method_parse_ignores_case() {
        assert_eq!("get".parse::<HttpMethod>(), Ok(HttpMethod::Get));
        assert_eq!("Trace".parse::<HttpMethod>(), Ok(HttpMethod::Trace));
        assert!("FETCH".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_request_serialization_omits_children() {
        let item = Item::request("List", "GET", "/users");
        let json = serde_json::to_value(&item).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"type": "request", "name": "List", "method": "GET", "path": "/users"})
        );
    }

    #[test]
    fn test_folder_serialization_omits_method_and_path() {
        let item = Item::folder("API").with_children(["a", "b"]);
        let json = serde_json::to_value(&item).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"type": "folder", "name": "API", "children": ["a", "b"]})
        );
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let raw = r#"{"type":"request","name":"x","method":"GET","path":"/x","headers":{"a":"b"}}"#;
        let item: Item = serde_json::from_str(raw).expect("deserialize");
        assert_eq!(item.extra.get("headers"), Some(&serde_json::json!({"a": "b"})));

        let back = serde_json::to_value(&item).expect("serialize");
        assert_eq!(back["headers"]["a"], "b");
    }

    #[test]
    fn test_empty_method_is_absent() {
        let mut item = Item::folder("f");
        item.method = Some(String::new());
        assert_eq!(item.method(), None);
    }
}
