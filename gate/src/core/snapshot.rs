//! Parsing of todo documents into snapshots.
//!
//! Stored documents may be missing or corrupt; [`Parsed`] keeps those cases
//! visible to callers instead of folding them into an error.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::core::types::{Snapshot, TodoItem};

/// Result of reading an optional stored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed<T> {
    /// The document existed and decoded.
    Loaded(T),
    /// No document was stored under the key.
    Missing,
    /// The document existed but could not be decoded.
    Malformed { error: String },
}

impl<T> Parsed<T> {
    /// Decode `raw` as JSON; `None` means the key was absent.
    pub fn from_json(raw: Option<&str>) -> Self
    where
        T: DeserializeOwned,
    {
        match raw {
            None => Parsed::Missing,
            Some(raw) => match serde_json::from_str(raw) {
                Ok(value) => Parsed::Loaded(value),
                Err(err) => Parsed::Malformed {
                    error: err.to_string(),
                },
            },
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Parsed<U> {
        match self {
            Parsed::Loaded(value) => Parsed::Loaded(f(value)),
            Parsed::Missing => Parsed::Missing,
            Parsed::Malformed { error } => Parsed::Malformed { error },
        }
    }

    pub fn loaded(self) -> Option<T> {
        match self {
            Parsed::Loaded(value) => Some(value),
            Parsed::Missing | Parsed::Malformed { .. } => None,
        }
    }

    pub fn into_value_or_default(self) -> T
    where
        T: Default,
    {
        self.loaded().unwrap_or_default()
    }
}

/// Accepted document shapes: a bare array or an object wrapping `todos`.
#[derive(Deserialize)]
#[serde(untagged)]
enum TodoDocument {
    Bare(Vec<TodoItem>),
    Wrapped { todos: Vec<TodoItem> },
}

impl From<TodoDocument> for Snapshot {
    fn from(doc: TodoDocument) -> Self {
        match doc {
            TodoDocument::Bare(todos) | TodoDocument::Wrapped { todos } => todos,
        }
    }
}

/// Parse a todo document (`[...]` or `{"todos": [...]}`).
pub fn parse_snapshot(raw: &str) -> serde_json::Result<Snapshot> {
    serde_json::from_str::<TodoDocument>(raw).map(Snapshot::from)
}

/// Same as [`parse_snapshot`] for an already decoded JSON value.
pub fn snapshot_from_value(value: serde_json::Value) -> serde_json::Result<Snapshot> {
    serde_json::from_value::<TodoDocument>(value).map(Snapshot::from)
}

/// Parse an optional stored snapshot without failing on corrupt data.
pub fn parse_stored_snapshot(raw: Option<&str>) -> Parsed<Snapshot> {
    Parsed::<TodoDocument>::from_json(raw).map(Snapshot::from)
}

/// First item with `content`; later duplicates are ignored.
pub fn find_item<'a>(snapshot: &'a [TodoItem], content: &str) -> Option<&'a TodoItem> {
    snapshot.iter().find(|item| item.content == content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TodoStatus;

    #[test]
    fn parses_bare_array_and_ignores_extra_fields() {
        let raw = r#"[
            {"content": "Write tests", "status": "completed", "activeForm": "Writing tests", "id": "1", "priority": "high"},
            {"content": "Ship", "status": "in_progress"}
        ]"#;
        let snapshot = parse_snapshot(raw).expect("parse");
        assert_eq!(
            snapshot,
            vec![
                TodoItem::new("Write tests", TodoStatus::Completed),
                TodoItem::new("Ship", TodoStatus::InProgress),
            ]
        );
    }

    #[test]
    fn parses_wrapped_todos_object() {
        let raw = r#"{"todos": [{"content": "a", "status": "pending"}]}"#;
        let snapshot = parse_snapshot(raw).expect("parse");
        assert_eq!(snapshot, vec![TodoItem::new("a", TodoStatus::Pending)]);
    }

    #[test]
    fn rejects_unknown_status() {
        let raw = r#"[{"content": "a", "status": "done"}]"#;
        assert!(parse_snapshot(raw).is_err());
    }

    #[test]
    fn stored_snapshot_distinguishes_missing_from_malformed() {
        assert_eq!(parse_stored_snapshot(None), Parsed::Missing);
        assert!(matches!(
            parse_stored_snapshot(Some("{not json")),
            Parsed::Malformed { .. }
        ));
        assert_eq!(parse_stored_snapshot(Some("[]")), Parsed::Loaded(Vec::new()));
    }

    #[test]
    fn find_item_prefers_first_duplicate() {
        let snapshot = vec![
            TodoItem::new("dup", TodoStatus::Pending),
            TodoItem::new("dup", TodoStatus::Completed),
        ];
        let found = find_item(&snapshot, "dup").expect("found");
        assert_eq!(found.status, TodoStatus::Pending);
        assert!(find_item(&snapshot, "other").is_none());
    }
}
