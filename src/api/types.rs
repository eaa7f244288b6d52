// src/api/types.rs
// =============================================================================
// Data types shared between the HTTP client and the browsing pipeline.
//
// Two kinds of types live here:
// - Domain types (RepoRef, DirEntry, EntryKind) that the rest of the app uses
// - Wire types (the exact JSON shapes the hub sends back) which are converted
//   into domain types as soon as a response is decoded
// =============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

// Identifies a repository on the hub: "namespace/name"
//
// Fields are private so a RepoRef can't be changed after it is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    namespace: String,
    name: String,
}

impl RepoRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    // Parses "namespace/name" (e.g. "ox/CatDogBBox")
    //
    // Returns None when either half is missing or there are extra slashes.
    pub fn parse(input: &str) -> Option<Self> {
        let (namespace, name) = input.split_once('/')?;
        if namespace.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self::new(namespace, name))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Whether a listing entry is a file or a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
}

impl EntryKind {
    // The hub reports a data type per entry ("dir", "text", "image", "tabular", ...).
    // Only "dir" is a directory; every other value is something we can preview.
    fn from_wire(data_type: &str) -> Self {
        if data_type == "dir" {
            EntryKind::Dir
        } else {
            EntryKind::File
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::File => write!(f, "file"),
            EntryKind::Dir => write!(f, "dir"),
        }
    }
}

// One file or directory inside a listing
//
// `path` is repo-relative and unique within a listing, so it doubles as
// the identity of the entry's preview slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntry {
    pub filename: String,
    pub path: String,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

// ----------------------------------------------------------------------------
// Wire types
// ----------------------------------------------------------------------------

// Body of GET /api/repos/{ns}/{repo}/list
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse {
    #[serde(default)]
    pub entries: Option<Vec<WireEntry>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireEntry {
    pub filename: String,
    pub path: String,
    #[serde(rename = "type", default)]
    pub data_type: String,
}

impl From<WireEntry> for DirEntry {
    fn from(entry: WireEntry) -> Self {
        DirEntry {
            kind: EntryKind::from_wire(&entry.data_type),
            filename: entry.filename,
            path: entry.path,
        }
    }
}

// JSON flavour of GET .../preview_file
#[derive(Debug, Deserialize)]
pub(crate) struct RawTextBody {
    #[serde(rename = "rawText", default)]
    pub raw_text: Option<String>,
}

// Body of GET .../file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileInfo {
    #[serde(rename = "fileUrl")]
    pub file_url: String,
}

// Any non-2xx body may carry a human readable {"error": "..."}
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    #[serde(rename = "apiKey")]
    pub api_key: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repo_ref() {
        let repo = RepoRef::parse("ox/CatDogBBox").unwrap();
        assert_eq!(repo.namespace(), "ox");
        assert_eq!(repo.name(), "CatDogBBox");
        assert_eq!(repo.to_string(), "ox/CatDogBBox");
    }

    #[test]
    fn test_parse_repo_ref_rejects_bad_input() {
        assert!(RepoRef::parse("CatDogBBox").is_none());
        assert!(RepoRef::parse("/CatDogBBox").is_none());
        assert!(RepoRef::parse("ox/").is_none());
        assert!(RepoRef::parse("ox/a/b").is_none());
    }

    #[test]
    fn test_wire_entry_kinds() {
        let body = r#"{"entries":[
            {"filename":"images","path":"images","type":"dir"},
            {"filename":"data.csv","path":"data.csv","type":"tabular"},
            {"filename":"notes","path":"notes"}
        ]}"#;
        let parsed: ListResponse = serde_json::from_str(body).unwrap();
        let entries: Vec<DirEntry> = parsed
            .entries
            .unwrap()
            .into_iter()
            .map(DirEntry::from)
            .collect();

        assert_eq!(entries[0].kind, EntryKind::Dir);
        assert_eq!(entries[1].kind, EntryKind::File);
        assert_eq!(entries[2].kind, EntryKind::File);
    }

    #[test]
    fn test_missing_entries_field() {
        let parsed: ListResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.entries.is_none());
    }
}
