use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One child of a remote directory as reported by the `get` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    #[serde(rename = "text")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<i64>,
}

impl EntryRecord {
    pub fn file(name: impl Into<String>, size: u64, modified_time: i64) -> Self {
        Self {
            name: name.into(),
            leaf: Some(true),
            size: Some(size),
            modified_time: Some(modified_time),
        }
    }

    pub fn dir(name: impl Into<String>, modified_time: Option<i64>) -> Self {
        Self {
            name: name.into(),
            leaf: None,
            size: None,
            modified_time,
        }
    }

    // The API omits `leaf` for directories.
    pub fn is_leaf(&self) -> bool {
        self.leaf == Some(true)
    }

    pub fn is_dir(&self) -> bool {
        !self.is_leaf()
    }

    pub fn size(&self) -> u64 {
        self.size.unwrap_or(0)
    }

    pub fn modified_secs(&self) -> i64 {
        self.modified_time.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

/// Metadata returned by `getinfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub name: String,
    pub kind: NodeKind,
    pub size: u64,
    pub modified_time: DateTime<Utc>,
    /// The API has no creation time; this mirrors `modified_time`.
    pub created_time: DateTime<Utc>,
}

impl NodeInfo {
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

impl From<&EntryRecord> for NodeInfo {
    fn from(record: &EntryRecord) -> Self {
        let modified_time = timestamp(record.modified_secs());
        NodeInfo {
            name: record.name.clone(),
            kind: if record.is_leaf() {
                NodeKind::File
            } else {
                NodeKind::Directory
            },
            size: record.size(),
            modified_time,
            created_time: modified_time,
        }
    }
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}
