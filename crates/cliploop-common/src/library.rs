//! Library listing and cache-status types returned by the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of entry in the library tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Dir,
    File,
}

/// One entry of the `/tree` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Display name (last path component).
    pub name: String,
    /// Path relative to the library root; usable as a scope target.
    pub path: String,
    /// Children of a directory; always empty for files.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn dir(name: impl Into<String>, path: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            node_type: NodeType::Dir,
            name: name.into(),
            path: path.into(),
            children,
        }
    }

    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            node_type: NodeType::File,
            name: name.into(),
            path: path.into(),
            children: Vec::new(),
        }
    }

    /// Number of files at or below this node.
    pub fn file_count(&self) -> usize {
        match self.node_type {
            NodeType::File => 1,
            NodeType::Dir => self.children.iter().map(TreeNode::file_count).sum(),
        }
    }
}

/// Backend-reported progress of caching library media.
///
/// Advisory only: nothing in playback waits on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStatus {
    /// Number of videos known to the backend.
    pub total: u64,
    /// Number of videos already cached.
    pub cached: u64,
    /// File currently being cached, if any.
    #[serde(default)]
    pub caching: Option<String>,
    /// Every known video path.
    #[serde(default)]
    pub videos: Vec<String>,
    /// When this snapshot was received.
    #[serde(default = "Utc::now")]
    pub fetched_at: DateTime<Utc>,
}

impl CacheStatus {
    /// Cached fraction in `[0, 1]`; zero for an empty library.
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.cached.min(self.total) as f64) / (self.total as f64)
    }

    pub fn is_known(&self, file: &str) -> bool {
        self.videos.iter().any(|v| v == file)
    }

    pub fn is_caching(&self, file: &str) -> bool {
        self.caching.as_deref() == Some(file)
    }
}
