//! Selection scope.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::library::{NodeType, TreeNode};

/// The subset of the library eligible for random selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path", rename_all = "lowercase")]
pub enum Scope {
    /// The entire library.
    #[default]
    Root,
    /// Every video below one folder.
    Folder(String),
    /// A single file.
    File(String),
}

impl Scope {
    pub fn folder(path: impl Into<String>) -> Self {
        Self::Folder(path.into())
    }

    pub fn file(path: impl Into<String>) -> Self {
        Self::File(path.into())
    }

    /// Path sent as the `target` query parameter; `None` for the whole library.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Root => None,
            Self::Folder(path) | Self::File(path) => Some(path),
        }
    }

    /// Scope matching a node picked from the library tree.
    pub fn from_node(node: &TreeNode) -> Self {
        match node.node_type {
            NodeType::Dir => Self::Folder(node.path.clone()),
            NodeType::File => Self::File(node.path.clone()),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::Folder(path) => write!(f, "folder:{path}"),
            Self::File(path) => write!(f, "file:{path}"),
        }
    }
}
