//! Directory tree reconstruction and import layout classification.
//!
//! The flat list of [`VirtualFile`]s coming out of the reader is regrouped into a
//! [`TreeNode`] hierarchy keyed by path segment, then [`classify`] decides which of
//! the recognized layouts it represents:
//!
//! 1. Files at the current level: [`Layout::Flat`]. Loose files always win over any
//!    deeper structure at the same level.
//! 2. Child folders named after catalog tracks: [`Layout::TrackGrouped`] with just
//!    those folders. Other siblings are left out of the import.
//! 3. A single wrapper folder: descend into it and start over.
//! 4. Anything else: [`Layout::Unrecognized`].

use crate::models::catalog::TrackCatalog;
use crate::models::setup::VirtualFile;
use crate::services::source::normalize_path;
use indexmap::IndexMap;

/// One directory level of an import
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeNode {
    pub files: Vec<VirtualFile>,
    pub children: IndexMap<String, TreeNode>,
}

impl TreeNode {
    /// Build the hierarchy for `files`.
    ///
    /// Children are keyed by the exact (case-sensitive) segment and kept in first-seen
    /// order. Each file's `name` is reset to its leaf segment.
    pub fn build(files: Vec<VirtualFile>) -> Self {
        let mut root = TreeNode::default();

        for file in files {
            let normalized = normalize_path(&file.path);
            let mut parts: Vec<&str> = normalized.split('/').filter(|p| !p.is_empty()).collect();
            let name = parts.pop().map(str::to_string).unwrap_or(file.name);

            let mut node = &mut root;
            for part in parts {
                node = node.children.entry(part.to_string()).or_default();
            }
            node.files.push(VirtualFile {
                path: file.path,
                name,
                content: file.content,
            });
        }

        root
    }

    /// Every file at or below this node, own files first, then children in order.
    pub fn into_files(self) -> Vec<VirtualFile> {
        let mut collected = self.files;
        for child in self.children.into_values() {
            collected.extend(child.into_files());
        }
        collected
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
            + self
                .children
                .values()
                .map(TreeNode::file_count)
                .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.children.is_empty()
    }
}

/// Recognized shape of an import
#[derive(Debug, Clone, PartialEq)]
pub enum Layout {
    /// Files placed directly together; track affiliation must come from the user.
    Flat(Vec<VirtualFile>),

    /// Folders matching catalog tracks, each with its subtree.
    TrackGrouped(Vec<(String, TreeNode)>),

    /// Neither loose files nor track folders; nothing is imported.
    Unrecognized,
}

impl Layout {
    pub fn name(&self) -> &'static str {
        match self {
            Layout::Flat(_) => "flat",
            Layout::TrackGrouped(_) => "track-grouped",
            Layout::Unrecognized => "unrecognized",
        }
    }
}

/// Classify an import tree against the track catalog.
pub fn classify(root: TreeNode, catalog: &TrackCatalog) -> Layout {
    let mut node = root;

    loop {
        if !node.files.is_empty() {
            return Layout::Flat(node.files);
        }

        if node.children.keys().any(|name| catalog.contains(name)) {
            let tracks = node
                .children
                .into_iter()
                .filter(|(name, _)| catalog.contains(name))
                .collect();
            return Layout::TrackGrouped(tracks);
        }

        if node.children.len() != 1 {
            return Layout::Unrecognized;
        }

        match node.children.into_values().next() {
            Some(only_child) => node = only_child,
            None => return Layout::Unrecognized,
        }
    }
}
