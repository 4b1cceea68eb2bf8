//! Pages related to a given page, as candidates for the CHILDREN directive.

use std::collections::BTreeMap;

use crate::tree::{INDEX_FILE, SiteNode};

/// Related page paths of one page, derived from its directory node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelatedPaths {
    /// Non-index pages of the same directory, without the page itself.
    pub siblings: Vec<String>,
    /// `index.html` of every immediate sub-directory.
    pub child_indexes: Vec<String>,
    /// Sub-directory name to its non-index pages.
    pub folder_files: BTreeMap<String, Vec<String>>,
    /// Sub-directory name to the `index.html` of its own sub-directories.
    pub folder_grandchildren: BTreeMap<String, Vec<String>>,
}

impl RelatedPaths {
    /// Collect the related paths of `page_path`, a file of `node`.
    #[must_use]
    pub fn for_page(node: &SiteNode, page_path: &str) -> Self {
        let siblings = node
            .files
            .iter()
            .filter(|f| *f != INDEX_FILE)
            .map(|f| node.file_path(f))
            .filter(|p| p != page_path)
            .collect();

        let child_indexes = node
            .children
            .iter()
            .filter_map(SiteNode::index_path)
            .collect();

        let folder_files = node
            .children
            .iter()
            .map(|child| {
                let files = child
                    .files
                    .iter()
                    .filter(|f| *f != INDEX_FILE)
                    .map(|f| child.file_path(f))
                    .collect();
                (child.name().to_owned(), files)
            })
            .collect();

        let folder_grandchildren = node
            .children
            .iter()
            .map(|child| {
                let indexes = child
                    .children
                    .iter()
                    .filter_map(SiteNode::index_path)
                    .collect();
                (child.name().to_owned(), indexes)
            })
            .collect();

        Self {
            siblings,
            child_indexes,
            folder_files,
            folder_grandchildren,
        }
    }

    /// Whether there is nothing a CHILDREN directive could list.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
            && self.child_indexes.is_empty()
            && self.folder_files.values().all(Vec::is_empty)
            && self.folder_grandchildren.values().all(Vec::is_empty)
    }
}
