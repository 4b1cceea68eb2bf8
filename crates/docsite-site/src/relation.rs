//! Navigation relationship between a nav item and the current page.
//!
//! A nav item is one file of a directory node. Its relation to the page
//! being rendered decides the CSS state class in the side navigation.
//! A directory's `index.html` stands for the directory itself: its
//! siblings are the other files of the parent directory, and everything
//! below the directory counts as its descendant.

use crate::tree::{INDEX_FILE, SiteNode};

/// Navigation state of one item, after priority resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavState {
    Current,
    CurrentIsDescendant,
    Sibling,
    ChildOfCurrent,
    None,
}

impl NavState {
    /// CSS modifier class for the state.
    #[must_use]
    pub fn class(self) -> Option<&'static str> {
        match self {
            Self::Current => Some("sidenav__item--current"),
            // Class name is part of the published stylesheet contract.
            Self::CurrentIsDescendant => Some("sidenav__item--current-is-decendant"),
            Self::Sibling => Some("sidenav__item--current-is-sibling"),
            Self::ChildOfCurrent => Some("sidenav__item--is-child-of-current"),
            Self::None => None,
        }
    }
}

/// Raw relationship flags of a nav item. Several may hold at once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Relations {
    pub is_current: bool,
    pub has_descendant_current: bool,
    pub is_sibling: bool,
    pub is_child_of_current: bool,
}

impl Relations {
    /// Classify file `file_index` of `node` against `current`.
    ///
    /// `ancestors` holds the nodes from the root down to the parent of
    /// `node` (empty for the root).
    #[must_use]
    pub fn classify(
        ancestors: &[&SiteNode],
        node: &SiteNode,
        file_index: usize,
        current: &str,
    ) -> Self {
        let Some(file) = node.files.get(file_index) else {
            return Self::default();
        };
        let path = node.file_path(file);
        let is_index = file == INDEX_FILE;
        let parent = ancestors.last().copied();

        let is_current = path == current;

        let has_descendant_current = if is_index {
            node.contains(current)
        } else {
            is_current
        };

        let is_sibling = node.files.iter().skip(1).any(|f| node.file_path(f) == current)
            || node
                .children
                .iter()
                .any(|child| child.index_path().is_some_and(|p| p == current))
            || (is_index
                && parent.is_some_and(|p| {
                    p.files
                        .iter()
                        .filter(|f| *f != INDEX_FILE)
                        .any(|f| p.file_path(f) == current)
                }));

        let is_child_of_current = if is_index {
            parent
                .and_then(SiteNode::index_path)
                .is_some_and(|p| p == current)
        } else {
            node.index_path().is_some_and(|p| p == current)
        };

        Self {
            is_current,
            has_descendant_current,
            is_sibling,
            is_child_of_current,
        }
    }

    /// Resolve the flags by priority: current, descendant, sibling, child.
    #[must_use]
    pub fn state(self) -> NavState {
        if self.is_current {
            NavState::Current
        } else if self.has_descendant_current {
            NavState::CurrentIsDescendant
        } else if self.is_sibling {
            NavState::Sibling
        } else if self.is_child_of_current {
            NavState::ChildOfCurrent
        } else {
            NavState::None
        }
    }
}
