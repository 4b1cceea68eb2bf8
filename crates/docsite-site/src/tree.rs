//! Ordered tree of the generated HTML pages.
//!
//! Paths are site-relative and `/`-separated: the root directory is `""`,
//! a page inside it is `guide/setup.html`. Within a directory `index.html`
//! always comes first and the remaining files follow in byte order, so the
//! navigation and the CHILDREN lists share one ordering.

use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use crate::error::BuildError;

/// Name of a directory's landing page.
pub const INDEX_FILE: &str = "index.html";

/// One directory of the generated site.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SiteNode {
    /// Site-relative directory path (`""` for the root).
    pub dir: String,
    /// HTML file names, `index.html` first.
    pub files: Vec<String>,
    /// Sub-directories in ascending name order.
    pub children: Vec<SiteNode>,
}

impl SiteNode {
    /// Create an empty node for a directory.
    #[must_use]
    pub fn new(dir: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    /// Build a tree from site-relative page paths.
    ///
    /// # Example
    ///
    /// ```
    /// use docsite_site::SiteNode;
    ///
    /// let tree = SiteNode::from_paths(["guide/setup.html", "guide/index.html", "index.html"]);
    /// assert_eq!(tree.files, vec!["index.html"]);
    /// assert_eq!(tree.children[0].files, vec!["index.html", "setup.html"]);
    /// ```
    pub fn from_paths<S: AsRef<str>>(paths: impl IntoIterator<Item = S>) -> Self {
        let mut root = Self::new("");
        for path in paths {
            root.insert(path.as_ref());
        }
        root.sort();
        root
    }

    fn insert(&mut self, relative: &str) {
        match relative.split_once('/') {
            None => self.files.push(relative.to_owned()),
            Some((name, rest)) => {
                let dir = join_path(&self.dir, name);
                let position = self.children.iter().position(|c| c.dir == dir);
                let child = match position {
                    Some(pos) => &mut self.children[pos],
                    None => {
                        self.children.push(Self::new(dir));
                        let last = self.children.len() - 1;
                        &mut self.children[last]
                    }
                };
                child.insert(rest);
            }
        }
    }

    fn sort(&mut self) {
        self.files.sort_by(|a, b| compare_file_names(a, b));
        self.children.sort_by(|a, b| a.dir.cmp(&b.dir));
        for child in &mut self.children {
            child.sort();
        }
    }

    /// Last segment of the directory path.
    #[must_use]
    pub fn name(&self) -> &str {
        self.dir.rsplit('/').next().unwrap_or_default()
    }

    /// Site-relative path of one of this directory's files.
    #[must_use]
    pub fn file_path(&self, file_name: &str) -> String {
        join_path(&self.dir, file_name)
    }

    /// Whether the directory has an `index.html`.
    #[must_use]
    pub fn has_index(&self) -> bool {
        self.files.first().is_some_and(|f| f == INDEX_FILE)
    }

    /// Site-relative path of the directory's `index.html`, if present.
    #[must_use]
    pub fn index_path(&self) -> Option<String> {
        self.has_index().then(|| self.file_path(INDEX_FILE))
    }

    /// Whether `path` is one of this directory's own files.
    #[must_use]
    pub fn has_file(&self, path: &str) -> bool {
        let (dir, name) = split_path(path);
        dir == self.dir && self.files.iter().any(|f| f == name)
    }

    /// Whether `path` is a file of this directory or of any directory below it.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.has_file(path) || self.children.iter().any(|child| child.contains(path))
    }

    /// Find the node for a site-relative directory path.
    #[must_use]
    pub fn find(&self, dir: &str) -> Option<&SiteNode> {
        self.ancestry(dir).and_then(|stack| stack.last().copied())
    }

    /// Nodes from the root down to `dir`, both included.
    #[must_use]
    pub fn ancestry(&self, dir: &str) -> Option<Vec<&SiteNode>> {
        let mut stack = vec![self];
        let mut node = self;
        for segment in dir.split('/').filter(|s| !s.is_empty()) {
            let wanted = join_path(&node.dir, segment);
            node = node.children.iter().find(|c| c.dir == wanted)?;
            stack.push(node);
        }
        Some(stack)
    }

    /// All page paths in navigation order: a directory's files, then its
    /// sub-directories.
    #[must_use]
    pub fn page_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_paths(&mut paths);
        paths
    }

    fn collect_paths(&self, out: &mut Vec<String>) {
        out.extend(self.files.iter().map(|f| self.file_path(f)));
        for child in &self.children {
            child.collect_paths(out);
        }
    }

    /// Total number of pages in the tree.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.files.len() + self.children.iter().map(SiteNode::page_count).sum::<usize>()
    }

    /// Register a freshly written `index.html`.
    pub(crate) fn add_index(&mut self) {
        if !self.has_index() {
            self.files.insert(0, INDEX_FILE.to_owned());
        }
    }
}

/// Recursively scan `root` into a [`SiteNode`] tree.
///
/// Only `.html` files are listed; hidden entries are skipped and directories
/// without any page below them are dropped.
///
/// # Errors
///
/// Returns [`BuildError::ListDir`] if a directory cannot be listed.
pub fn build_tree(root: &Path) -> Result<SiteNode, BuildError> {
    scan_dir(root, "")
}

fn scan_dir(path: &Path, dir: &str) -> Result<SiteNode, BuildError> {
    let list_error = |source| BuildError::ListDir {
        path: path.to_path_buf(),
        source,
    };

    let mut node = SiteNode::new(dir);
    for entry in fs::read_dir(path).map_err(list_error)? {
        let entry = entry.map_err(list_error)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let file_type = entry.file_type().map_err(list_error)?;
        if file_type.is_dir() {
            let child = scan_dir(&entry.path(), &join_path(dir, &name))?;
            if !child.files.is_empty() || !child.children.is_empty() {
                node.children.push(child);
            }
        } else if is_html(&name) {
            node.files.push(name);
        }
    }

    node.files.sort_by(|a, b| compare_file_names(a, b));
    node.children.sort_by(|a, b| a.dir.cmp(&b.dir));
    Ok(node)
}

#[allow(clippy::case_sensitive_file_extension_comparisons)]
fn is_html(name: &str) -> bool {
    name.ends_with(".html")
}

/// `index.html` first, then byte order.
fn compare_file_names(a: &str, b: &str) -> Ordering {
    (a != INDEX_FILE).cmp(&(b != INDEX_FILE)).then_with(|| a.cmp(b))
}

/// Join a site-relative directory and a name.
#[must_use]
pub fn join_path(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_owned()
    } else {
        format!("{dir}/{name}")
    }
}

/// Split a site-relative path into directory and file name.
#[must_use]
pub fn split_path(path: &str) -> (&str, &str) {
    path.rsplit_once('/').unwrap_or(("", path))
}

/// File name without its extension.
#[must_use]
pub fn file_stem(path: &str) -> &str {
    let name = split_path(path).1;
    name.rsplit_once('.').map_or(name, |(stem, _)| stem)
}
