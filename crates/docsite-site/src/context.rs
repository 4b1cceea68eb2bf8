//! Read-only snapshot of a finished site.

use std::collections::HashMap;

use docsite_renderer::{PageMetadata, escape_html, extract_h1};

use crate::tree::{SiteNode, file_stem, split_path};

/// Everything page rendering needs to know about the rest of the site.
///
/// Built once after all pages and index pages are written and shared by
/// reference with every page task afterwards. Metadata and contents are
/// keyed by site-relative page path.
#[derive(Debug, Default)]
pub struct SiteContext {
    tree: SiteNode,
    metadata: HashMap<String, PageMetadata>,
    contents: HashMap<String, String>,
}

impl SiteContext {
    #[must_use]
    pub fn new(
        tree: SiteNode,
        metadata: HashMap<String, PageMetadata>,
        contents: HashMap<String, String>,
    ) -> Self {
        Self {
            tree,
            metadata,
            contents,
        }
    }

    #[must_use]
    pub fn tree(&self) -> &SiteNode {
        &self.tree
    }

    /// Front-matter of a page, if it declared any.
    #[must_use]
    pub fn metadata(&self, path: &str) -> Option<&PageMetadata> {
        self.metadata.get(path)
    }

    /// Converted HTML of a page (before templating).
    #[must_use]
    pub fn content(&self, path: &str) -> Option<&str> {
        self.contents.get(path).map(String::as_str)
    }

    /// Directory node holding a page.
    #[must_use]
    pub fn node_for(&self, path: &str) -> Option<&SiteNode> {
        self.tree.find(split_path(path).0)
    }

    /// Display title of a page as HTML.
    ///
    /// Front-matter `title` (escaped) wins, then the inner HTML of the
    /// page's first `<h1>`, then the file name without extension.
    #[must_use]
    pub fn title(&self, path: &str) -> String {
        if let Some(title) = self.metadata(path).and_then(PageMetadata::title) {
            return escape_html(title);
        }
        if let Some(h1) = self.content(path).and_then(extract_h1) {
            return h1.to_owned();
        }
        escape_html(file_stem(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn context() -> SiteContext {
        let tree = SiteNode::from_paths(["index.html", "guide/index.html", "guide/setup.html"]);
        let metadata = HashMap::from([(
            "guide/setup.html".to_owned(),
            PageMetadata::from_pairs([("title", "Setup & install")]),
        )]);
        let contents = HashMap::from([
            ("guide/index.html".to_owned(), "<h1>The <code>Guide</code></h1>".to_owned()),
            ("guide/setup.html".to_owned(), "<h1>Ignored</h1>".to_owned()),
            ("index.html".to_owned(), "<p>No heading</p>".to_owned()),
        ]);
        SiteContext::new(tree, metadata, contents)
    }

    #[test]
    fn test_title_prefers_metadata() {
        assert_eq!(context().title("guide/setup.html"), "Setup &amp; install");
    }

    #[test]
    fn test_title_falls_back_to_h1() {
        assert_eq!(context().title("guide/index.html"), "The <code>Guide</code>");
    }

    #[test]
    fn test_title_falls_back_to_file_stem() {
        assert_eq!(context().title("index.html"), "index");
        assert_eq!(context().title("unknown/page.html"), "page");
    }

    #[test]
    fn test_node_for_page() {
        let ctx = context();
        assert_eq!(ctx.node_for("guide/setup.html").unwrap().dir, "guide");
        assert_eq!(ctx.node_for("index.html").unwrap().dir, "");
        assert!(ctx.node_for("missing/page.html").is_none());
    }
}
