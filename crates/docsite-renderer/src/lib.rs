//! Markdown conversion and HTML post-processing for docsite.
//!
//! This crate covers everything that happens to a single document:
//! - [`split_front_matter`]: extract [`PageMetadata`] from the document header
//! - [`MarkdownConverter`]: Markdown to HTML, with GitHub alerts rendered as
//!   styled blocks and `.md` links resolved to site paths
//! - Post-processors run on the HTML before it is placed in the page template:
//!   [`add_heading_anchors`], [`qualify_anchor_links`], [`resolve_api_links`]
//!
//! # Example
//!
//! ```
//! use docsite_renderer::{MarkdownConverter, add_heading_anchors, split_front_matter};
//!
//! let source = "---\ntitle: Setup\n---\n## Install it\n";
//! let (metadata, body) = split_front_matter(source);
//! let html = MarkdownConverter::new().convert(body, "guide/setup.html");
//!
//! assert_eq!(metadata.title(), Some("Setup"));
//! assert_eq!(add_heading_anchors(&html).trim(), r#"<h2 id="install-it">Install it</h2>"#);
//! ```

mod front_matter;
mod markdown;
mod postprocess;
mod util;

pub use front_matter::{PageMetadata, split_front_matter};
pub use markdown::{AlertKind, MarkdownConverter};
pub use postprocess::{
    ApiLinkConfig, add_heading_anchors, heading_id, qualify_anchor_links, resolve_api_links,
};
pub use util::{escape_html, extract_h1, parent_dir, resolve_relative_path, strip_tags};
