//! Site assembly for docsite.
//!
//! This crate turns a directory of converted pages into a navigable site:
//! - [`SiteNode`]: ordered tree of the generated pages
//! - [`Relations`] / [`SideNav`]: navigation state and side navigation markup
//! - [`ChildrenResolver`]: expansion of `[CHILDREN ...]` directives
//! - [`Template`]: the page shell
//! - [`SiteBuilder`]: the full build pipeline
//!
//! # Quick Start
//!
//! ```
//! use std::collections::HashMap;
//! use docsite_site::{SideNav, SiteContext, SiteNode};
//!
//! let tree = SiteNode::from_paths(["index.html", "guide/index.html", "guide/setup.html"]);
//! let ctx = SiteContext::new(tree, HashMap::new(), HashMap::new());
//!
//! let nav = SideNav::new(&ctx, "guide/setup.html").render();
//! assert!(nav.contains("sidenav__item--current"));
//! ```

mod builder;
mod children;
mod context;
mod error;
mod index_pages;
mod nav;
mod related;
mod relation;
mod template;
mod tree;

pub use builder::{BuildConfig, BuildReport, SiteBuilder, SourceDir};
pub use children::{ChildrenDirective, ChildrenResolver, ResolvedChildren};
pub use context::SiteContext;
pub use error::BuildError;
pub use index_pages::generate_index_pages;
pub use nav::{Fragments, SideNav};
pub use related::RelatedPaths;
pub use relation::{NavState, Relations};
pub use template::{BaseUrl, DEFAULT_STYLESHEET, DEFAULT_TEMPLATE, Template};
pub use tree::{INDEX_FILE, SiteNode, build_tree};
