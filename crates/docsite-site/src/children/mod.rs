//! The `[CHILDREN ...]` directive.
//!
//! Authors write the directive as a paragraph of its own in Markdown:
//!
//! ```text
//! [CHILDREN]
//! [CHILDREN asList Exclude="Deprecated"]
//! [CHILDREN Folder="advanced" includeFolders]
//! ```
//!
//! After conversion the token is found in the page HTML and replaced with a
//! `<ul class="related-children">` listing related pages, either as cards
//! (icon, title, summary) or as plain links with `asList`.

mod directive;
mod resolver;

pub use directive::ChildrenDirective;
pub use resolver::{ChildrenResolver, ResolvedChildren};
