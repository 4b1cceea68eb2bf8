//! Side navigation markup.
//!
//! Every directory renders as a `<ul>`. Its index is an item at the
//! directory's level; the directory's other files are nested one level
//! deeper, followed by the sub-directories. The root index is never listed
//! since the template shows it as the home link.
//!
//! ```html
//! <ul>
//!   <li><ul><li class="sidenav__item sidenav__item--level-one">About</li></ul></li>
//!   <li><ul>
//!     <li class="sidenav__item sidenav__item--level-one">Guide</li>
//!     <li><ul><li class="sidenav__item">Setup</li></ul></li>
//!   </ul></li>
//! </ul>
//! ```
//!
//! Nested lists are wrapped in a bare `<li>` to keep the markup valid.

use std::borrow::Cow;

use docsite_renderer::escape_html;

use crate::context::SiteContext;
use crate::relation::Relations;
use crate::tree::SiteNode;

/// Side navigation of one page.
#[derive(Clone, Copy, Debug)]
pub struct SideNav<'a> {
    ctx: &'a SiteContext,
    current: &'a str,
}

impl<'a> SideNav<'a> {
    #[must_use]
    pub fn new(ctx: &'a SiteContext, current: &'a str) -> Self {
        Self { ctx, current }
    }

    /// Lazily produce the markup fragments.
    ///
    /// Each call starts a fresh walk, so the sequence can be consumed any
    /// number of times with identical results.
    #[must_use]
    pub fn fragments(&self) -> Fragments<'a> {
        Fragments {
            ctx: self.ctx,
            current: self.current,
            ancestors: Vec::new(),
            pending: vec![Step::Dir {
                node: self.ctx.tree(),
                level: 0,
            }],
        }
    }

    /// Render the whole navigation as one string.
    #[must_use]
    pub fn render(&self) -> String {
        self.fragments().collect()
    }
}

enum Step<'a> {
    Text(&'static str),
    Dir { node: &'a SiteNode, level: usize },
    Item { node: &'a SiteNode, index: usize, level: usize },
    Enter(&'a SiteNode),
    Leave,
}

/// Iterator over side navigation fragments.
///
/// Walks the tree with an explicit stack; `ancestors` tracks the chain of
/// directories above the one whose items are being emitted.
pub struct Fragments<'a> {
    ctx: &'a SiteContext,
    current: &'a str,
    ancestors: Vec<&'a SiteNode>,
    pending: Vec<Step<'a>>,
}

impl<'a> Fragments<'a> {
    fn schedule_dir(&mut self, node: &'a SiteNode, level: usize) {
        // Pushed in reverse of the emission order.
        self.pending.push(Step::Text("</ul>"));
        self.pending.push(Step::Leave);
        for child in node.children.iter().rev() {
            self.pending.push(Step::Text("</li>"));
            self.pending.push(Step::Dir {
                node: child,
                level: level + 1,
            });
            self.pending.push(Step::Text("<li>"));
        }
        self.pending.push(Step::Enter(node));

        if node.files.len() > 1 {
            self.pending.push(Step::Text("</ul></li>"));
            for index in (1..node.files.len()).rev() {
                self.pending.push(Step::Item {
                    node,
                    index,
                    level: level + 1,
                });
            }
            self.pending.push(Step::Text("<li><ul>"));
        }
        if !node.files.is_empty() && level > 0 {
            self.pending.push(Step::Item {
                node,
                index: 0,
                level,
            });
        }
    }

    fn render_item(&self, node: &SiteNode, index: usize, level: usize) -> String {
        let path = node.file_path(&node.files[index]);
        let state = Relations::classify(&self.ancestors, node, index, self.current).state();

        let mut classes = String::from("sidenav__item");
        if level == 1 {
            classes.push_str(" sidenav__item--level-one");
        }
        if let Some(class) = state.class() {
            classes.push(' ');
            classes.push_str(class);
        }

        format!(
            r#"<li class="{classes}"><a href="{}">{}</a></li>"#,
            escape_html(&path),
            self.ctx.title(&path)
        )
    }
}

impl Iterator for Fragments<'_> {
    type Item = Cow<'static, str>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.pending.pop()? {
                Step::Text(text) => return Some(Cow::Borrowed(text)),
                Step::Dir { node, level } => {
                    self.schedule_dir(node, level);
                    return Some(Cow::Borrowed("<ul>"));
                }
                Step::Item { node, index, level } => {
                    return Some(Cow::Owned(self.render_item(node, index, level)));
                }
                Step::Enter(node) => self.ancestors.push(node),
                Step::Leave => {
                    self.ancestors.pop();
                }
            }
        }
    }
}
