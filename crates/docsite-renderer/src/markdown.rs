//! Markdown to HTML conversion.
//!
//! Wraps `pulldown-cmark` and adjusts its event stream before HTML output:
//! - GitHub alert blockquotes (`> [!NOTE]`) become styled alert blocks
//! - Relative links to `.md` files are resolved to site-relative `.html` paths

use pulldown_cmark::{BlockQuoteKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};

use crate::util::{escape_html, parent_dir, resolve_relative_path};

/// Alert type for GitHub-style alerts (`> [!NOTE]`, `> [!WARNING]`, etc.).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl AlertKind {
    fn class(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Tip => "tip",
            Self::Important => "important",
            Self::Warning => "warning",
            Self::Caution => "caution",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Note => "Note",
            Self::Tip => "Tip",
            Self::Important => "Important",
            Self::Warning => "Warning",
            Self::Caution => "Caution",
        }
    }
}

impl From<BlockQuoteKind> for AlertKind {
    fn from(kind: BlockQuoteKind) -> Self {
        match kind {
            BlockQuoteKind::Note => Self::Note,
            BlockQuoteKind::Tip => Self::Tip,
            BlockQuoteKind::Important => Self::Important,
            BlockQuoteKind::Warning => Self::Warning,
            BlockQuoteKind::Caution => Self::Caution,
        }
    }
}

/// Converts Markdown documents into HTML fragments.
///
/// # Example
///
/// ```
/// use docsite_renderer::MarkdownConverter;
///
/// let html = MarkdownConverter::new().convert("# Hello\n\n> [!TIP]\n> Use it", "index.html");
/// assert!(html.contains("<h1>Hello</h1>"));
/// assert!(html.contains(r#"class="alert alert-tip""#));
/// ```
#[derive(Clone, Debug)]
pub struct MarkdownConverter {
    options: Options,
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownConverter {
    /// Create a converter with GitHub Flavored Markdown enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM,
        }
    }

    /// Convert `markdown` into HTML.
    ///
    /// `page_path` is the site-relative path of the output page (for example
    /// `guide/setup.html`); relative `.md` links are resolved against its
    /// directory.
    #[must_use]
    pub fn convert(&self, markdown: &str, page_path: &str) -> String {
        let base_dir = parent_dir(page_path);
        let events = Parser::new_ext(markdown, self.options).map(|event| match event {
            Event::Start(Tag::BlockQuote(Some(kind))) => {
                Event::Html(alert_start(AlertKind::from(kind)).into())
            }
            Event::End(TagEnd::BlockQuote(Some(_))) => Event::Html(CowStr::Borrowed("</div></div>\n")),
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Link {
                link_type,
                dest_url: rewrite_md_link(dest_url, base_dir),
                title,
                id,
            }),
            other => other,
        });

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events);
        out
    }
}

fn alert_start(kind: AlertKind) -> String {
    format!(
        "<div class=\"alert alert-{}\"><div class=\"alert-title\">{}</div><div class=\"alert-content\">\n",
        kind.class(),
        escape_html(kind.label())
    )
}

/// Resolve a local link to a Markdown file into a site-relative HTML path.
///
/// - `setup.md` on `guide/index.html` → `guide/setup.html`
/// - `../faq.md#install` on `guide/setup.html` → `faq.html#install`
///
/// External links, fragment-only links, and non-Markdown links are returned unchanged.
#[allow(clippy::case_sensitive_file_extension_comparisons)]
fn rewrite_md_link<'a>(url: CowStr<'a>, base_dir: &str) -> CowStr<'a> {
    if url.starts_with("http://")
        || url.starts_with("https://")
        || url.starts_with("//")
        || url.starts_with("mailto:")
        || url.starts_with("tel:")
        || url.starts_with("api:")
        || url.starts_with('#')
    {
        return url;
    }

    let target: &str = &url;
    let (path_part, fragment) = match target.find('#') {
        Some(hash_pos) => target.split_at(hash_pos),
        None => (target, ""),
    };

    let Some(without_ext) = path_part.strip_suffix(".md") else {
        return url;
    };

    let resolved = match without_ext.strip_prefix('/') {
        Some(absolute) => absolute.to_owned(),
        None => resolve_relative_path(without_ext, base_dir),
    };

    CowStr::from(format!("{resolved}.html{fragment}"))
}
