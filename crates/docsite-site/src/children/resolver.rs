use std::ops::Range;
use std::sync::LazyLock;

use docsite_renderer::{PageMetadata, escape_html, strip_tags};
use regex::{Captures, Regex};

use super::directive::ChildrenDirective;
use crate::context::SiteContext;
use crate::related::RelatedPaths;
use crate::tree::{file_stem, split_path};

/// A `[CHILDREN ...]` token, with the paragraph around it when it is the
/// paragraph's only content. Options stay on one line and contain no tags.
static CHILDREN_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(<p>)?\[CHILDREN((?:[ \t][^\]<>\n]*)?)\](</p>)?").unwrap()
});

static CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<code(?:\s[^>]*)?>.*?</code>").unwrap());

/// Result of resolving the directives of one page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedChildren {
    /// Page HTML with every directive expanded.
    pub html: String,
    /// Problems found in the page's directives.
    pub warnings: Vec<String>,
}

/// Expands `[CHILDREN ...]` directives into lists of related pages.
#[derive(Clone, Copy, Debug)]
pub struct ChildrenResolver<'a> {
    ctx: &'a SiteContext,
    sort_by_title: bool,
}

#[derive(Clone, Copy, Debug)]
struct Candidate<'r> {
    path: &'r str,
    is_folder: bool,
}

impl Candidate<'_> {
    /// Names an `Exclude`/`Only` entry can refer to.
    fn names(&self) -> Vec<&str> {
        let mut names = vec![file_stem(self.path)];
        if self.is_folder {
            names.push(split_path(split_path(self.path).0).1);
        }
        names
    }
}

enum NameMatch<'n> {
    Exact,
    CaseInsensitive(&'n str),
    None,
}

fn match_name<'n>(names: &[&str], entries: &'n [String]) -> NameMatch<'n> {
    if entries.iter().any(|e| names.contains(&e.as_str())) {
        return NameMatch::Exact;
    }
    entries
        .iter()
        .find(|e| {
            let wanted = e.to_lowercase();
            names.iter().any(|n| n.to_lowercase() == wanted)
        })
        .map_or(NameMatch::None, |e| NameMatch::CaseInsensitive(e))
}

impl<'a> ChildrenResolver<'a> {
    #[must_use]
    pub fn new(ctx: &'a SiteContext) -> Self {
        Self {
            ctx,
            sort_by_title: false,
        }
    }

    /// Sort every list by title instead of site order.
    ///
    /// Sorted lists no longer match the side navigation.
    #[must_use]
    pub fn sort_by_title(mut self, enabled: bool) -> Self {
        self.sort_by_title = enabled;
        self
    }

    /// Expand every directive in `html`, the content of `page_path`.
    ///
    /// Pages without a directive, or without any related page, are
    /// returned unchanged. Directives inside `<code>` are left alone.
    #[must_use]
    pub fn resolve(&self, html: &str, page_path: &str, related: &RelatedPaths) -> ResolvedChildren {
        if !html.contains("[CHILDREN") || related.is_empty() {
            return ResolvedChildren {
                html: html.to_owned(),
                warnings: Vec::new(),
            };
        }

        let code_spans: Vec<Range<usize>> = CODE_SPAN.find_iter(html).map(|m| m.range()).collect();
        let mut warnings = Vec::new();

        let resolved = CHILDREN_TOKEN.replace_all(html, |caps: &Captures<'_>| {
            let start = caps.get(0).map_or(0, |m| m.start());
            if code_spans.iter().any(|span| span.contains(&start)) {
                return caps[0].to_owned();
            }

            let directive = ChildrenDirective::parse(&caps[2]);
            let list = self.render_directive(&directive, page_path, related, &mut warnings);

            match (caps.get(1), caps.get(3)) {
                (Some(_), Some(_)) => list,
                (open, close) => format!(
                    "{}{list}{}",
                    open.map_or("", |m| m.as_str()),
                    close.map_or("", |m| m.as_str())
                ),
            }
        });

        ResolvedChildren {
            html: resolved.into_owned(),
            warnings,
        }
    }

    fn render_directive(
        &self,
        directive: &ChildrenDirective,
        page_path: &str,
        related: &RelatedPaths,
        warnings: &mut Vec<String>,
    ) -> String {
        for word in &directive.unknown {
            warnings.push(format!(
                "{page_path}: unknown CHILDREN option \"{word}\""
            ));
        }

        let Some(mut candidates) = candidates(directive, related) else {
            if let Some(folder) = &directive.folder {
                warnings.push(format!(
                    "{page_path}: CHILDREN Folder=\"{folder}\" does not match any sub-folder"
                ));
            }
            return String::new();
        };

        if directive.reverse {
            candidates.reverse();
        }

        let mut items: Vec<(Candidate<'_>, String)> = filter(candidates, directive, page_path, warnings)
            .into_iter()
            .map(|candidate| (candidate, self.ctx.title(candidate.path)))
            .collect();

        if self.sort_by_title {
            items.sort_by_cached_key(|(_, title)| strip_tags(title).to_lowercase());
        }

        let mut html = String::from("<ul class=\"related-children\">\n");
        for (candidate, title) in &items {
            html.push_str(&self.render_item(candidate.path, title, directive.as_list));
            html.push('\n');
        }
        html.push_str("</ul>");
        html
    }

    fn render_item(&self, path: &str, title: &str, as_list: bool) -> String {
        let href = escape_html(path);
        if as_list {
            return format!(
                r#"<li class="related-child related-child__list"><a href="{href}">{title}</a></li>"#
            );
        }

        let metadata = self.ctx.metadata(path);
        let icon = metadata
            .and_then(PageMetadata::icon)
            .map(escape_html)
            .unwrap_or_default();
        let summary = metadata
            .and_then(PageMetadata::summary)
            .map(escape_html)
            .unwrap_or_default();

        format!(
            concat!(
                r#"<li class="related-child related-child__card"><a href="{href}">"#,
                r#"<div class="related-child__icon">{icon}</div>"#,
                r#"<h3 class="related-child__title">{title}</h3>"#,
                r#"<p class="related-child__summary">{summary}</p>"#,
                "</a></li>"
            ),
            href = href,
            icon = icon,
            title = title,
            summary = summary
        )
    }
}

/// Candidate set before filtering. `None` when `Folder` names no sub-folder.
fn candidates<'r>(directive: &ChildrenDirective, related: &'r RelatedPaths) -> Option<Vec<Candidate<'r>>> {
    let pages = |paths: &'r [String]| {
        paths.iter().map(|path| Candidate {
            path,
            is_folder: false,
        })
    };
    let folders = |paths: &'r [String]| {
        paths.iter().map(|path| Candidate {
            path,
            is_folder: true,
        })
    };

    let Some(folder) = &directive.folder else {
        return Some(
            pages(&related.siblings)
                .chain(folders(&related.child_indexes))
                .collect(),
        );
    };

    let files = related.folder_files.get(folder);
    let grandchildren = related.folder_grandchildren.get(folder);
    if files.is_none() && grandchildren.is_none() {
        return None;
    }
    let files = files.map_or(&[][..], Vec::as_slice);
    let grandchildren = grandchildren.map_or(&[][..], Vec::as_slice);

    if files.is_empty() {
        return Some(folders(grandchildren).collect());
    }
    let mut list: Vec<Candidate<'r>> = pages(files).collect();
    if directive.include_folders {
        list.extend(folders(grandchildren));
    }
    Some(list)
}

fn filter<'r>(
    candidates: Vec<Candidate<'r>>,
    directive: &ChildrenDirective,
    page_path: &str,
    warnings: &mut Vec<String>,
) -> Vec<Candidate<'r>> {
    let mut casing_warning = |option: &str, entry: &str, path: &str| {
        warnings.push(format!(
            "{page_path}: CHILDREN {option} entry \"{entry}\" matches {path} only with different casing"
        ));
    };

    let mut kept = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let names = candidate.names();

        match match_name(&names, &directive.exclude) {
            NameMatch::Exact => continue,
            NameMatch::CaseInsensitive(entry) => {
                casing_warning("Exclude", entry, candidate.path);
                continue;
            }
            NameMatch::None => {}
        }

        if !directive.only.is_empty() {
            match match_name(&names, &directive.only) {
                NameMatch::Exact => {}
                NameMatch::CaseInsensitive(entry) => {
                    casing_warning("Only", entry, candidate.path);
                }
                NameMatch::None => continue,
            }
        }

        kept.push(candidate);
    }
    kept
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::tree::SiteNode;

    const PAGE: &str = "guide/index.html";

    fn context() -> SiteContext {
        let tree = SiteNode::from_paths([
            "index.html",
            "guide/index.html",
            "guide/setup.html",
            "guide/usage.html",
            "guide/advanced/index.html",
            "guide/advanced/deep.html",
            "guide/advanced/extra/index.html",
            "guide/topics/index.html",
            "guide/topics/one/index.html",
            "guide/topics/two/index.html",
        ]);
        let metadata = HashMap::from([(
            "guide/setup.html".to_owned(),
            PageMetadata::from_pairs([
                ("title", "Setup"),
                ("summary", "Install <it>"),
                ("icon", "rocket"),
            ]),
        )]);
        let contents = HashMap::from([
            ("guide/usage.html".to_owned(), "<h1>Usage</h1>".to_owned()),
            ("guide/advanced/index.html".to_owned(), "<h1>Advanced</h1>".to_owned()),
            ("guide/topics/index.html".to_owned(), "<h1>Topics</h1>".to_owned()),
        ]);
        SiteContext::new(tree, metadata, contents)
    }

    fn resolve(ctx: &SiteContext, html: &str) -> ResolvedChildren {
        let node = ctx.node_for(PAGE).unwrap();
        let related = RelatedPaths::for_page(node, PAGE);
        ChildrenResolver::new(ctx).resolve(html, PAGE, &related)
    }

    fn hrefs(html: &str) -> Vec<&str> {
        html.split(r#"href=""#)
            .skip(1)
            .filter_map(|rest| rest.split('"').next())
            .collect()
    }

    #[test]
    fn test_no_token_returns_identical_html() {
        let ctx = context();
        let html = "<h1>Guide</h1><p>CHILDREN are listed elsewhere.</p>";
        let resolved = resolve(&ctx, html);
        assert_eq!(resolved.html, html);
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn test_no_related_pages_leaves_token() {
        let ctx = context();
        let html = "<p>[CHILDREN]</p>";
        let resolved = ChildrenResolver::new(&ctx).resolve(html, "index.html", &RelatedPaths::default());
        assert_eq!(resolved.html, html);
    }

    #[test]
    fn test_default_lists_siblings_and_folders() {
        let ctx = context();
        let resolved = resolve(&ctx, "<p>[CHILDREN asList]</p>");
        assert_eq!(
            hrefs(&resolved.html),
            vec![
                "guide/setup.html",
                "guide/usage.html",
                "guide/advanced/index.html",
                "guide/topics/index.html"
            ]
        );
        assert!(!resolved.html.contains("deep.html"));
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn test_include_folders_changes_nothing_by_default() {
        let ctx = context();
        assert_eq!(
            resolve(&ctx, "<p>[CHILDREN includeFolders]</p>").html,
            resolve(&ctx, "<p>[CHILDREN]</p>").html
        );
    }

    #[test]
    fn test_paragraph_is_replaced() {
        let ctx = context();
        let html = resolve(&ctx, "<p>[CHILDREN asList]</p>\n<p>After</p>").html;
        assert!(html.starts_with(r#"<ul class="related-children">"#));
        assert!(html.ends_with("</ul>\n<p>After</p>"));
    }

    #[test]
    fn test_inline_token_keeps_paragraph() {
        let ctx = context();
        let html = resolve(&ctx, "<p>See [CHILDREN asList]</p>").html;
        assert!(html.starts_with(r#"<p>See <ul class="related-children">"#));
        assert!(html.ends_with("</ul></p>"));
    }

    #[test]
    fn test_list_item_markup() {
        let ctx = context();
        let html = resolve(&ctx, "<p>[CHILDREN asList Only=\"usage\"]</p>").html;
        assert_eq!(
            html,
            concat!(
                "<ul class=\"related-children\">\n",
                r#"<li class="related-child related-child__list"><a href="guide/usage.html">Usage</a></li>"#,
                "\n</ul>"
            )
        );
    }

    #[test]
    fn test_card_markup() {
        let ctx = context();
        let html = resolve(&ctx, "<p>[CHILDREN Only=\"setup\"]</p>").html;
        assert_eq!(
            html,
            concat!(
                "<ul class=\"related-children\">\n",
                r#"<li class="related-child related-child__card"><a href="guide/setup.html">"#,
                r#"<div class="related-child__icon">rocket</div>"#,
                r#"<h3 class="related-child__title">Setup</h3>"#,
                r#"<p class="related-child__summary">Install &lt;it&gt;</p>"#,
                "</a></li>\n</ul>"
            )
        );
    }

    #[test]
    fn test_card_without_metadata_has_empty_icon_and_summary() {
        let ctx = context();
        let html = resolve(&ctx, "<p>[CHILDREN Only=\"usage\"]</p>").html;
        assert!(html.contains(r#"<div class="related-child__icon"></div>"#));
        assert!(html.contains(r#"<p class="related-child__summary"></p>"#));
    }

    #[test]
    fn test_folder_lists_direct_pages() {
        let ctx = context();
        let resolved = resolve(&ctx, "<p>[CHILDREN Folder=\"advanced\"]</p>");
        assert_eq!(hrefs(&resolved.html), vec!["guide/advanced/deep.html"]);
    }

    #[test]
    fn test_folder_with_include_folders_appends_sub_folders() {
        let ctx = context();
        let resolved = resolve(&ctx, "<p>[CHILDREN Folder=\"advanced\" includeFolders]</p>");
        assert_eq!(
            hrefs(&resolved.html),
            vec!["guide/advanced/deep.html", "guide/advanced/extra/index.html"]
        );
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn test_folder_without_pages_falls_back_to_grandchildren() {
        let ctx = context();
        let resolved = resolve(&ctx, "<p>[CHILDREN Folder=\"topics\"]</p>");
        assert_eq!(
            hrefs(&resolved.html),
            vec!["guide/topics/one/index.html", "guide/topics/two/index.html"]
        );
    }

    #[test]
    fn test_unknown_folder_warns_once() {
        let ctx = context();
        let resolved = resolve(&ctx, "<p>[CHILDREN Folder=\"missing\"]</p>");
        assert_eq!(resolved.html, "");
        assert_eq!(resolved.warnings.len(), 1);
        assert!(resolved.warnings[0].contains(PAGE));
        assert!(resolved.warnings[0].contains("missing"));
    }

    #[test]
    fn test_empty_folder_name_warns() {
        let ctx = context();
        let resolved = resolve(&ctx, "<p>[CHILDREN Folder=\"\"]</p>");
        assert_eq!(resolved.html, "");
        assert_eq!(resolved.warnings.len(), 1);
        assert!(resolved.warnings[0].contains("Folder=\"\""));
    }

    #[test]
    fn test_exclude_and_only_are_inverses() {
        let ctx = context();
        let excluded = resolve(&ctx, "<p>[CHILDREN Exclude=\"setup\"]</p>").html;
        let only = resolve(&ctx, "<p>[CHILDREN Only=\"setup\"]</p>").html;
        assert_eq!(
            hrefs(&excluded),
            vec![
                "guide/usage.html",
                "guide/advanced/index.html",
                "guide/topics/index.html"
            ]
        );
        assert_eq!(hrefs(&only), vec!["guide/setup.html"]);
    }

    #[test]
    fn test_exclude_matches_folder_name() {
        let ctx = context();
        let html = resolve(&ctx, "<p>[CHILDREN Exclude=\"advanced,topics\"]</p>").html;
        assert_eq!(hrefs(&html), vec!["guide/setup.html", "guide/usage.html"]);
    }

    #[test]
    fn test_exclude_with_escaped_quotes() {
        let ctx = context();
        let html = resolve(&ctx, "<p>[CHILDREN Exclude=&quot;usage&quot; Only=&quot;setup,usage&quot;]</p>").html;
        assert_eq!(hrefs(&html), vec!["guide/setup.html"]);
    }

    #[test]
    fn test_case_mismatch_applies_with_warning() {
        let ctx = context();
        let resolved = resolve(&ctx, "<p>[CHILDREN Exclude=\"Setup\"]</p>");
        assert!(!resolved.html.contains("guide/setup.html"));
        assert_eq!(resolved.warnings.len(), 1);
        assert!(resolved.warnings[0].contains("\"Setup\""));
    }

    #[test]
    fn test_only_case_mismatch_keeps_entry() {
        let ctx = context();
        let resolved = resolve(&ctx, "<p>[CHILDREN Only=\"USAGE\"]</p>");
        assert_eq!(hrefs(&resolved.html), vec!["guide/usage.html"]);
        assert_eq!(resolved.warnings.len(), 1);
    }

    #[test]
    fn test_reverse_order() {
        let ctx = context();
        let html = resolve(&ctx, "<p>[CHILDREN reverse]</p>").html;
        assert_eq!(
            hrefs(&html),
            vec![
                "guide/topics/index.html",
                "guide/advanced/index.html",
                "guide/usage.html",
                "guide/setup.html"
            ]
        );
    }

    #[test]
    fn test_reverse_then_exclude() {
        let ctx = context();
        let html = resolve(&ctx, "<p>[CHILDREN reverse Exclude=\"usage\"]</p>").html;
        assert_eq!(
            hrefs(&html),
            vec![
                "guide/topics/index.html",
                "guide/advanced/index.html",
                "guide/setup.html"
            ]
        );
    }

    #[test]
    fn test_reverse_then_only() {
        let ctx = context();
        let html = resolve(&ctx, "<p>[CHILDREN reverse Only=\"setup,topics\"]</p>").html;
        assert_eq!(hrefs(&html), vec!["guide/topics/index.html", "guide/setup.html"]);
    }

    #[test]
    fn test_everything_filtered_renders_empty_list() {
        let ctx = context();
        let html = resolve(&ctx, "<p>[CHILDREN Only=\"nothing\"]</p>").html;
        assert_eq!(html, "<ul class=\"related-children\">\n</ul>");
    }

    #[test]
    fn test_token_inside_code_untouched() {
        let ctx = context();
        let html = "<p>Write <code>[CHILDREN asList]</code> to list pages.</p>";
        assert_eq!(resolve(&ctx, html).html, html);
    }

    #[test]
    fn test_bracket_text_across_paragraphs_untouched() {
        let ctx = context();
        let html = "<p>A [CHILDREN node is odd.</p>\n<p>See [x]</p>";
        let resolved = resolve(&ctx, html);
        assert_eq!(resolved.html, html);
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn test_token_options_stop_at_line_end() {
        let ctx = context();
        let html = "<p>[CHILDREN asList\nmore]</p>";
        assert_eq!(resolve(&ctx, html).html, html);
    }

    #[test]
    fn test_href_is_escaped() {
        let tree = SiteNode::from_paths(["guide/index.html", "guide/q&a.html"]);
        let ctx = SiteContext::new(tree, HashMap::new(), HashMap::new());
        let html = resolve(&ctx, "<p>[CHILDREN asList]</p>").html;
        assert!(html.contains(r#"<a href="guide/q&amp;a.html">q&amp;a</a>"#), "{html}");
    }

    #[test]
    fn test_multiple_tokens_resolved() {
        let ctx = context();
        let html = resolve(&ctx, "<p>[CHILDREN Only=\"setup\"]</p>\n<p>[CHILDREN asList Only=\"usage\"]</p>").html;
        assert_eq!(hrefs(&html), vec!["guide/setup.html", "guide/usage.html"]);
        assert!(!html.contains("[CHILDREN"));
    }

    #[test]
    fn test_unknown_option_warns() {
        let ctx = context();
        let resolved = resolve(&ctx, "<p>[CHILDREN asCards]</p>");
        assert_eq!(resolved.warnings.len(), 1);
        assert!(resolved.warnings[0].contains("asCards"));
    }

    #[test]
    fn test_sort_by_title() {
        let ctx = context();
        let node = ctx.node_for(PAGE).unwrap();
        let related = RelatedPaths::for_page(node, PAGE);
        let html = ChildrenResolver::new(&ctx)
            .sort_by_title(true)
            .resolve("<p>[CHILDREN asList]</p>", PAGE, &related)
            .html;
        assert_eq!(
            hrefs(&html),
            vec![
                "guide/advanced/index.html",
                "guide/setup.html",
                "guide/topics/index.html",
                "guide/usage.html"
            ]
        );
    }
}
