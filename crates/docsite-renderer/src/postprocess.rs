//! HTML post-processing applied to every page before templating.
//!
//! Pages are served with a `<base>` tag pointing at the site root, so
//! in-page fragment links and heading ids need extra care here.

use std::sync::LazyLock;

use percent_encoding::{NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use regex::{Captures, Regex};

use crate::util::strip_tags;

static HEADING_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<h([1-5])((?:\s[^>]*)?)>(.*?)</h([1-6])>").unwrap());

static ID_ATTR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)(?:^|\s)id\s*="#).unwrap());

static ENTITY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(?:[a-zA-Z]+|#[0-9]+|#x[0-9a-fA-F]+);").unwrap());

static FRAGMENT_HREF_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r##"href="#([^"]*)""##).unwrap());

static API_HREF_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="api:([^"]*)""#).unwrap());

/// Derive an anchor id from heading HTML.
///
/// Tags and entities are dropped, then every character that is not
/// alphanumeric, a space or a hyphen. The rest is lower-cased with spaces
/// turned into hyphens.
///
/// # Examples
///
/// ```
/// use docsite_renderer::heading_id;
///
/// assert_eq!(heading_id("Getting Started!"), "getting-started");
/// assert_eq!(heading_id("The <code>Config</code> API"), "the-config-api");
/// ```
#[must_use]
pub fn heading_id(heading_html: &str) -> String {
    let text = strip_tags(heading_html);
    let text = ENTITY_PATTERN.replace_all(&text, "");
    text.trim()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-')
        .flat_map(char::to_lowercase)
        .map(|c| if c == ' ' { '-' } else { c })
        .collect()
}

/// Add an `id` to every `<h1>`–`<h5>` that does not already carry one.
#[must_use]
pub fn add_heading_anchors(html: &str) -> String {
    HEADING_PATTERN
        .replace_all(html, |caps: &Captures<'_>| {
            let level = &caps[1];
            let attrs = &caps[2];
            let inner = &caps[3];
            if level != &caps[4] || ID_ATTR_PATTERN.is_match(attrs) {
                return caps[0].to_owned();
            }
            let id = heading_id(inner);
            if id.is_empty() {
                return caps[0].to_owned();
            }
            format!(r#"<h{level} id="{id}"{attrs}>{inner}</h{level}>"#)
        })
        .into_owned()
}

/// Rewrite `href="#fragment"` links to point at the current page.
///
/// A `<base>` tag would otherwise resolve them against the site root. A
/// trailing `index.html` is dropped so directory pages keep clean URLs:
/// on `a/b/index.html`, `#section` becomes `a/b#section`.
#[must_use]
pub fn qualify_anchor_links(html: &str, page_path: &str) -> String {
    let page_url = page_path
        .strip_suffix("/index.html")
        .or_else(|| page_path.strip_suffix("index.html"))
        .unwrap_or(page_path);

    FRAGMENT_HREF_PATTERN
        .replace_all(html, |caps: &Captures<'_>| {
            format!(r##"href="{page_url}#{}""##, &caps[1])
        })
        .into_owned()
}

/// Settings for `api:` pseudo-links.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiLinkConfig {
    /// API documentation search endpoint.
    pub search_url: String,
    /// Major version of the documented framework.
    pub major_version: u32,
}

impl ApiLinkConfig {
    /// URL of the API search page for a class name.
    #[must_use]
    pub fn lookup_url(&self, class_name: &str) -> String {
        let query = utf8_percent_encode(class_name, NON_ALPHANUMERIC);
        format!(
            "{}?q={query}&amp;version={}",
            self.search_url, self.major_version
        )
    }
}

/// Rewrite `href="api:Some\Class"` links into API search URLs.
///
/// The Markdown engine may already have percent-encoded the backslash;
/// the class name is decoded before it is encoded again.
#[must_use]
pub fn resolve_api_links(html: &str, config: &ApiLinkConfig) -> String {
    API_HREF_PATTERN
        .replace_all(html, |caps: &Captures<'_>| {
            let raw = caps[1].replace("&amp;", "&");
            let class_name = percent_decode_str(&raw).decode_utf8_lossy();
            format!(r#"href="{}""#, config.lookup_url(&class_name))
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_heading_anchor_added() {
        assert_eq!(
            add_heading_anchors("<h2>Getting Started!</h2>"),
            r#"<h2 id="getting-started">Getting Started!</h2>"#
        );
    }

    #[test]
    fn test_heading_anchor_all_levels_up_to_five() {
        let html = add_heading_anchors("<h1>One</h1><h5>Five</h5><h6>Six</h6>");
        assert_eq!(html, r#"<h1 id="one">One</h1><h5 id="five">Five</h5><h6>Six</h6>"#);
    }

    #[test]
    fn test_heading_with_existing_id_skipped() {
        let html = r#"<h2 id="custom">Title</h2>"#;
        assert_eq!(add_heading_anchors(html), html);
    }

    #[test]
    fn test_heading_keeps_other_attributes() {
        assert_eq!(
            add_heading_anchors(r#"<h3 class="x">API</h3>"#),
            r#"<h3 id="api" class="x">API</h3>"#
        );
    }

    #[test]
    fn test_heading_with_markup_and_entities() {
        assert_eq!(
            add_heading_anchors("<h2>Tips &amp; <em>tricks</em></h2>"),
            r#"<h2 id="tips--tricks">Tips &amp; <em>tricks</em></h2>"#
        );
    }

    #[test]
    fn test_heading_id_keeps_hyphens_and_unicode() {
        assert_eq!(heading_id("Pre-flight Проверка"), "pre-flight-проверка");
    }

    #[test]
    fn test_qualify_anchor_on_index_page() {
        assert_eq!(
            qualify_anchor_links(r##"<a href="#section">x</a>"##, "a/b/index.html"),
            r#"<a href="a/b#section">x</a>"#
        );
    }

    #[test]
    fn test_qualify_anchor_on_regular_page() {
        assert_eq!(
            qualify_anchor_links(r##"<a href="#usage">x</a>"##, "guide/setup.html"),
            r#"<a href="guide/setup.html#usage">x</a>"#
        );
    }

    #[test]
    fn test_qualify_anchor_leaves_other_links() {
        let html = r#"<a href="guide/setup.html">x</a>"#;
        assert_eq!(qualify_anchor_links(html, "a/index.html"), html);
    }

    fn api_config() -> ApiLinkConfig {
        ApiLinkConfig {
            search_url: "https://api.silverstripe.org/search/lookup".to_owned(),
            major_version: 5,
        }
    }

    #[test]
    fn test_api_link_resolved() {
        assert_eq!(
            resolve_api_links(r#"<a href="api:SilverStripe\ORM\DataObject">x</a>"#, &api_config()),
            r#"<a href="https://api.silverstripe.org/search/lookup?q=SilverStripe%5CORM%5CDataObject&amp;version=5">x</a>"#
        );
    }

    #[test]
    fn test_api_link_already_percent_encoded() {
        let html = resolve_api_links(r#"<a href="api:Some%5CClass">x</a>"#, &api_config());
        assert!(html.contains("q=Some%5CClass&amp;version=5"));
    }

    #[test]
    fn test_api_link_with_method() {
        let html = resolve_api_links(r#"<a href="api:Some\Class::method()">x</a>"#, &api_config());
        assert!(html.contains("q=Some%5CClass%3A%3Amethod%28%29"));
    }

    #[test]
    fn test_non_api_links_unchanged() {
        let html = r#"<a href="https://example.com">x</a>"#;
        assert_eq!(resolve_api_links(html, &api_config()), html);
    }
}
