//! Shared HTML and path helpers.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static H1_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<h1(?:\s[^>]*)?>(.*?)</h1>").unwrap());

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Inner HTML of the first `<h1>` element, trimmed.
///
/// Returns `None` when the page has no H1 or the H1 is empty.
///
/// # Examples
///
/// ```
/// use docsite_renderer::extract_h1;
///
/// assert_eq!(extract_h1("<h1 id=\"x\">Guide</h1><p>Body</p>"), Some("Guide"));
/// assert_eq!(extract_h1("<h2>Not a title</h2>"), None);
/// ```
#[must_use]
pub fn extract_h1(html: &str) -> Option<&str> {
    H1_PATTERN
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|title| !title.is_empty())
}

/// Remove every HTML tag, keeping the text between them.
#[must_use]
pub fn strip_tags(html: &str) -> Cow<'_, str> {
    TAG_PATTERN.replace_all(html, "")
}

/// Directory part of a site-relative path (`""` for files at the root).
#[must_use]
pub fn parent_dir(path: &str) -> &str {
    path.rfind('/').map_or("", |pos| &path[..pos])
}

/// Resolve a relative path against a base directory.
///
/// Handles `.` (current), `..` (parent), and plain relative paths. Parent
/// segments above the root are dropped.
#[must_use]
pub fn resolve_relative_path(relative: &str, base_dir: &str) -> String {
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();

    for component in relative.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(component),
        }
    }

    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_special_characters() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a&b"), "a&amp;b");
        assert_eq!(escape_html("\"hello\""), "&quot;hello&quot;");
    }

    #[test]
    fn test_extract_h1_plain() {
        assert_eq!(extract_h1("<h1>Getting Started</h1>"), Some("Getting Started"));
    }

    #[test]
    fn test_extract_h1_keeps_inline_markup() {
        assert_eq!(
            extract_h1("<h1>The <code>Config</code> class</h1>"),
            Some("The <code>Config</code> class")
        );
    }

    #[test]
    fn test_extract_h1_first_only() {
        assert_eq!(extract_h1("<h1>One</h1><h1>Two</h1>"), Some("One"));
    }

    #[test]
    fn test_extract_h1_ignores_empty() {
        assert_eq!(extract_h1("<h1>  </h1>"), None);
    }

    #[test]
    fn test_extract_h1_not_confused_by_header_tag() {
        assert_eq!(extract_h1("<header>nav</header>"), None);
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("The <code>Config</code> class"), "The Config class");
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir("index.html"), "");
        assert_eq!(parent_dir("guide/setup.html"), "guide");
        assert_eq!(parent_dir("a/b/c.html"), "a/b");
    }

    #[test]
    fn test_resolve_relative_path_sibling() {
        assert_eq!(resolve_relative_path("./setup.md", "guide"), "guide/setup.md");
    }

    #[test]
    fn test_resolve_relative_path_parent() {
        assert_eq!(resolve_relative_path("../other.md", "a/b"), "a/other.md");
    }

    #[test]
    fn test_resolve_relative_path_traversal_clamped() {
        assert_eq!(resolve_relative_path("../../../x.md", "a"), "x.md");
    }
}
