//! Page shell around the converted content.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use docsite_renderer::strip_tags;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::{Captures, Regex};

use crate::error::BuildError;

/// Template used when no template file is configured.
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/template.html");

/// Stylesheet used when no stylesheet is configured.
pub const DEFAULT_STYLESHEET: &str = include_str!("../assets/styles.css");

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(base|title|sideNavHtml|contentHtml)").unwrap());

/// Characters escaped in `file://` URLs.
const PATH_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Base URL written into every page's `<base>` tag, always ending in `/`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Public URL of the published site.
    #[must_use]
    pub fn public(url: &str) -> Self {
        Self(format!("{}/", url.trim_end_matches('/')))
    }

    /// `file://` URL of a local output directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be made absolute.
    pub fn local(output_dir: &Path) -> std::io::Result<Self> {
        let absolute = std::path::absolute(output_dir)?;
        let path = absolute.to_string_lossy().replace('\\', "/");
        let path = path.trim_end_matches('/');
        let separator = if path.starts_with('/') { "" } else { "/" };
        Ok(Self(format!(
            "file://{separator}{}/",
            utf8_percent_encode(path, PATH_SET)
        )))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Page template with `$base`, `$title`, `$sideNavHtml` and `$contentHtml`
/// placeholders.
///
/// Substitution is a single literal pass: values are inserted as given and
/// never scanned for placeholders themselves.
#[derive(Clone, Debug)]
pub struct Template {
    source: String,
}

impl Default for Template {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl Template {
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Load a template file.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Template`] if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        std::fs::read_to_string(path)
            .map(Self::new)
            .map_err(|source| BuildError::Template {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Fill in the template for one page.
    ///
    /// `title` is HTML; tags are stripped for the `<title>` element.
    #[must_use]
    pub fn compose(
        &self,
        base: &BaseUrl,
        title: &str,
        side_nav_html: &str,
        content_html: &str,
    ) -> String {
        let title = strip_tags(title);
        PLACEHOLDER
            .replace_all(&self.source, |caps: &Captures<'_>| match &caps[1] {
                "base" => base.as_str(),
                "title" => &*title,
                "sideNavHtml" => side_nav_html,
                _ => content_html,
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compose_replaces_placeholders() {
        let template = Template::new("<base href=\"$base\"><title>$title</title>$sideNavHtml|$contentHtml");
        let html = template.compose(
            &BaseUrl::public("https://example.com/docs"),
            "The <code>Guide</code>",
            "<ul></ul>",
            "<p>Body</p>",
        );
        assert_eq!(
            html,
            "<base href=\"https://example.com/docs/\"><title>The Guide</title><ul></ul>|<p>Body</p>"
        );
    }

    #[test]
    fn test_compose_does_not_rescan_values() {
        let template = Template::new("$contentHtml $title");
        let html = template.compose(&BaseUrl::public("https://x/"), "T", "", "costs $title");
        assert_eq!(html, "costs $title T");
    }

    #[test]
    fn test_default_template_has_every_placeholder() {
        for placeholder in ["$base", "$title", "$sideNavHtml", "$contentHtml"] {
            assert!(DEFAULT_TEMPLATE.contains(placeholder), "{placeholder}");
        }
    }

    #[test]
    fn test_load_missing_template() {
        let result = Template::load(Path::new("/nonexistent/template.html"));
        assert!(matches!(result, Err(BuildError::Template { .. })));
    }

    #[test]
    fn test_public_base_url_gets_trailing_slash() {
        assert_eq!(BaseUrl::public("https://example.com/docs").as_str(), "https://example.com/docs/");
        assert_eq!(BaseUrl::public("https://example.com/docs/").as_str(), "https://example.com/docs/");
    }

    #[cfg(unix)]
    #[test]
    fn test_local_base_url() {
        let base = BaseUrl::local(Path::new("/tmp/my site/_site")).unwrap();
        assert_eq!(base.as_str(), "file:///tmp/my%20site/_site/");
    }
}
