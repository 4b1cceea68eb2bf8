//! Front-matter metadata extraction.
//!
//! A Markdown document may start with a `---` delimited block of
//! `key: value` lines:
//!
//! ```text
//! ---
//! title: Getting started
//! summary: Install and configure the module
//! icon: rocket
//! ---
//! # Getting started
//! ```
//!
//! The block is parsed into [`PageMetadata`] and removed from the document
//! before conversion. Keys are kept verbatim and every value is a string;
//! `title`, `summary` and `icon` have dedicated accessors but any other key
//! is preserved as well.

use std::collections::BTreeMap;

const DELIMITER: &str = "---";

/// Metadata declared in a document's front-matter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageMetadata {
    fields: BTreeMap<String, String>,
}

impl PageMetadata {
    /// Build metadata from key/value pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Value for an arbitrary key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Page title, overriding the H1 heading.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.non_empty("title")
    }

    /// Short description shown on CHILDREN cards.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.non_empty("summary")
    }

    /// Icon shown on CHILDREN cards.
    #[must_use]
    pub fn icon(&self) -> Option<&str> {
        self.non_empty("icon")
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over all keys and values in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }
}

/// Split a Markdown document into its metadata and body.
///
/// Documents without a complete front-matter block are returned unchanged
/// with empty metadata.
#[must_use]
pub fn split_front_matter(markdown: &str) -> (PageMetadata, &str) {
    let Some(block_start) = opening_delimiter_end(markdown) else {
        return (PageMetadata::default(), markdown);
    };

    let rest = &markdown[block_start..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let block = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (parse_block(block), body);
        }
        offset += line.len();
    }

    (PageMetadata::default(), markdown)
}

/// Byte offset just past the opening `---` line, if the document has one.
fn opening_delimiter_end(markdown: &str) -> Option<usize> {
    let markdown_start = markdown.len() - markdown.trim_start_matches('\u{feff}').len();
    let first_line = markdown[markdown_start..].split_inclusive('\n').next()?;
    (first_line.trim_end() == DELIMITER && first_line.ends_with('\n'))
        .then_some(markdown_start + first_line.len())
}

/// Parse the lines between the delimiters.
///
/// YAML is tried first so quoted values are unquoted; headers that are not
/// valid YAML (for example an unquoted value containing `: `) fall back to
/// splitting each line at its first colon.
fn parse_block(block: &str) -> PageMetadata {
    if block.trim().is_empty() {
        return PageMetadata::default();
    }

    match serde_yaml::from_str::<serde_yaml::Mapping>(block) {
        Ok(mapping) => PageMetadata::from_pairs(
            mapping
                .into_iter()
                .filter_map(|(key, value)| Some((scalar_to_string(key)?, scalar_to_string(value)?))),
        ),
        Err(e) => {
            tracing::debug!(error = %e, "Front-matter is not YAML, reading key/value lines");
            PageMetadata::from_pairs(block.lines().filter_map(|line| {
                let (key, value) = line.split_once(':')?;
                let key = key.trim();
                (!key.is_empty()).then(|| (key.to_owned(), value.trim().to_owned()))
            }))
        }
    }
}

fn scalar_to_string(value: serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Null => Some(String::new()),
        serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_)
        | serde_yaml::Value::Tagged(_) => None,
    }
}
