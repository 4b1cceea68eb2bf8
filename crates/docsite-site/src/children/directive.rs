//! Parsing of `[CHILDREN ...]` options.

use std::sync::LazyLock;

use regex::Regex;

/// `Name="value"` options. The Markdown engine may have escaped the quotes.
static VALUE_OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(Exclude|Only|Folder)=(?:"|&quot;)(.*?)(?:"|&quot;)"#).unwrap()
});

/// Options of one `[CHILDREN ...]` occurrence.
///
/// Keywords are case-sensitive and may appear in any order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChildrenDirective {
    /// Render plain links instead of cards.
    pub as_list: bool,
    /// Reverse the candidate order before filtering.
    pub reverse: bool,
    /// With `Folder`, also list the folder's own sub-folders.
    pub include_folders: bool,
    /// Names to drop.
    pub exclude: Vec<String>,
    /// Names to keep; everything else is dropped when non-empty.
    pub only: Vec<String>,
    /// List the pages of this sub-folder instead of the page's siblings.
    /// An empty name matches no sub-folder.
    pub folder: Option<String>,
    /// Words that are not a known option.
    pub unknown: Vec<String>,
}

impl ChildrenDirective {
    /// Parse the text between `[CHILDREN` and `]`.
    ///
    /// # Example
    ///
    /// ```
    /// use docsite_site::ChildrenDirective;
    ///
    /// let directive = ChildrenDirective::parse(r#" asList Exclude="Old,Draft""#);
    /// assert!(directive.as_list);
    /// assert_eq!(directive.exclude, vec!["Old", "Draft"]);
    /// ```
    #[must_use]
    pub fn parse(options: &str) -> Self {
        let mut directive = Self::default();

        for caps in VALUE_OPTION.captures_iter(options) {
            let value = &caps[2];
            match &caps[1] {
                "Exclude" => directive.exclude.extend(split_names(value)),
                "Only" => directive.only.extend(split_names(value)),
                _ => directive.folder = Some(value.trim().to_owned()),
            }
        }

        let flags = VALUE_OPTION.replace_all(options, " ");
        for word in flags.split_whitespace() {
            match word {
                "asList" => directive.as_list = true,
                "reverse" => directive.reverse = true,
                "includeFolders" => directive.include_folders = true,
                other => directive.unknown.push(other.to_owned()),
            }
        }

        directive
    }
}

fn split_names(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
}
