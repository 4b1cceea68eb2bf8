//! Index pages for directories without one.

use std::fs;
use std::path::Path;

use docsite_renderer::{escape_html, extract_h1};

use crate::error::BuildError;
use crate::tree::{INDEX_FILE, SiteNode, file_stem};

/// Write an `index.html` into every directory of `tree` that lacks one.
///
/// Directories are processed bottom-up, so a generated index can list the
/// generated indexes of its sub-directories. The tree is updated in place
/// and the site-relative paths of the new pages are returned.
///
/// # Errors
///
/// Returns an error if a listed page cannot be read or an index cannot be
/// written.
pub fn generate_index_pages(root: &Path, tree: &mut SiteNode) -> Result<Vec<String>, BuildError> {
    let mut generated = Vec::new();
    generate(root, tree, &mut generated)?;
    Ok(generated)
}

fn generate(root: &Path, node: &mut SiteNode, generated: &mut Vec<String>) -> Result<(), BuildError> {
    for child in &mut node.children {
        generate(root, child, generated)?;
    }
    if node.has_index() {
        return Ok(());
    }

    let mut entries = Vec::with_capacity(node.files.len() + node.children.len());
    for file in &node.files {
        let path = node.file_path(file);
        entries.push((page_title(root, &path, file_stem(&path))?, path));
    }
    for child in &node.children {
        if let Some(path) = child.index_path() {
            entries.push((page_title(root, &path, child.name())?, path));
        }
    }

    let heading = if node.dir.is_empty() {
        root.file_name()
            .map_or_else(|| "Home".to_owned(), |n| n.to_string_lossy().into_owned())
    } else {
        node.name().to_owned()
    };

    let mut html = format!("<h1>{}</h1>\n<ul>\n", escape_html(&heading));
    for (title, path) in &entries {
        html.push_str(&format!(
            "<li><a href=\"{}\">{title}</a></li>\n",
            escape_html(path)
        ));
    }
    html.push_str("</ul>\n");

    let index_path = node.file_path(INDEX_FILE);
    let target = root.join(&index_path);
    fs::write(&target, html).map_err(|source| BuildError::Write {
        path: target.clone(),
        source,
    })?;
    tracing::debug!(path = %index_path, entries = entries.len(), "Generated index page");

    node.add_index();
    generated.push(index_path);
    Ok(())
}

/// H1 of a written page, or `fallback` when it has none.
fn page_title(root: &Path, path: &str, fallback: &str) -> Result<String, BuildError> {
    let file = root.join(path);
    let html = fs::read_to_string(&file).map_err(|source| BuildError::Read { path: file, source })?;
    Ok(extract_h1(&html).map_or_else(|| escape_html(fallback), str::to_owned))
}
