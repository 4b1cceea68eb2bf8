//! Site build pipeline.
//!
//! Phases run strictly in order, each finishing before the next starts:
//!
//! 1. Check the sources exist and lie outside the output directory, then
//!    reset the output directory.
//! 2. Convert every Markdown source into an HTML page, recording its metadata.
//! 3. Scan the output into a [`SiteNode`] tree and generate missing index pages.
//! 4. Snapshot the tree, metadata and page contents into a [`SiteContext`].
//! 5. Render every page in parallel: CHILDREN directives, heading anchors,
//!    anchor and `api:` links, side navigation, template. Each task owns
//!    exactly one output file.
//! 6. Copy the stylesheet.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use docsite_renderer::{
    ApiLinkConfig, MarkdownConverter, PageMetadata, add_heading_anchors, qualify_anchor_links,
    resolve_api_links, split_front_matter,
};
use glob::MatchOptions;
use rayon::prelude::*;

use crate::children::{ChildrenResolver, ResolvedChildren};
use crate::context::SiteContext;
use crate::error::BuildError;
use crate::index_pages::generate_index_pages;
use crate::nav::SideNav;
use crate::related::RelatedPaths;
use crate::template::{BaseUrl, DEFAULT_STYLESHEET, Template};
use crate::tree::{SiteNode, build_tree, join_path};

/// Convert Duration to milliseconds as f64.
fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// A directory of Markdown documents to publish.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceDir {
    /// Name used in logs.
    pub name: String,
    /// Directory containing the `.md` files.
    pub docs_dir: PathBuf,
    /// Site sub-directory the pages are written to (`""` for the root).
    pub prefix: String,
}

/// Configuration for [`SiteBuilder`].
#[derive(Clone, Debug)]
pub struct BuildConfig {
    /// Output directory. Removed and recreated by every build.
    pub output_dir: PathBuf,
    pub sources: Vec<SourceDir>,
    /// Template file; the bundled template when `None`.
    pub template: Option<PathBuf>,
    /// Stylesheet file; the bundled stylesheet when `None`.
    pub stylesheet: Option<PathBuf>,
    pub base_url: BaseUrl,
    pub api: ApiLinkConfig,
    /// Sort CHILDREN lists by title.
    pub sort_children_by_title: bool,
}

/// Summary of a finished build.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Pages written, generated index pages included.
    pub pages: usize,
    /// Index pages generated for directories without one.
    pub index_pages: usize,
    /// Non-fatal problems, each naming the page it was found in.
    pub warnings: Vec<String>,
}

/// Builds a static site from Markdown sources.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use std::path::PathBuf;
/// use docsite_renderer::ApiLinkConfig;
/// use docsite_site::{BaseUrl, BuildConfig, SiteBuilder, SourceDir};
///
/// let output_dir = PathBuf::from("_site");
/// let config = BuildConfig {
///     base_url: BaseUrl::local(&output_dir)?,
///     output_dir,
///     sources: vec![SourceDir {
///         name: "docs".to_owned(),
///         docs_dir: PathBuf::from("docs"),
///         prefix: String::new(),
///     }],
///     template: None,
///     stylesheet: None,
///     api: ApiLinkConfig {
///         search_url: "https://api.silverstripe.org/search/lookup".to_owned(),
///         major_version: 5,
///     },
///     sort_children_by_title: false,
/// };
///
/// let report = SiteBuilder::new(config).build()?;
/// println!("{} pages", report.pages);
/// # Ok(())
/// # }
/// ```
pub struct SiteBuilder {
    config: BuildConfig,
    converter: MarkdownConverter,
}

impl SiteBuilder {
    #[must_use]
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            converter: MarkdownConverter::new(),
        }
    }

    /// Run the whole build.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error; the output directory is then left
    /// partially written.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let start = Instant::now();
        let output_dir = &self.config.output_dir;

        self.check_inputs()?;

        // Load the template before touching the output directory.
        let template = match &self.config.template {
            Some(path) => Template::load(path)?,
            None => Template::default(),
        };

        reset_dir(output_dir)?;

        let metadata = self.convert_sources()?;

        let mut tree = build_tree(output_dir)?;
        let generated = generate_index_pages(output_dir, &mut tree)?;
        tracing::info!(
            pages = tree.page_count(),
            index_pages = generated.len(),
            "Site tree ready"
        );

        let ctx = load_context(output_dir, tree, metadata)?;
        let paths = ctx.tree().page_paths();

        let warnings: Vec<Vec<String>> = paths
            .par_iter()
            .map(|path| self.render_page(&ctx, &template, path))
            .collect::<Result<_, _>>()?;

        self.copy_stylesheet()?;

        let report = BuildReport {
            pages: paths.len(),
            index_pages: generated.len(),
            warnings: warnings.into_iter().flatten().collect(),
        };
        tracing::info!(
            pages = report.pages,
            warnings = report.warnings.len(),
            elapsed_ms = elapsed_ms(start),
            "Site built"
        );
        Ok(report)
    }

    /// Fail before the output directory is reset if a source is missing or
    /// would be deleted along with it.
    fn check_inputs(&self) -> Result<(), BuildError> {
        for source in &self.config.sources {
            if !source.docs_dir.is_dir() {
                return Err(BuildError::MissingSource {
                    path: source.docs_dir.clone(),
                });
            }
        }

        let output = normalize(&self.config.output_dir);
        let inputs = self
            .config
            .sources
            .iter()
            .map(|source| &source.docs_dir)
            .chain(&self.config.template)
            .chain(&self.config.stylesheet);
        for input in inputs {
            if normalize(input).starts_with(&output) {
                return Err(BuildError::OutputOverlapsInput {
                    output: self.config.output_dir.clone(),
                    input: input.clone(),
                });
            }
        }
        Ok(())
    }

    /// Convert every source document, returning metadata by page path.
    fn convert_sources(&self) -> Result<HashMap<String, PageMetadata>, BuildError> {
        let mut metadata = HashMap::new();

        for source in &self.config.sources {
            let documents = find_markdown(&source.docs_dir)?;
            tracing::info!(
                source = %source.name,
                documents = documents.len(),
                "Converting Markdown sources"
            );

            for (file, relative) in documents {
                let page_path = join_path(&source.prefix, &relative);
                let markdown = fs::read_to_string(&file).map_err(|e| BuildError::Read {
                    path: file.clone(),
                    source: e,
                })?;

                let (page_metadata, body) = split_front_matter(&markdown);
                let html = self.converter.convert(body, &page_path);
                write_file(&self.config.output_dir.join(&page_path), &html)?;
                tracing::debug!(path = %page_path, "Converted page");

                if metadata.insert(page_path.clone(), page_metadata).is_some() {
                    tracing::warn!(path = %page_path, source = %source.name, "Page overwritten by a later source");
                }
            }
        }

        Ok(metadata)
    }

    /// Render one page in place. Returns its warnings.
    fn render_page(
        &self,
        ctx: &SiteContext,
        template: &Template,
        path: &str,
    ) -> Result<Vec<String>, BuildError> {
        let content = ctx.content(path).unwrap_or_default();

        let resolved = match ctx.node_for(path) {
            Some(node) => {
                let related = RelatedPaths::for_page(node, path);
                ChildrenResolver::new(ctx)
                    .sort_by_title(self.config.sort_children_by_title)
                    .resolve(content, path, &related)
            }
            None => ResolvedChildren {
                html: content.to_owned(),
                warnings: Vec::new(),
            },
        };
        for warning in &resolved.warnings {
            tracing::warn!(path = %path, "{warning}");
        }

        let html = add_heading_anchors(&resolved.html);
        let html = qualify_anchor_links(&html, path);
        let html = resolve_api_links(&html, &self.config.api);

        let side_nav = SideNav::new(ctx, path).render();
        let page = template.compose(&self.config.base_url, &ctx.title(path), &side_nav, &html);

        write_file(&self.config.output_dir.join(path), &page)?;
        tracing::debug!(path = %path, "Rendered page");

        Ok(resolved.warnings)
    }

    fn copy_stylesheet(&self) -> Result<(), BuildError> {
        let target = self.config.output_dir.join("styles.css");
        match &self.config.stylesheet {
            Some(path) => fs::copy(path, &target)
                .map(|_| ())
                .map_err(|source| BuildError::Write {
                    path: target,
                    source,
                }),
            None => write_file(&target, DEFAULT_STYLESHEET),
        }
    }
}

/// Absolute form of `path`, with symlinks resolved when it exists.
fn normalize(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Remove and recreate a directory.
fn reset_dir(dir: &Path) -> Result<(), BuildError> {
    let write_error = |source| BuildError::Write {
        path: dir.to_path_buf(),
        source,
    };
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(write_error)?;
    }
    fs::create_dir_all(dir).map_err(write_error)
}

/// Markdown files under `docs_dir` with their site-relative `.html` paths.
fn find_markdown(docs_dir: &Path) -> Result<Vec<(PathBuf, String)>, BuildError> {
    let pattern = format!(
        "{}/**/*.md",
        glob::Pattern::escape(&docs_dir.to_string_lossy())
    );
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    let entries = glob::glob_with(&pattern, options).map_err(|source| BuildError::Glob {
        pattern: pattern.clone(),
        source,
    })?;

    let mut documents = Vec::new();
    for entry in entries {
        let file = entry.map_err(|e| BuildError::Read {
            path: e.path().to_path_buf(),
            source: e.into_error(),
        })?;
        if !file.is_file() {
            continue;
        }
        let Ok(relative) = file.strip_prefix(docs_dir) else {
            continue;
        };
        let relative = relative
            .with_extension("html")
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        documents.push((file, relative));
    }
    Ok(documents)
}

/// Read every page of the finished tree into a context snapshot.
fn load_context(
    root: &Path,
    tree: SiteNode,
    metadata: HashMap<String, PageMetadata>,
) -> Result<SiteContext, BuildError> {
    let contents = tree
        .page_paths()
        .into_par_iter()
        .map(|path| {
            let file = root.join(&path);
            fs::read_to_string(&file)
                .map(|html| (path, html))
                .map_err(|source| BuildError::Read { path: file, source })
        })
        .collect::<Result<HashMap<_, _>, _>>()?;
    Ok(SiteContext::new(tree, metadata, contents))
}

fn write_file(path: &Path, contents: &str) -> Result<(), BuildError> {
    let write_error = |source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    fs::write(path, contents).map_err(write_error)
}
