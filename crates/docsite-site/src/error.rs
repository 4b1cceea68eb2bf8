use std::path::PathBuf;

/// Fatal build error.
///
/// Any of these aborts the whole build. Problems confined to a single
/// directive are reported as warnings instead.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A source or generated file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// An output file or directory could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A directory of the output tree could not be listed.
    #[error("Failed to list directory {}: {source}", path.display())]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The page template could not be loaded.
    #[error("Failed to load template {}: {source}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A configured source directory does not exist.
    #[error("Source directory {} does not exist", path.display())]
    MissingSource { path: PathBuf },
    /// The output directory is, or contains, an input of the build.
    #[error("Output directory {} would overwrite {}", output.display(), input.display())]
    OutputOverlapsInput { output: PathBuf, input: PathBuf },
    /// A source directory produced an invalid glob pattern.
    #[error("Invalid source pattern {pattern}: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}
