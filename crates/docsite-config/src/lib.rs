//! Configuration management for docsite.
//!
//! Parses `docsite.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Example
//!
//! ```toml
//! [site]
//! output_dir = "_site"
//! template = "templates/template.html"
//! stylesheet = "css/styles.css"
//! public_url = "https://example.github.io/docs/"
//!
//! [api]
//! search_url = "https://api.silverstripe.org/search/lookup"
//! major_version = 5
//!
//! [[sources]]
//! name = "developer-docs"
//! docs_dir = "repos/developer-docs-5/en"
//! prefix = "en"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `site.public_url` and `api.search_url` support `${VAR}` and
//! `${VAR:-default}`.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the output directory.
    pub output_dir: Option<PathBuf>,
    /// Replace all configured sources with a single docs directory.
    pub source_dir: Option<PathBuf>,
    /// Override the CI flag (selects the public base URL).
    pub ci: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "docsite.toml";

const DEFAULT_SEARCH_URL: &str = "https://api.silverstripe.org/search/lookup";
const DEFAULT_MAJOR_VERSION: u32 = 5;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site output configuration (paths are relative strings from TOML).
    site: SiteConfigRaw,
    /// `api:` link configuration.
    pub api: ApiConfig,
    /// CHILDREN directive configuration.
    pub children: ChildrenConfig,
    /// Documentation sources (paths are relative strings from TOML).
    sources: Vec<SourceConfigRaw>,

    /// Resolved site configuration (set after loading).
    #[serde(skip)]
    pub site_resolved: SiteConfig,
    /// Resolved documentation sources (set after loading).
    #[serde(skip)]
    pub sources_resolved: Vec<SourceConfig>,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw site configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SiteConfigRaw {
    output_dir: Option<String>,
    template: Option<String>,
    stylesheet: Option<String>,
    public_url: Option<String>,
    ci: Option<bool>,
}

/// Resolved site configuration with absolute paths.
#[derive(Debug, Default)]
pub struct SiteConfig {
    /// Directory the site is generated into. Wiped at the start of a build.
    pub output_dir: PathBuf,
    /// Page template. The bundled template is used when unset.
    pub template: Option<PathBuf>,
    /// Stylesheet copied to `styles.css`. The bundled one is used when unset.
    pub stylesheet: Option<PathBuf>,
    /// Public base URL of the published site.
    pub public_url: Option<String>,
    /// Whether the build runs in CI (pages then link to `public_url`).
    pub ci: bool,
}

/// `api:` pseudo-link configuration.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    /// API documentation search endpoint.
    pub search_url: String,
    /// Major version of the documented framework.
    pub major_version: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_owned(),
            major_version: DEFAULT_MAJOR_VERSION,
        }
    }
}

/// CHILDREN directive configuration.
#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ChildrenConfig {
    /// Sort CHILDREN entries by title.
    ///
    /// Off by default: sorted lists stop matching the side navigation order.
    pub sort_by_title: bool,
}

/// Raw documentation source as parsed from TOML.
#[derive(Debug, Deserialize)]
struct SourceConfigRaw {
    name: Option<String>,
    docs_dir: String,
    prefix: Option<String>,
}

/// Resolved documentation source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Display name used in logs.
    pub name: String,
    /// Directory containing the Markdown files.
    pub docs_dir: PathBuf,
    /// Sub-directory of the site the pages are written to (`""` for the root).
    pub prefix: String,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.public_url`").
        field: String,
        /// Error message (e.g., "${`PAGES_URL`} not set").
        message: String,
    },
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `docsite.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, and the
    /// result is validated once more so overrides cannot bypass validation.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(output_dir) = &settings.output_dir {
            self.site_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(source_dir) = &settings.source_dir {
            self.sources_resolved = vec![SourceConfig {
                name: dir_name(source_dir),
                docs_dir: source_dir.clone(),
                prefix: String::new(),
            }];
        }
        if let Some(ci) = settings.ci {
            self.site_resolved.ci = ci;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteConfigRaw::default(),
            api: ApiConfig::default(),
            children: ChildrenConfig::default(),
            sources: Vec::new(),
            site_resolved: SiteConfig {
                output_dir: base.join("_site"),
                ..SiteConfig::default()
            },
            sources_resolved: vec![default_source(base)],
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_site()?;
        self.validate_api()?;
        self.validate_sources()?;
        Ok(())
    }

    fn validate_site(&self) -> Result<(), ConfigError> {
        match &self.site_resolved.public_url {
            Some(url) => require_http_url(url, "site.public_url"),
            None if self.site_resolved.ci => Err(ConfigError::Validation(
                "site.public_url is required when building in CI".to_owned(),
            )),
            None => Ok(()),
        }
    }

    fn validate_api(&self) -> Result<(), ConfigError> {
        require_http_url(&self.api.search_url, "api.search_url")?;
        if self.api.major_version == 0 {
            return Err(ConfigError::Validation(
                "api.major_version must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_sources(&self) -> Result<(), ConfigError> {
        for source in &self.sources_resolved {
            let prefix = &source.prefix;
            if prefix.starts_with('/') || prefix.split('/').any(|segment| segment == "..") {
                return Err(ConfigError::Validation(format!(
                    "sources.prefix \"{prefix}\" must be a relative path inside the site"
                )));
            }
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref url) = self.site.public_url {
            self.site.public_url = Some(expand::expand_url(url, "site.public_url")?);
        }
        self.api.search_url = expand::expand_url(&self.api.search_url, "api.search_url")?;
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let site = &self.site;
        self.site_resolved = SiteConfig {
            output_dir: config_dir.join(site.output_dir.as_deref().unwrap_or("_site")),
            template: site.template.as_ref().map(|p| config_dir.join(p)),
            stylesheet: site.stylesheet.as_ref().map(|p| config_dir.join(p)),
            public_url: site.public_url.clone(),
            ci: site.ci.unwrap_or(false),
        };

        self.sources_resolved = if self.sources.is_empty() {
            vec![default_source(config_dir)]
        } else {
            self.sources
                .iter()
                .map(|raw| {
                    let docs_dir = config_dir.join(&raw.docs_dir);
                    SourceConfig {
                        name: raw.name.clone().unwrap_or_else(|| dir_name(&docs_dir)),
                        docs_dir,
                        prefix: raw
                            .prefix
                            .as_deref()
                            .unwrap_or_default()
                            .trim_matches('/')
                            .to_owned(),
                    }
                })
                .collect()
        };
    }
}

fn default_source(base: &Path) -> SourceConfig {
    SourceConfig {
        name: "docs".to_owned(),
        docs_dir: base.join("docs"),
        prefix: String::new(),
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| "docs".to_owned(), |n| n.to_string_lossy().into_owned())
}
