//! `docsite build` command implementation.

use std::path::PathBuf;

use clap::Args;
use docsite_config::{CliSettings, Config};
use docsite_renderer::ApiLinkConfig;
use docsite_site::{BaseUrl, BuildConfig, SiteBuilder, SourceDir};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover docsite.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for the generated site (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Markdown source directory, replacing the configured sources.
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Build for publishing: pages link to `site.public_url`.
    #[arg(long, env = "CI")]
    ci: bool,

    /// Enable verbose output (per-phase timing and progress logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the build aborts.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            output_dir: self.output_dir,
            source_dir: self.source_dir,
            ci: self.ci.then_some(true),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.plan(&config);

        let build_config = build_config(&config)?;
        let output_dir = build_config.output_dir.clone();
        let report = SiteBuilder::new(build_config).build()?;

        output.report(&report, &output_dir);
        Ok(())
    }
}

/// Translate the loaded configuration into pipeline settings.
fn build_config(config: &Config) -> Result<BuildConfig, CliError> {
    let site = &config.site_resolved;

    let base_url = match (&site.public_url, site.ci) {
        (Some(url), true) => BaseUrl::public(url),
        _ => BaseUrl::local(&site.output_dir)?,
    };

    Ok(BuildConfig {
        output_dir: site.output_dir.clone(),
        sources: config
            .sources_resolved
            .iter()
            .map(|source| SourceDir {
                name: source.name.clone(),
                docs_dir: source.docs_dir.clone(),
                prefix: source.prefix.clone(),
            })
            .collect(),
        template: site.template.clone(),
        stylesheet: site.stylesheet.clone(),
        base_url,
        api: ApiLinkConfig {
            search_url: config.api.search_url.clone(),
            major_version: config.api.major_version,
        },
        sort_children_by_title: config.children.sort_by_title,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use pretty_assertions::assert_eq;

    fn load(toml: &str, settings: &CliSettings) -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docsite.toml");
        fs::write(&path, toml).unwrap();
        let config = Config::load(Some(&path), Some(settings)).unwrap();
        (dir, config)
    }

    #[test]
    fn test_build_config_local_base_url() {
        let (dir, config) = load("", &CliSettings::default());

        let build = build_config(&config).unwrap();

        assert_eq!(build.output_dir, dir.path().join("_site"));
        assert!(build.base_url.as_str().starts_with("file://"));
        assert!(build.base_url.as_str().ends_with("/_site/"));
        assert_eq!(build.sources.len(), 1);
        assert_eq!(build.sources[0].docs_dir, dir.path().join("docs"));
        assert_eq!(build.api.major_version, 5);
        assert!(!build.sort_children_by_title);
    }

    #[test]
    fn test_build_config_ci_uses_public_url() {
        let toml = r#"
[site]
public_url = "https://example.github.io/docs"

[api]
major_version = 6

[children]
sort_by_title = true

[[sources]]
name = "developer-docs"
docs_dir = "repos/developer-docs/en"
prefix = "en"
"#;
        let settings = CliSettings {
            ci: Some(true),
            ..CliSettings::default()
        };
        let (dir, config) = load(toml, &settings);

        let build = build_config(&config).unwrap();

        assert_eq!(build.base_url.as_str(), "https://example.github.io/docs/");
        assert_eq!(build.api.major_version, 6);
        assert!(build.sort_children_by_title);
        assert_eq!(
            build.sources,
            vec![SourceDir {
                name: "developer-docs".to_owned(),
                docs_dir: dir.path().join("repos/developer-docs/en"),
                prefix: "en".to_owned(),
            }]
        );
    }

    #[test]
    fn test_build_config_public_url_ignored_outside_ci() {
        let (_dir, config) = load(
            "[site]\npublic_url = \"https://example.github.io/docs/\"\n",
            &CliSettings::default(),
        );

        let build = build_config(&config).unwrap();

        assert!(build.base_url.as_str().starts_with("file://"));
    }
}
