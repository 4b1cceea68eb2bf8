//! Terminal reporting for `docsite build`.

use std::path::Path;

use console::{Style, Term};
use docsite_config::Config;
use docsite_site::BuildReport;

/// Writes build progress to stderr. Results are green, warnings yellow and
/// errors red.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
        }
    }

    /// Print the sources and output directory about to be built.
    pub(crate) fn plan(&self, config: &Config) {
        for source in &config.sources_resolved {
            self.line(&format!(
                "Source: {} ({})",
                source.name,
                source.docs_dir.display()
            ));
        }
        self.line(&format!(
            "Output: {}",
            config.site_resolved.output_dir.display()
        ));
    }

    /// Print directive warnings, then the page counts.
    pub(crate) fn report(&self, report: &BuildReport, output_dir: &Path) {
        if !report.warnings.is_empty() {
            self.line(&self.yellow.apply_to(warning_heading(report)).to_string());
            for warning in &report.warnings {
                self.line(&format!("  - {warning}"));
            }
        }
        self.line(&self.green.apply_to(summary(report, output_dir)).to_string());
    }

    pub(crate) fn error(&self, msg: &str) {
        self.line(&self.red.apply_to(msg).to_string());
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }
}

fn warning_heading(report: &BuildReport) -> String {
    match report.warnings.len() {
        1 => "1 warning:".to_owned(),
        n => format!("{n} warnings:"),
    }
}

fn summary(report: &BuildReport, output_dir: &Path) -> String {
    let pages = match report.pages {
        1 => "1 page".to_owned(),
        n => format!("{n} pages"),
    };
    let generated = match report.index_pages {
        0 => String::new(),
        1 => " (1 generated index)".to_owned(),
        n => format!(" ({n} generated indexes)"),
    };
    format!("Built {pages}{generated} to {}", output_dir.display())
}
