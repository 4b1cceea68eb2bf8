//! `${VAR}` references in URL settings.
//!
//! `site.public_url` and `api.search_url` usually differ between a CI
//! deployment and a local preview, so both may name environment variables:
//!
//! ```toml
//! [site]
//! public_url = "https://${PAGES_HOST}/docs/"
//!
//! [api]
//! search_url = "${API_DOCS_URL:-https://api.silverstripe.org}/search/lookup"
//! ```

use std::borrow::Cow;

use crate::ConfigError;

/// Expand a URL setting against the process environment.
pub(crate) fn expand_url(value: &str, field: &str) -> Result<String, ConfigError> {
    expand_url_with(value, field, |var| std::env::var(var).ok())
}

/// Expand a URL setting, resolving variables with `lookup`.
///
/// An unset variable without a `:-default` is an error naming `field`.
/// Bare `$VAR` is kept as written, since `$` is legal in a URL.
fn expand_url_with(
    value: &str,
    field: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| match lookup(var) {
        Some(val) => Ok(Some(val)),
        None => Err(UnsetVar(var.to_owned())),
    })
    .map(Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

struct UnsetVar(String);
