//! URL templating helpers

use privateca_core::provider::ProviderError;
use regex::{Captures, Regex};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("no value for {{{{{0}}}}} in {1}")]
    MissingParam(String, String),
    #[error("invalid template pattern: {0}")]
    Pattern(String),
}

impl From<TemplateError> for ProviderError {
    fn from(e: TemplateError) -> Self {
        ProviderError::Url(e.to_string())
    }
}

/// Substitute `{{param}}` placeholders in `template` and prefix `base_path`.
///
/// Values are percent-encoded for use inside a single path segment or query
/// value. An empty value counts as missing.
pub fn url_template(
    template: &str,
    base_path: &str,
    params: &[(&str, &str)],
) -> Result<String, TemplateError> {
    let re = Regex::new(r"\{\{(\w+)\}\}").map_err(|e| TemplateError::Pattern(e.to_string()))?;

    let mut missing = None;
    let path = re.replace_all(template, |caps: &Captures| {
        let key = &caps[1];
        match params.iter().find(|(k, _)| *k == key) {
            Some((_, value)) if !value.is_empty() => urlencoding::encode(value).into_owned(),
            _ => {
                missing.get_or_insert_with(|| key.to_string());
                String::new()
            }
        }
    });

    if let Some(key) = missing {
        return Err(TemplateError::MissingParam(key, template.to_string()));
    }

    Ok(format!(
        "{}/{}",
        base_path.trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}
