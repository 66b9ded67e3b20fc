//! `${VAR}` and `${VAR:-default}` expansion for configuration strings.
//!
//! Only braced references are expanded. Bare `$VAR` and an unclosed `${`
//! are copied as written, even next to a braced reference.

use std::borrow::Cow;

use crate::ConfigError;

/// Expand braced environment references in `value`.
///
/// `field` names the configuration key in the error.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    let mut expanded = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${")
        && let Some(len) = rest[start..].find('}')
    {
        let end = start + len + 1;
        expanded.push_str(&rest[..start]);
        expanded.push_str(&expand_reference(&rest[start..end], field)?);
        rest = &rest[end..];
    }
    expanded.push_str(rest);
    Ok(expanded)
}

/// Expand a single `${...}` reference.
fn expand_reference(reference: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env_with_context(reference, |name| std::env::var(name).map(Some))
        .map(Cow::into_owned)
        .map_err(|err| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}}: {}", err.var_name, err.cause),
        })
}
