//! `${VAR}` / `${VAR:-default}` expansion in settings.

use std::env::VarError;

use crate::ConfigError;

/// Expand variable references in `value` in place.
///
/// A bare `$VAR` is kept literally. `field` names the setting in errors.
pub(crate) fn expand_in_place(value: &mut String, field: &str) -> Result<(), ConfigError> {
    if !value.contains("${") {
        return Ok(());
    }

    let expanded = shellexpand::env_with_context(value.as_str(), lookup)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}}: {}", e.var_name, e.cause),
        })?
        .into_owned();
    *value = expanded;
    Ok(())
}

fn lookup(name: &str) -> Result<Option<String>, VarError> {
    std::env::var(name).map(Some)
}
