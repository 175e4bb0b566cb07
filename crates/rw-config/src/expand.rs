//! `${VAR}` and `${VAR:-default}` expansion for configuration strings.

use crate::ConfigError;

/// Expand environment variable references in `value`.
///
/// Only the braced form is expanded; a bare `$` is kept literally, which
/// leaves URLs containing `$` untouched. An unset variable without a default
/// is an error naming `field`.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var).map(Some).map_err(|_| UnsetVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Lookup failure for a variable.
struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_expand_embedded_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("RW_TEST_SPACE", "DEV");
        }
        let result = expand_env(
            "https://example.atlassian.net/wiki/spaces/${RW_TEST_SPACE}/overview",
            "confluence.parent_url",
        )
        .unwrap();
        assert_eq!(
            result,
            "https://example.atlassian.net/wiki/spaces/DEV/overview"
        );
        unsafe {
            std::env::remove_var("RW_TEST_SPACE");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("RW_TEST_UNSET_HOST");
        }
        let result = expand_env(
            "${RW_TEST_UNSET_HOST:-https://wiki.example.com}",
            "confluence.base_url",
        )
        .unwrap();
        assert_eq!(result, "https://wiki.example.com");
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("RW_TEST_MISSING");
        }
        let err = expand_env("${RW_TEST_MISSING}", "confluence.base_url").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("RW_TEST_MISSING"));
        assert!(err.to_string().contains("confluence.base_url"));
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        let result = expand_env("https://example.com/$path", "confluence.base_url").unwrap();
        assert_eq!(result, "https://example.com/$path");
    }
}
