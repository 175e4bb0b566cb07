//! Configuration management for RW.
//!
//! Parses `rw.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `confluence.base_url`
//! - `confluence.parent_url`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override rendered documents directory.
    pub source_dir: Option<PathBuf>,
    /// Override Confluence parent page URL.
    pub parent_url: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "rw.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Documentation configuration (paths are relative strings from TOML).
    #[serde(default)]
    docs: DocsConfigRaw,
    /// Confluence configuration.
    pub confluence: Option<ConfluenceConfig>,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
}

/// Resolved documentation configuration with absolute paths.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Directory holding rendered documents.
    pub source_dir: PathBuf,
}

/// Confluence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfluenceConfig {
    /// Confluence server URL. Defaults to the scheme and host of `parent_url`.
    #[serde(default)]
    pub base_url: Option<String>,
    /// URL of the page (or space overview) documents are published under.
    pub parent_url: String,
}

impl ConfluenceConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(base_url) = &self.base_url {
            require_non_empty(base_url, "confluence.base_url")?;
            require_http_url(base_url, "confluence.base_url")?;
        }
        require_non_empty(&self.parent_url, "confluence.parent_url")?;
        require_http_url(&self.parent_url, "confluence.parent_url")?;
        Ok(())
    }
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
        /// Config field path (e.g., "`confluence.parent_url`").
        field: String,
        /// Error message (e.g., "${`CONFLUENCE_SPACE`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
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
    /// Otherwise, searches for `rw.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
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
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    ///
    /// A parent URL given without a `[confluence]` section creates one.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(parent_url) = &settings.parent_url {
            match &mut self.confluence {
                Some(confluence) => confluence.parent_url.clone_from(parent_url),
                None => {
                    self.confluence = Some(ConfluenceConfig {
                        base_url: None,
                        parent_url: parent_url.clone(),
                    });
                }
            }
        }
    }

    /// Get validated Confluence configuration.
    ///
    /// Returns the Confluence config if the `[confluence]` section is present
    /// and all fields are valid. Use this instead of accessing the `confluence`
    /// field directly when the command requires Confluence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_confluence(&self) -> Result<&ConfluenceConfig, ConfigError> {
        let conf = self.confluence.as_ref().ok_or_else(|| {
            ConfigError::Validation(
                "[confluence] section or --parent-url required".to_owned(),
            )
        })?;
        conf.validate()?;
        Ok(conf)
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
            docs: DocsConfigRaw::default(),
            confluence: None,
            docs_resolved: DocsConfig {
                source_dir: base.join("_site"),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// The `[confluence]` section is checked lazily by
    /// [`require_confluence`](Self::require_confluence).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(source_dir) = &self.docs.source_dir {
            require_non_empty(source_dir, "docs.source_dir")?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref mut confluence) = self.confluence {
            if let Some(ref base_url) = confluence.base_url {
                confluence.base_url = Some(expand::expand_env(base_url, "confluence.base_url")?);
            }
            confluence.parent_url =
                expand::expand_env(&confluence.parent_url, "confluence.parent_url")?;
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.docs_resolved = DocsConfig {
            source_dir: config_dir.join(self.docs.source_dir.as_deref().unwrap_or("_site")),
        };
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const PARENT_URL: &str = "https://example.atlassian.net/wiki/spaces/DEV/pages/100";

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/test/_site"));
        assert!(config.confluence.is_none());
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.confluence.is_none());
    }

    #[test]
    fn test_parse_confluence_config() {
        let toml = r#"
[confluence]
base_url = "https://example.atlassian.net"
parent_url = "https://example.atlassian.net/wiki/spaces/DEV/pages/100"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let confluence = config.confluence.unwrap();
        assert_eq!(
            confluence.base_url.as_deref(),
            Some("https://example.atlassian.net")
        );
        assert_eq!(confluence.parent_url, PARENT_URL);
    }

    #[test]
    fn test_parse_confluence_config_without_base_url() {
        let toml = r#"
[confluence]
parent_url = "https://example.atlassian.net/wiki/spaces/DEV/overview"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.confluence.unwrap().base_url.is_none());
    }

    #[test]
    fn test_confluence_section_requires_parent_url() {
        let toml = r#"
[confluence]
base_url = "https://example.atlassian.net"
"#;
        let err = toml::from_str::<Config>(toml).unwrap_err();
        assert!(err.to_string().contains("parent_url"));
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[docs]
source_dir = "build/site"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_eq!(
            config.docs_resolved.source_dir,
            PathBuf::from("/project/build/site")
        );
    }

    #[test]
    fn test_resolve_paths_default_source_dir() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_eq!(
            config.docs_resolved.source_dir,
            PathBuf::from("/project/_site")
        );
    }

    #[test]
    fn test_apply_cli_settings_source_dir() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            source_dir: Some(PathBuf::from("/custom/site")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(
            config.docs_resolved.source_dir,
            PathBuf::from("/custom/site")
        );
    }

    #[test]
    fn test_apply_cli_settings_parent_url_overrides_section() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.confluence = Some(ConfluenceConfig {
            base_url: Some("https://example.atlassian.net".to_owned()),
            parent_url: "https://example.atlassian.net/wiki/spaces/OLD/overview".to_owned(),
        });
        let overrides = CliSettings {
            parent_url: Some(PARENT_URL.to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        let confluence = config.confluence.unwrap();
        assert_eq!(confluence.parent_url, PARENT_URL);
        assert_eq!(
            confluence.base_url.as_deref(),
            Some("https://example.atlassian.net")
        ); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_parent_url_creates_section() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            parent_url: Some(PARENT_URL.to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        let confluence = config.require_confluence().unwrap();
        assert_eq!(confluence.parent_url, PARENT_URL);
        assert!(confluence.base_url.is_none());
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/test/_site"));
        assert!(config.confluence.is_none());
    }

    #[test]
    fn test_expand_env_vars_confluence() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("TEST_CONFLUENCE_HOST", "https://confluence.test.com");
            std::env::set_var("TEST_CONFLUENCE_PAGE", "4242");
        }

        let toml = r#"
[confluence]
base_url = "${TEST_CONFLUENCE_HOST}"
parent_url = "${TEST_CONFLUENCE_HOST}/wiki/spaces/${TEST_CONFLUENCE_SPACE:-DOC}/pages/${TEST_CONFLUENCE_PAGE}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        let confluence = config.confluence.unwrap();
        assert_eq!(
            confluence.base_url.as_deref(),
            Some("https://confluence.test.com")
        );
        assert_eq!(
            confluence.parent_url,
            "https://confluence.test.com/wiki/spaces/DOC/pages/4242"
        );

        unsafe {
            std::env::remove_var("TEST_CONFLUENCE_HOST");
            std::env::remove_var("TEST_CONFLUENCE_PAGE");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MISSING_VAR_CONFIG_TEST");
        }

        let toml = r#"
[confluence]
parent_url = "${MISSING_VAR_CONFIG_TEST}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MISSING_VAR_CONFIG_TEST"));
        assert!(err.to_string().contains("confluence.parent_url"));
    }

    #[test]
    fn test_expand_env_vars_literal_unchanged() {
        let toml = r#"
[confluence]
parent_url = "https://example.atlassian.net/wiki/spaces/DEV/pages/100"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.confluence.unwrap().parent_url, PARENT_URL);
    }

    // Validation tests

    fn assert_validation_error_on_confluence(
        config: &ConfluenceConfig,
        expected_substrings: &[&str],
    ) {
        let result = config.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    /// Create a valid Confluence config for testing.
    fn valid_confluence_config() -> ConfluenceConfig {
        ConfluenceConfig {
            base_url: Some("https://example.atlassian.net".to_owned()),
            parent_url: PARENT_URL.to_owned(),
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default_with_base(Path::new("/test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_source_dir() {
        let toml = r#"
[docs]
source_dir = ""
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("docs.source_dir"));
    }

    #[test]
    fn test_confluence_config_validate_valid() {
        assert!(valid_confluence_config().validate().is_ok());
    }

    #[test]
    fn test_confluence_config_validate_empty_parent_url() {
        let config = ConfluenceConfig {
            parent_url: String::new(),
            ..valid_confluence_config()
        };
        assert_validation_error_on_confluence(&config, &["parent_url", "empty"]);
    }

    #[test]
    fn test_confluence_config_validate_invalid_base_url() {
        let config = ConfluenceConfig {
            base_url: Some("not-a-url".to_owned()),
            ..valid_confluence_config()
        };
        assert_validation_error_on_confluence(&config, &["base_url", "http"]);
    }

    #[test]
    fn test_confluence_config_validate_invalid_parent_url() {
        let config = ConfluenceConfig {
            parent_url: "ftp://example.com/wiki".to_owned(),
            ..valid_confluence_config()
        };
        assert_validation_error_on_confluence(&config, &["parent_url", "http"]);
    }

    #[test]
    fn test_config_require_confluence_returns_validated() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.confluence = Some(valid_confluence_config());
        assert!(config.require_confluence().is_ok());
    }

    #[test]
    fn test_config_require_confluence_missing_section() {
        let config = Config::default_with_base(Path::new("/test"));
        let err = config.require_confluence().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("[confluence]"));
    }

    #[test]
    fn test_validate_passes_with_invalid_confluence_section() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.confluence = Some(ConfluenceConfig {
            base_url: None,
            parent_url: String::new(),
        });
        // Config::validate() should pass; confluence is not eagerly validated
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let err = Config::load(Some(Path::new("/nonexistent/rw.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
