#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
pub use toml_config::{LogFormat, TomlConfig};

use crate::adapters::http::{HttpBackend, DEFAULT_BASE_URL};
use crate::domain::model::{Language, Level};
use crate::render::RenderFormat;
use crate::utils::error::Result;
use crate::utils::validation::{validate_backend_url, Validate};
use std::time::Duration;

/// Fully resolved settings: built-in defaults, then the config file, then CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainerSettings {
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub language: Language,
    pub level: Level,
    pub format: RenderFormat,
    pub log_format: LogFormat,
    pub verbose: bool,
}

impl Default for ExplainerSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            language: Language::default(),
            level: Level::default(),
            format: RenderFormat::default(),
            log_format: LogFormat::default(),
            verbose: false,
        }
    }
}

impl ExplainerSettings {
    pub fn from_toml(config: &TomlConfig) -> Result<Self> {
        config.validate()?;
        let defaults = Self::default();
        Ok(Self {
            base_url: config
                .base_url()
                .map(str::to_string)
                .unwrap_or(defaults.base_url),
            timeout: config.timeout_seconds().map(Duration::from_secs),
            language: config.default_language().unwrap_or(defaults.language),
            level: config.default_level().unwrap_or(defaults.level),
            format: config.default_format().unwrap_or(defaults.format),
            log_format: config.log_format(),
            verbose: config.verbose(),
        })
    }

    pub fn build_backend(&self) -> Result<HttpBackend> {
        match self.timeout {
            Some(timeout) => HttpBackend::with_timeout(&self.base_url, timeout),
            None => HttpBackend::new(&self.base_url),
        }
    }
}

impl Validate for ExplainerSettings {
    fn validate(&self) -> Result<()> {
        validate_backend_url("endpoint", &self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_local_backend() {
        let settings = ExplainerSettings::default();
        assert_eq!(settings.base_url, "http://localhost:8000");
        assert_eq!(settings.timeout, None);
        assert_eq!(settings.language, Language::Python);
        assert_eq!(settings.level, Level::Beginner);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_from_toml_overrides_defaults() {
        let config = TomlConfig::from_toml_str(
            r#"
[backend]
timeout_seconds = 10

[defaults]
language = "java"
"#,
        )
        .unwrap();

        let settings = ExplainerSettings::from_toml(&config).unwrap();
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.timeout, Some(Duration::from_secs(10)));
        assert_eq!(settings.language, Language::Java);
        assert_eq!(settings.level, Level::Beginner);
        assert!(settings.build_backend().is_ok());
    }

    #[test]
    fn test_from_toml_rejects_invalid_config() {
        let config = TomlConfig::from_toml_str("[backend]\ntimeout_seconds = 9000\n").unwrap();
        assert!(ExplainerSettings::from_toml(&config).is_err());
    }
}
