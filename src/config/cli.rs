use crate::config::{ExplainerSettings, TomlConfig};
use crate::domain::model::{Language, Level};
use crate::render::RenderFormat;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "code-explainer")]
#[command(version, about = "Explain source code with a remote explanation service")]
pub struct CliConfig {
    /// Base URL of the explanation backend [default: http://localhost:8000]
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Optional TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Form fields shared by the subcommands that send code.
#[derive(Debug, Clone, Args)]
pub struct FormArgs {
    /// File to read code from; stdin when omitted
    pub file: Option<PathBuf>,

    /// python, javascript (js), java or cpp (c++); case-insensitive
    #[arg(short, long, value_parser = clap::value_parser!(Language))]
    pub language: Option<Language>,

    /// beginner, intermediate or expert; case-insensitive
    #[arg(long, value_parser = clap::value_parser!(Level))]
    pub level: Option<Level>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Explain a piece of code once and print the result
    Explain {
        #[command(flatten)]
        form: FormArgs,

        #[arg(short, long, value_enum)]
        format: Option<RenderFormat>,
    },

    /// Ask a follow-up question about a piece of code
    Chat {
        #[arg(short, long)]
        question: String,

        #[command(flatten)]
        form: FormArgs,
    },

    /// Interactive session on stdin/stdout
    Session {
        /// python, javascript (js), java or cpp (c++); case-insensitive
        #[arg(short, long, value_parser = clap::value_parser!(Language))]
        language: Option<Language>,

        /// beginner, intermediate or expert; case-insensitive
        #[arg(long, value_parser = clap::value_parser!(Level))]
        level: Option<Level>,

        #[arg(short, long, value_enum)]
        format: Option<RenderFormat>,
    },

    /// Check that the backend is up
    Health,
}

impl CliConfig {
    /// Merges the config file (if any) and flags into resolved settings.
    pub fn settings(&self) -> Result<ExplainerSettings> {
        let mut settings = match &self.config {
            Some(path) => ExplainerSettings::from_toml(&TomlConfig::from_file(path)?)?,
            None => ExplainerSettings::default(),
        };

        if let Some(endpoint) = &self.endpoint {
            settings.base_url = endpoint.clone();
        }
        settings.verbose |= self.verbose;

        let (language, level, format) = match &self.command {
            Command::Explain { form, format } => (form.language, form.level, *format),
            Command::Chat { form, .. } => (form.language, form.level, None),
            Command::Session {
                language,
                level,
                format,
            } => (*language, *level, *format),
            Command::Health => (None, None, None),
        };
        if let Some(language) = language {
            settings.language = language;
        }
        if let Some(level) = level {
            settings.level = level;
        }
        if let Some(format) = format {
            settings.format = format;
        }

        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_explain_flags_override_defaults() {
        let cli = CliConfig::parse_from([
            "code-explainer",
            "explain",
            "main.cpp",
            "--language",
            "cpp",
            "--level",
            "expert",
            "--format",
            "json",
        ]);

        let settings = cli.settings().unwrap();
        assert_eq!(settings.language, Language::Cpp);
        assert_eq!(settings.level, Level::Expert);
        assert_eq!(settings.format, RenderFormat::Json);
        assert_eq!(settings.base_url, "http://localhost:8000");
        match cli.command {
            Command::Explain { form, .. } => assert_eq!(form.file, Some(PathBuf::from("main.cpp"))),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_flags_win_over_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            b"[backend]\nbase_url = \"http://from-file:8000\"\n\n[defaults]\nlanguage = \"java\"\nlevel = \"intermediate\"\n",
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = CliConfig::parse_from([
            "code-explainer",
            "--config",
            path.as_str(),
            "session",
            "--level",
            "expert",
        ]);
        let settings = cli.settings().unwrap();
        assert_eq!(settings.base_url, "http://from-file:8000");
        assert_eq!(settings.language, Language::Java);
        assert_eq!(settings.level, Level::Expert);

        let cli = CliConfig::parse_from([
            "code-explainer",
            "health",
            "--config",
            path.as_str(),
            "--endpoint",
            "http://override:9000",
        ]);
        assert_eq!(cli.settings().unwrap().base_url, "http://override:9000");
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        let cli = CliConfig::parse_from(["code-explainer", "--endpoint", "nope", "health"]);
        assert!(cli.settings().is_err());
    }

    #[test]
    fn test_language_aliases_and_mixed_case() {
        let cases = [
            ("js", Language::Javascript),
            ("c++", Language::Cpp),
            ("Python", Language::Python),
            ("JAVASCRIPT", Language::Javascript),
            ("Java", Language::Java),
        ];
        for (arg, expected) in cases {
            let cli = CliConfig::try_parse_from(["code-explainer", "explain", "--language", arg])
                .unwrap_or_else(|e| panic!("--language {} rejected: {}", arg, e));
            assert_eq!(cli.settings().unwrap().language, expected, "--language {}", arg);
        }

        let cli =
            CliConfig::try_parse_from(["code-explainer", "session", "-l", "C++", "--level", "Expert"])
                .unwrap();
        let settings = cli.settings().unwrap();
        assert_eq!(settings.language, Language::Cpp);
        assert_eq!(settings.level, Level::Expert);

        let cli = CliConfig::try_parse_from([
            "code-explainer",
            "chat",
            "--question",
            "why?",
            "--level",
            "INTERMEDIATE",
        ])
        .unwrap();
        assert_eq!(cli.settings().unwrap().level, Level::Intermediate);
    }

    #[test]
    fn test_unknown_level_is_rejected_by_parser() {
        let result = CliConfig::try_parse_from(["code-explainer", "explain", "--level", "guru"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_language_is_rejected_by_parser() {
        let result =
            CliConfig::try_parse_from(["code-explainer", "explain", "--language", "cobol"]);
        assert!(result.is_err());
    }
}
