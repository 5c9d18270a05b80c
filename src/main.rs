use anyhow::Context;
use clap::Parser;
use code_explainer::config::cli::FormArgs;
use code_explainer::config::{Command, LogFormat};
use code_explainer::render::render_explanation;
use code_explainer::utils::logger;
use code_explainer::{CliConfig, Explainer, ExplainerSettings, ExplainerView, HttpBackend, Session};
use std::path::Path;
use std::process::ExitCode;
use tokio::io::{AsyncReadExt, BufReader};

async fn read_code(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut code = String::new();
            tokio::io::stdin()
                .read_to_string(&mut code)
                .await
                .context("failed to read code from stdin")?;
            Ok(code)
        }
    }
}

fn explainer(settings: &ExplainerSettings) -> anyhow::Result<Explainer<HttpBackend>> {
    let backend = settings.build_backend()?;
    tracing::debug!("Using backend at {}", backend.base_url());
    Ok(Explainer::with_view(
        backend,
        ExplainerView::with_selection(settings.language, settings.level),
    ))
}

async fn explain(settings: &ExplainerSettings, form: &FormArgs) -> anyhow::Result<ExitCode> {
    let code = read_code(form.file.as_deref()).await?;
    let explainer = explainer(settings)?;
    explainer.set_code(code).await;

    if explainer.submit().await.is_none() {
        tracing::warn!("Nothing to explain: input is empty");
        return Ok(ExitCode::FAILURE);
    }

    // Failures were already logged by the view; an unchanged view means no output.
    match explainer.snapshot().await.explanation() {
        Some(explanation) => {
            print!("{}", render_explanation(explanation, settings.format)?);
            Ok(ExitCode::SUCCESS)
        }
        None => Ok(ExitCode::FAILURE),
    }
}

async fn chat(
    settings: &ExplainerSettings,
    question: &str,
    form: &FormArgs,
) -> anyhow::Result<ExitCode> {
    let code = read_code(form.file.as_deref()).await?;
    let explainer = explainer(settings)?;
    explainer.set_code(code).await;

    let response = explainer.chat(question).await?;
    println!("{}", response.answer);
    Ok(ExitCode::SUCCESS)
}

async fn session(settings: &ExplainerSettings) -> anyhow::Result<ExitCode> {
    let session = Session::new(explainer(settings)?, settings.format);
    session
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;
    Ok(ExitCode::SUCCESS)
}

async fn health(settings: &ExplainerSettings) -> anyhow::Result<ExitCode> {
    let explainer = explainer(settings)?;
    match explainer.health().await {
        Ok(true) => {
            println!("✅ Backend at {} is healthy", settings.base_url);
            Ok(ExitCode::SUCCESS)
        }
        Ok(false) => {
            println!("❌ Backend at {} reported not ok", settings.base_url);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            println!("❌ Backend at {} is unreachable", settings.base_url);
            Ok(ExitCode::FAILURE)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config = CliConfig::parse();

    let settings = match config.settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ Configuration error: {}", e);
            return Ok(ExitCode::from(2));
        }
    };

    match settings.log_format {
        LogFormat::Compact => logger::init_cli_logger(settings.verbose),
        LogFormat::Json => logger::init_json_logger(settings.verbose),
    }
    tracing::debug!("Resolved settings: {:?}", settings);

    match &config.command {
        Command::Explain { form, .. } => explain(&settings, form).await,
        Command::Chat { question, form } => chat(&settings, question, form).await,
        Command::Session { .. } => session(&settings).await,
        Command::Health => health(&settings).await,
    }
}
