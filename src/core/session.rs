//! Line-oriented interactive session.
//!
//! Plain lines are appended to the code buffer; lines starting with `:` are
//! commands. `:explain` does not block the session: the request runs on its
//! own task and the view is printed again when it settles.

use crate::core::explainer::Explainer;
use crate::domain::model::{Language, Level};
use crate::domain::ports::ExplainBackend;
use crate::render::{render_view, submit_control, RenderFormat};
use crate::utils::error::{ExplainError, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio::task::JoinSet;

pub const HELP: &str = "\
Paste code, then type :explain.
Commands:
  :language <python|javascript|java|cpp>
  :level <beginner|intermediate|expert>
  :explain        explain the code buffer
  :ask <question> ask about the code buffer
  :show           print the current view
  :clear          empty the code buffer
  :help           print this help
  :quit           wait for pending requests and exit
";

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Code(&'a str),
    Language(Language),
    Level(Level),
    Explain,
    Ask(&'a str),
    Show,
    Clear,
    Help,
    Quit,
    Invalid(String),
}

fn parse_input(line: &str) -> Input<'_> {
    let Some(command) = line.strip_prefix(':') else {
        return Input::Code(line);
    };
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command.trim(), ""),
    };
    match name {
        "language" | "lang" => match arg.parse() {
            Ok(language) => Input::Language(language),
            Err(e) => Input::Invalid(e.to_string()),
        },
        "level" => match arg.parse() {
            Ok(level) => Input::Level(level),
            Err(e) => Input::Invalid(e.to_string()),
        },
        "explain" => Input::Explain,
        "ask" if !arg.is_empty() => Input::Ask(arg),
        "ask" => Input::Invalid("usage: :ask <question>".to_string()),
        "show" => Input::Show,
        "clear" => Input::Clear,
        "help" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => Input::Invalid(format!("unknown command ':{}', try :help", other)),
    }
}

type SharedWriter<W> = Arc<Mutex<W>>;

async fn emit<W: AsyncWrite + Unpin>(out: &SharedWriter<W>, text: &str) -> Result<()> {
    let mut out = out.lock().await;
    out.write_all(text.as_bytes()).await?;
    out.flush().await?;
    Ok(())
}

pub struct Session<B: ExplainBackend + 'static> {
    explainer: Explainer<B>,
    format: RenderFormat,
}

impl<B: ExplainBackend + 'static> Session<B> {
    pub fn new(explainer: Explainer<B>, format: RenderFormat) -> Self {
        Self { explainer, format }
    }

    pub fn explainer(&self) -> &Explainer<B> {
        &self.explainer
    }

    /// Runs until `:quit` or end of input, then returns the writer.
    pub async fn run<R, W>(&self, reader: R, writer: W) -> Result<W>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let out: SharedWriter<W> = Arc::new(Mutex::new(writer));
        let mut pending: JoinSet<Result<()>> = JoinSet::new();
        let mut lines = reader.lines();

        emit(&out, HELP).await?;

        while let Some(line) = lines.next_line().await? {
            while let Some(finished) = pending.try_join_next() {
                Self::report(finished);
            }

            match parse_input(&line) {
                Input::Code(text) => {
                    let mut code = self.explainer.snapshot().await.code().to_string();
                    code.push_str(text);
                    code.push('\n');
                    self.explainer.set_code(code).await;
                }
                Input::Language(language) => self.explainer.set_language(language).await,
                Input::Level(level) => self.explainer.set_level(level).await,
                Input::Explain => self.explain(&out, &mut pending).await?,
                Input::Ask(question) => match self.explainer.chat(question).await {
                    Ok(response) => emit(&out, &format!("{}\n", response.answer)).await?,
                    Err(e) => {
                        tracing::error!("Chat request failed: {}", e);
                        emit(&out, "No answer available.\n").await?;
                    }
                },
                Input::Show => {
                    let view = self.explainer.snapshot().await;
                    emit(&out, &render_view(&view, self.format)?).await?;
                }
                Input::Clear => self.explainer.set_code(String::new()).await,
                Input::Help => emit(&out, HELP).await?,
                Input::Quit => break,
                Input::Invalid(hint) => emit(&out, &format!("{}\n", hint)).await?,
            }
        }

        while let Some(finished) = pending.join_next().await {
            Self::report(finished);
        }

        Arc::try_unwrap(out)
            .map(Mutex::into_inner)
            .map_err(|_| ExplainError::ValidationError {
                message: "session output still in use".to_string(),
            })
    }

    async fn explain<W>(
        &self,
        out: &SharedWriter<W>,
        pending: &mut JoinSet<Result<()>>,
    ) -> Result<()>
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let view = self.explainer.snapshot().await;
        let control = submit_control(&view);
        if control.disabled {
            return emit(out, &format!("[{}] still running\n", control.label)).await;
        }
        let Some(command) = self.explainer.begin_submit().await else {
            return emit(out, "Nothing to explain yet, paste some code first.\n").await;
        };

        let busy = self.explainer.snapshot().await;
        emit(out, &render_view(&busy, self.format)?).await?;

        let explainer = self.explainer.clone();
        let out = Arc::clone(out);
        let format = self.format;
        pending.spawn(async move {
            explainer.execute(command).await;
            let settled = explainer.snapshot().await;
            emit(&out, &render_view(&settled, format)?).await
        });
        Ok(())
    }

    fn report(finished: std::result::Result<Result<()>, tokio::task::JoinError>) {
        match finished {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("Failed to print explanation: {}", e),
            Err(e) => tracing::error!("Explain task aborted: {}", e),
        }
    }
}
