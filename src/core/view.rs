//! Explainer view state and its update function.
//!
//! All state changes go through [`ExplainerView::update`]. Side effects are
//! returned as [`Command`]s for the caller to run; their results come back in
//! as [`Message::Settled`].

use crate::domain::model::{ExplainRequest, Explanation, Language, Level};
use crate::utils::error::ExplainError;

#[derive(Debug)]
pub enum Message {
    CodeChanged(String),
    LanguageSelected(Language),
    LevelSelected(Level),
    Submit,
    Settled {
        seq: u64,
        outcome: Result<Explanation, ExplainError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Explain { seq: u64, request: ExplainRequest },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplainerView {
    code: String,
    language: Language,
    level: Level,
    explanation: Option<Explanation>,
    in_flight: bool,
    last_issued: u64,
}

impl ExplainerView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selection(language: Language, level: Level) -> Self {
        Self {
            language,
            level,
            ..Self::default()
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn explanation(&self) -> Option<&Explanation> {
        self.explanation.as_ref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Sequence number of the most recently issued request, 0 if none.
    pub fn last_issued(&self) -> u64 {
        self.last_issued
    }

    pub fn can_submit(&self) -> bool {
        !self.code.trim().is_empty()
    }

    pub fn update(&mut self, message: Message) -> Option<Command> {
        match message {
            Message::CodeChanged(code) => {
                self.code = code;
                None
            }
            Message::LanguageSelected(language) => {
                self.language = language;
                None
            }
            Message::LevelSelected(level) => {
                self.level = level;
                None
            }
            Message::Submit => {
                if !self.can_submit() {
                    tracing::debug!("Ignoring submit with blank code");
                    return None;
                }
                self.in_flight = true;
                self.last_issued += 1;
                let seq = self.last_issued;
                tracing::debug!(
                    "Issuing explain request #{} ({}, {})",
                    seq,
                    self.language,
                    self.level
                );
                Some(Command::Explain {
                    seq,
                    request: ExplainRequest {
                        code: self.code.clone(),
                        language: self.language,
                        level: self.level,
                    },
                })
            }
            Message::Settled { seq, outcome } => {
                match outcome {
                    Ok(explanation) => {
                        if seq != self.last_issued {
                            tracing::debug!(
                                "Request #{} settled after newer request #{}, applying anyway",
                                seq,
                                self.last_issued
                            );
                        }
                        self.explanation = Some(explanation);
                    }
                    Err(e) => {
                        tracing::error!("Explain request #{} failed: {}", seq, e);
                    }
                }
                self.in_flight = false;
                None
            }
        }
    }
}
