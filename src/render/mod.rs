//! Turns explanations and view state into printable output.

use crate::core::view::ExplainerView;
use crate::domain::model::{Concept, Explanation};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    #[default]
    Text,
    Markdown,
    Json,
}

pub const SUBMIT_LABEL: &str = "Explain Code";
pub const BUSY_LABEL: &str = "Explaining...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitControl {
    pub label: &'static str,
    pub disabled: bool,
}

pub fn submit_control(view: &ExplainerView) -> SubmitControl {
    if view.is_in_flight() {
        SubmitControl {
            label: BUSY_LABEL,
            disabled: true,
        }
    } else {
        SubmitControl {
            label: SUBMIT_LABEL,
            disabled: false,
        }
    }
}

enum ListStyle {
    Numbered,
    Bulleted,
}

struct Section {
    title: &'static str,
    items: Vec<String>,
    style: ListStyle,
    // Walkthrough and concepts are listed even when empty.
    always: bool,
}

impl Section {
    fn new(title: &'static str, items: Vec<String>, style: ListStyle, always: bool) -> Self {
        Self {
            title,
            items,
            style,
            always,
        }
    }
}

fn concept_text(concept: &Concept, format: RenderFormat) -> String {
    match (&concept.learn_more_url, format) {
        (Some(url), RenderFormat::Markdown) => format!("[{}]({})", concept.name, url),
        (Some(url), _) => format!("{} <{}>", concept.name, url),
        (None, _) => concept.name.clone(),
    }
}

fn sections(explanation: &Explanation, format: RenderFormat) -> Vec<Section> {
    vec![
        Section::new(
            "Walkthrough",
            explanation.walkthrough.clone(),
            ListStyle::Numbered,
            true,
        ),
        Section::new(
            "Key Concepts",
            explanation
                .concepts
                .iter()
                .map(|c| concept_text(c, format))
                .collect(),
            ListStyle::Numbered,
            true,
        ),
        Section::new(
            "Gotchas",
            explanation.gotchas.clone(),
            ListStyle::Bulleted,
            false,
        ),
        Section::new(
            "Improvements",
            explanation.improvements.clone(),
            ListStyle::Bulleted,
            false,
        ),
        Section::new(
            "Questions to Ask",
            explanation.questions_to_ask.clone(),
            ListStyle::Bulleted,
            false,
        ),
        Section::new(
            "Risks",
            explanation
                .risks
                .iter()
                .map(|r| format!("line {}: {}", r.line, r.reason))
                .collect(),
            ListStyle::Bulleted,
            false,
        ),
    ]
}

fn write_text(out: &mut String, explanation: &Explanation) -> fmt::Result {
    writeln!(out, "Summary: {}", explanation.summary)?;
    for section in sections(explanation, RenderFormat::Text) {
        if !section.always && section.items.is_empty() {
            continue;
        }
        writeln!(out)?;
        writeln!(out, "{}", section.title)?;
        for (i, item) in section.items.iter().enumerate() {
            match section.style {
                ListStyle::Numbered => {
                    writeln!(out, "  {}. {}", i + 1, item)?;
                }
                ListStyle::Bulleted => {
                    writeln!(out, "  - {}", item)?;
                }
            }
        }
    }
    Ok(())
}

fn write_markdown(out: &mut String, explanation: &Explanation) -> fmt::Result {
    writeln!(out, "## Explanation")?;
    writeln!(out)?;
    writeln!(out, "**Summary:** {}", explanation.summary)?;
    for section in sections(explanation, RenderFormat::Markdown) {
        if !section.always && section.items.is_empty() {
            continue;
        }
        writeln!(out)?;
        writeln!(out, "### {}", section.title)?;
        for (i, item) in section.items.iter().enumerate() {
            match section.style {
                ListStyle::Numbered => {
                    writeln!(out, "{}. {}", i + 1, item)?;
                }
                ListStyle::Bulleted => {
                    writeln!(out, "- {}", item)?;
                }
            }
        }
    }
    Ok(())
}

pub fn render_explanation(explanation: &Explanation, format: RenderFormat) -> Result<String> {
    let mut out = String::new();
    match format {
        RenderFormat::Text => write_text(&mut out, explanation)?,
        RenderFormat::Markdown => write_markdown(&mut out, explanation)?,
        RenderFormat::Json => {
            out = serde_json::to_string_pretty(explanation)?;
            out.push('\n');
        }
    }
    Ok(out)
}

/// Renders the whole form: selection, submit control, and explanation if any.
pub fn render_view(view: &ExplainerView, format: RenderFormat) -> Result<String> {
    let control = submit_control(view);
    match format {
        RenderFormat::Json => {
            let value = serde_json::json!({
                "language": view.language(),
                "level": view.level(),
                "in_flight": view.is_in_flight(),
                "submit": { "label": control.label, "disabled": control.disabled },
                "explanation": view.explanation(),
            });
            let mut out = serde_json::to_string_pretty(&value)?;
            out.push('\n');
            Ok(out)
        }
        RenderFormat::Text | RenderFormat::Markdown => {
            let mut out = String::new();
            let state = if control.disabled { " (disabled)" } else { "" };
            writeln!(
                out,
                "[{}]{}  language: {}  level: {}",
                control.label,
                state,
                view.language(),
                view.level()
            )?;
            if let Some(explanation) = view.explanation() {
                writeln!(out)?;
                out.push_str(&render_explanation(explanation, format)?);
            }
            Ok(out)
        }
    }
}
