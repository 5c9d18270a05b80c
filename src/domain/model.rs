use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::ExplainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Python,
    Javascript,
    Java,
    Cpp,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Javascript => "javascript",
            Language::Java => "java",
            Language::Cpp => "cpp",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ExplainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" => Ok(Language::Python),
            "javascript" | "js" => Ok(Language::Javascript),
            "java" => Ok(Language::Java),
            "cpp" | "c++" => Ok(Language::Cpp),
            other => Err(ExplainError::ValidationError {
                message: format!(
                    "unknown language '{}', expected one of: python, javascript, java, cpp",
                    other
                ),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Beginner,
    Intermediate,
    Expert,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Expert => "expert",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ExplainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Level::Beginner),
            "intermediate" => Ok(Level::Intermediate),
            "expert" => Ok(Level::Expert),
            other => Err(ExplainError::ValidationError {
                message: format!(
                    "unknown level '{}', expected one of: beginner, intermediate, expert",
                    other
                ),
            }),
        }
    }
}

/// Body of `POST /explain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainRequest {
    pub code: String,
    pub language: Language,
    pub level: Level,
}

/// A key concept named by the backend, optionally with a reference link.
///
/// Accepts either `"closures"` or `{"concept": "closures", "learn_more_url": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ConceptWire")]
pub struct Concept {
    #[serde(rename = "concept")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learn_more_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ConceptWire {
    Name(String),
    Linked {
        concept: String,
        #[serde(default)]
        learn_more_url: Option<String>,
    },
}

impl From<ConceptWire> for Concept {
    fn from(wire: ConceptWire) -> Self {
        match wire {
            ConceptWire::Name(name) => Concept {
                name,
                learn_more_url: None,
            },
            ConceptWire::Linked {
                concept,
                learn_more_url,
            } => Concept {
                name: concept,
                learn_more_url,
            },
        }
    }
}

impl From<&str> for Concept {
    fn from(name: &str) -> Self {
        Concept {
            name: name.to_string(),
            learn_more_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskItem {
    pub line: i64,
    pub reason: String,
}

/// Response of `POST /explain`. Replaced wholesale on every successful submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub summary: String,
    pub walkthrough: Vec<String>,
    pub concepts: Vec<Concept>,
    pub gotchas: Vec<String>,
    pub improvements: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub questions_to_ask: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub risks: Vec<RiskItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    pub code: String,
    pub language: Language,
    pub level: Level,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub ok: bool,
}
