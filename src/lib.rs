pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod render;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::HttpBackend;
pub use config::{ExplainerSettings, TomlConfig};
pub use core::{explainer::Explainer, session::Session, view::ExplainerView};
pub use domain::model::{Concept, Explanation, Language, Level};
pub use render::RenderFormat;
pub use utils::error::{ExplainError, Result};
