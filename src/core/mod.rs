pub mod explainer;
pub mod session;
pub mod view;

pub use crate::domain::model::{ExplainRequest, Explanation, Language, Level};
pub use crate::domain::ports::ExplainBackend;
pub use crate::utils::error::Result;
