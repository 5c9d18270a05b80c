use crate::utils::error::{ExplainError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: String) -> ExplainError {
    ExplainError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason,
    }
}

/// The explanation backend is reached over plain HTTP(S) only; `/explain`,
/// `/chat` and `/health` are joined onto this base.
pub fn validate_backend_url(field: &str, base_url: &str) -> Result<()> {
    if base_url.trim().is_empty() {
        return Err(invalid(
            field,
            base_url,
            "backend URL is required, e.g. http://localhost:8000".to_string(),
        ));
    }

    let url = Url::parse(base_url).map_err(|e| {
        invalid(
            field,
            base_url,
            format!("not an absolute backend URL ({}), e.g. http://localhost:8000", e),
        )
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(
            field,
            base_url,
            format!("backend must be served over http or https, got '{}'", scheme),
        )),
    }
}

/// Questions and code are only sent when they contain something besides whitespace.
pub fn validate_non_blank(field: &str, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(invalid(
            field,
            text,
            format!("{} must contain some non-whitespace text", field),
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field,
            value,
            format!("expected {} to {} inclusive", min, max),
        ));
    }
    Ok(())
}
