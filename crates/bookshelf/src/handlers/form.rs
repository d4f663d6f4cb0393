//! Required form field checks.

use crate::error::{AppError, AppResult};

/// Trim every field and fail with the names of those left blank.
pub fn required<const N: usize>(fields: [(&'static str, Option<String>); N]) -> AppResult<[String; N]> {
    let fields = fields.map(|(name, value)| {
        let value = value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        (name, value)
    });

    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    Ok(fields.map(|(_, value)| value.unwrap_or_default()))
}
