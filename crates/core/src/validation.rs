//! Field-level validation helpers.
//!
//! Handlers run `validator` derives on incoming DTOs first, then use
//! [`require_text`] / [`optional_text`] to normalise free-text fields
//! before they reach a repository.

use validator::ValidationErrors;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Length limits (mirror the VARCHAR sizes in the schema)
// ---------------------------------------------------------------------------

/// Maximum length of `users.display_name`.
pub const MAX_DISPLAY_NAME_LEN: usize = 50;

/// Maximum length of `projects.name`.
pub const MAX_PROJECT_NAME_LEN: usize = 100;

/// Maximum length of `tasks.title`.
pub const MAX_TASK_TITLE_LEN: usize = 100;

// ---------------------------------------------------------------------------
// Text fields
// ---------------------------------------------------------------------------

/// Trim a required text field and check it is non-empty and at most
/// `max_chars` characters long. Returns the trimmed value.
pub fn require_text(field: &str, value: &str, max_chars: usize) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    let len = trimmed.chars().count();
    if len > max_chars {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {max_chars} characters, got {len}"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field. Blank input collapses to `None`.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// validator integration
// ---------------------------------------------------------------------------

/// Flatten `validator` errors into a single, stable message
/// (`field: reason; field: reason`, sorted by field name).
pub fn describe_validation_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let reasons: Vec<String> = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            format!("{field}: {}", reasons.join(", "))
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

impl From<ValidationErrors> for CoreError {
    fn from(errors: ValidationErrors) -> Self {
        CoreError::Validation(describe_validation_errors(&errors))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
