pub mod auth;
pub mod contact;
pub mod extract;
pub mod gallery;
pub mod references;

use crate::error::CmsError;

/// Reject a field value longer than `max` characters.
pub(crate) fn check_len(label: &str, value: Option<&str>, max: usize) -> Result<(), CmsError> {
    match value {
        Some(v) if v.chars().count() > max => Err(CmsError::Validation(format!(
            "{label} must be less than {max} characters"
        ))),
        _ => Ok(()),
    }
}

/// Reject a missing or blank required field.
pub(crate) fn require(label: &str, value: Option<&str>) -> Result<(), CmsError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(CmsError::Validation(format!("{label} is required"))),
    }
}

/// Pragmatic email well-formedness check: exactly one `@`, both sides
/// non-empty, no whitespace.
pub(crate) fn check_email(value: &str) -> Result<(), CmsError> {
    let mut parts = value.split('@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    let well_formed = !local.is_empty()
        && !domain.is_empty()
        && parts.next().is_none()
        && !value.chars().any(char::is_whitespace);

    if well_formed {
        Ok(())
    } else {
        Err(CmsError::Validation(
            "Please provide a valid email address".to_string(),
        ))
    }
}
