//! Input checks performed before a form is sent to the backend.

use crate::error::CoreError;

/// Maximum length of a personnel number (backend column width).
pub const MAX_SUBJECT_ID_LEN: usize = 20;

/// Maximum length of a display name (backend column width).
pub const MAX_NAME_LEN: usize = 50;

/// Validate a binding subject / personnel number.
///
/// The value is interpolated into `/check_status/{id}`, so path
/// separators and whitespace are rejected along with empty input.
pub fn validate_subject_id(subject_id: &str) -> Result<(), CoreError> {
    if subject_id.trim().is_empty() {
        return Err(CoreError::Validation("Student ID must not be empty".into()));
    }
    if subject_id.len() > MAX_SUBJECT_ID_LEN {
        return Err(CoreError::Validation(format!(
            "Student ID must be at most {MAX_SUBJECT_ID_LEN} characters"
        )));
    }
    if subject_id
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '%'))
    {
        return Err(CoreError::Validation(
            "Student ID must not contain whitespace or URL delimiters".into(),
        ));
    }
    Ok(())
}

/// Validate that a required text field is present.
pub fn validate_required(field: &'static str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Validate a person's display name.
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    validate_required("Name", name)?;
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Loose e-mail shape check: one `@` with text on both sides and a dot in
/// the domain. Empty input is accepted because the field is optional.
pub fn validate_optional_email(email: Option<&str>) -> Result<(), CoreError> {
    let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) else {
        return Ok(());
    };
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.contains('@')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("'{email}' is not a valid e-mail address")))
    }
}

/// Trim an optional form field, mapping blank input to `None`.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn subject_id_rules() {
        assert!(validate_subject_id("S12345").is_ok());
        assert_matches!(validate_subject_id(""), Err(CoreError::Validation(_)));
        assert_matches!(validate_subject_id("   "), Err(CoreError::Validation(_)));
        assert_matches!(validate_subject_id("a/b"), Err(CoreError::Validation(_)));
        assert_matches!(validate_subject_id("S 1"), Err(CoreError::Validation(_)));
        assert_matches!(
            validate_subject_id(&"9".repeat(MAX_SUBJECT_ID_LEN + 1)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn name_rules() {
        assert!(validate_name("Lin Mei").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn email_is_optional_but_checked() {
        assert!(validate_optional_email(None).is_ok());
        assert!(validate_optional_email(Some("  ")).is_ok());
        assert!(validate_optional_email(Some("ada@example.com")).is_ok());
        assert!(validate_optional_email(Some("ada.example.com")).is_err());
        assert!(validate_optional_email(Some("@example.com")).is_err());
        assert!(validate_optional_email(Some("ada@localhost")).is_err());
    }

    #[test]
    fn non_blank_trims() {
        assert_eq!(non_blank(Some("  fob ")), Some("fob".to_string()));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
