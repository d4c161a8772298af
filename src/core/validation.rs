//! Input validation for cellar operations.
//!
//! Validates secret names and directory names before they reach storage.

use crate::core::constants::{RECIPIENTS_FILE, SECRET_EXTENSION};
use crate::error::{Result, ValidationError};

/// Validate a secret name.
///
/// Secret names are `/`-separated relative paths:
/// - Cannot be empty, start or end with `/`, or contain empty components
/// - Cannot contain `.` or `..` components, backslashes or NUL bytes
/// - The final component cannot be the recipient file or carry the
///   secret extension
///
/// # Errors
///
/// Returns `ValidationError` if the name is invalid.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName.into());
    }

    check_components(name)?;

    // Safe: check_components rejected empty components, so there is a last one
    let base = name.rsplit('/').next().unwrap_or(name);
    if base == RECIPIENTS_FILE {
        return Err(invalid(name, "reserved for the recipient set"));
    }
    if base.ends_with(SECRET_EXTENSION) {
        return Err(invalid(
            name,
            &format!("cannot end with '{}'", SECRET_EXTENSION),
        ));
    }

    Ok(())
}

/// Validate a directory name and normalize it.
///
/// The empty string and `"."` both denote the store root and normalize to
/// the empty string. Anything else follows the component rules of
/// [`validate_name`].
///
/// # Errors
///
/// Returns `ValidationError` if the directory name is invalid.
pub fn validate_dir(dir: &str) -> Result<String> {
    if dir.is_empty() || dir == "." {
        return Ok(String::new());
    }

    check_components(dir)?;
    Ok(dir.to_string())
}

fn check_components(name: &str) -> Result<()> {
    if name.contains('\0') {
        return Err(invalid(name, "contains a NUL byte"));
    }
    if name.contains('\\') {
        return Err(invalid(name, "use '/' as the separator"));
    }
    if name.starts_with('/') {
        return Err(invalid(name, "must be relative"));
    }
    if name.ends_with('/') {
        return Err(invalid(name, "cannot end with '/'"));
    }

    for component in name.split('/') {
        match component {
            "" => return Err(invalid(name, "contains an empty component")),
            "." | ".." => {
                return Err(invalid(
                    name,
                    &format!("'{}' components are not allowed", component),
                ))
            }
            _ => {}
        }
    }

    Ok(())
}

fn invalid(name: &str, reason: &str) -> crate::error::Error {
    ValidationError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(validate_name("github").is_ok());
        assert!(validate_name("web/github").is_ok());
        assert!(validate_name("db/prod/Password.1").is_ok());
        assert!(validate_name(".hidden").is_ok());
    }

    #[test]
    fn test_empty_name() {
        assert!(matches!(
            validate_name(""),
            Err(crate::error::Error::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn test_rejects_bad_separators() {
        assert!(validate_name("/abs").is_err());
        assert!(validate_name("trailing/").is_err());
        assert!(validate_name("a//b").is_err());
        assert!(validate_name("a\\b").is_err());
    }

    #[test]
    fn test_rejects_relative_components() {
        assert!(validate_name("../escape").is_err());
        assert!(validate_name("a/./b").is_err());
        assert!(validate_name("a/..").is_err());
    }

    #[test]
    fn test_rejects_reserved_names() {
        assert!(validate_name(".age-id").is_err());
        assert!(validate_name("sub/.age-id").is_err());
        assert!(validate_name("double.age").is_err());
    }

    #[test]
    fn test_rejects_nul() {
        assert!(validate_name("a\0b").is_err());
    }

    #[test]
    fn test_dir_root_forms() {
        assert_eq!(validate_dir("").unwrap(), "");
        assert_eq!(validate_dir(".").unwrap(), "");
        assert_eq!(validate_dir("web/mail").unwrap(), "web/mail");
        assert!(validate_dir("../up").is_err());
    }
}
