//! User validation utilities

use thiserror::Error;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("User ID cannot be empty")]
    EmptyId,

    #[error("User ID exceeds maximum length of {0} characters")]
    IdTooLong(usize),

    #[error("User ID must start with a letter or number")]
    InvalidIdStart,

    #[error("User ID must end with a letter or number")]
    InvalidIdEnd,

    #[error("User ID contains invalid character: '{0}'. Only alphanumeric characters and hyphens are allowed")]
    InvalidIdCharacter(char),

    #[error("User ID cannot contain consecutive hyphens")]
    ConsecutiveHyphens,

    #[error("Email is required")]
    EmptyEmail,

    #[error("Email address is not valid")]
    InvalidEmail,

    #[error("Username is required")]
    EmptyHandle,

    #[error("Username is too short. Minimum length is {0} characters")]
    HandleTooShort(usize),

    #[error("Username exceeds maximum length of {0} characters")]
    HandleTooLong(usize),

    #[error("Username contains a control character")]
    InvalidHandleCharacter,

    #[error("Password is too short. Minimum length is {0} characters")]
    PasswordTooShort(usize),

    #[error("Password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),
}

const MAX_USER_ID_LENGTH: usize = 50;
const MAX_EMAIL_LENGTH: usize = 254;
const MIN_HANDLE_LENGTH: usize = 3;
const MAX_HANDLE_LENGTH: usize = 50;
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

/// Validate a user ID
///
/// Rules:
/// - Cannot be empty
/// - Maximum 50 characters
/// - Only alphanumeric characters and hyphens
/// - Must start and end with alphanumeric
/// - No consecutive hyphens
pub fn validate_user_id(id: &str) -> Result<(), UserValidationError> {
    if id.is_empty() {
        return Err(UserValidationError::EmptyId);
    }

    if id.len() > MAX_USER_ID_LENGTH {
        return Err(UserValidationError::IdTooLong(MAX_USER_ID_LENGTH));
    }

    let chars: Vec<char> = id.chars().collect();

    if !chars[0].is_ascii_alphanumeric() {
        return Err(UserValidationError::InvalidIdStart);
    }

    if !chars[chars.len() - 1].is_ascii_alphanumeric() {
        return Err(UserValidationError::InvalidIdEnd);
    }

    let mut prev_hyphen = false;

    for c in &chars {
        if *c == '-' {
            if prev_hyphen {
                return Err(UserValidationError::ConsecutiveHyphens);
            }
            prev_hyphen = true;
        } else if c.is_ascii_alphanumeric() {
            prev_hyphen = false;
        } else {
            return Err(UserValidationError::InvalidIdCharacter(*c));
        }
    }

    Ok(())
}

/// Validate a login email
///
/// Only the shape is checked: one `@`, a non-empty local part and a dotted domain.
/// Deliverability is proven by the verification email.
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email.trim().is_empty() {
        return Err(UserValidationError::EmptyEmail);
    }

    if email.len() > MAX_EMAIL_LENGTH || email.chars().any(char::is_whitespace) {
        return Err(UserValidationError::InvalidEmail);
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or(UserValidationError::InvalidEmail)?;

    let domain_ok = !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.');

    if local.is_empty() || !domain_ok {
        return Err(UserValidationError::InvalidEmail);
    }

    Ok(())
}

/// Validate a display handle
///
/// Rules:
/// - Cannot be blank
/// - 3 to 50 characters
/// - No control characters
pub fn validate_handle(handle: &str) -> Result<(), UserValidationError> {
    let trimmed = handle.trim();

    if trimmed.is_empty() {
        return Err(UserValidationError::EmptyHandle);
    }

    let len = trimmed.chars().count();

    if len < MIN_HANDLE_LENGTH {
        return Err(UserValidationError::HandleTooShort(MIN_HANDLE_LENGTH));
    }

    if len > MAX_HANDLE_LENGTH {
        return Err(UserValidationError::HandleTooLong(MAX_HANDLE_LENGTH));
    }

    if trimmed.chars().any(char::is_control) {
        return Err(UserValidationError::InvalidHandleCharacter);
    }

    Ok(())
}

/// Validate a password
///
/// Rules:
/// - Minimum 8 characters
/// - Maximum 128 characters
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_user_ids() {
        assert!(validate_user_id("admin").is_ok());
        assert!(validate_user_id("user-1").is_ok());
        assert!(validate_user_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
    }

    #[test]
    fn test_user_id_rules() {
        assert_eq!(validate_user_id(""), Err(UserValidationError::EmptyId));
        assert_eq!(
            validate_user_id(&"a".repeat(51)),
            Err(UserValidationError::IdTooLong(50))
        );
        assert_eq!(
            validate_user_id("user_name"),
            Err(UserValidationError::InvalidIdCharacter('_'))
        );
        assert_eq!(
            validate_user_id("user--name"),
            Err(UserValidationError::ConsecutiveHyphens)
        );
    }

    #[test]
    fn test_valid_emails() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("first.last+tag@mail.example.org").is_ok());
    }

    #[test]
    fn test_invalid_emails() {
        assert_eq!(validate_email(""), Err(UserValidationError::EmptyEmail));
        assert_eq!(validate_email("no-at-sign"), Err(UserValidationError::InvalidEmail));
        assert_eq!(validate_email("@example.com"), Err(UserValidationError::InvalidEmail));
        assert_eq!(validate_email("a@localhost"), Err(UserValidationError::InvalidEmail));
        assert_eq!(validate_email("a b@example.com"), Err(UserValidationError::InvalidEmail));
        assert_eq!(validate_email("a@b@example.com"), Err(UserValidationError::InvalidEmail));
    }

    #[test]
    fn test_handles() {
        assert!(validate_handle("Ada Lovelace").is_ok());
        assert_eq!(validate_handle("   "), Err(UserValidationError::EmptyHandle));
        assert_eq!(validate_handle("ab"), Err(UserValidationError::HandleTooShort(3)));
        assert_eq!(
            validate_handle(&"x".repeat(51)),
            Err(UserValidationError::HandleTooLong(50))
        );
        assert_eq!(
            validate_handle("bad\u{0007}name"),
            Err(UserValidationError::InvalidHandleCharacter)
        );
    }

    #[test]
    fn test_passwords() {
        assert!(validate_password("password123").is_ok());
        assert_eq!(
            validate_password("1234567"),
            Err(UserValidationError::PasswordTooShort(8))
        );
        assert_eq!(
            validate_password(&"a".repeat(129)),
            Err(UserValidationError::PasswordTooLong(128))
        );
    }
}
