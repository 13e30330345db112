//! Input validation for user registration.

use thiserror::Error;

use crate::VaultError;

/// Minimum username length.
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Maximum username length.
pub const MAX_USERNAME_LENGTH: usize = 32;

/// Maximum first/last name length.
pub const MAX_NAME_LENGTH: usize = 150;

/// Maximum email length.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum profile address length.
pub const MAX_ADDRESS_LENGTH: usize = 255;

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("username must be at least {MIN_USERNAME_LENGTH} characters")]
    UsernameTooShort,

    #[error("username must be at most {MAX_USERNAME_LENGTH} characters")]
    UsernameTooLong,

    #[error("username can only contain letters, digits, '_', '.' and '-'")]
    UsernameInvalidChars,

    #[error("name must be at most {MAX_NAME_LENGTH} characters")]
    NameTooLong,

    #[error("email must be at most {MAX_EMAIL_LENGTH} characters")]
    EmailTooLong,

    #[error("invalid email format")]
    EmailInvalidFormat,

    #[error("address must be at most {MAX_ADDRESS_LENGTH} characters")]
    AddressTooLong,
}

impl From<ValidationError> for VaultError {
    fn from(err: ValidationError) -> Self {
        VaultError::Validation(err.to_string())
    }
}

/// Validate a username.
///
/// # Examples
///
/// ```
/// use docvault::auth::validation::validate_username;
///
/// assert!(validate_username("jane.doe").is_ok());
/// assert!(validate_username("ab").is_err());
/// assert!(validate_username("jane doe").is_err());
/// ```
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    if len < MIN_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooShort);
    }
    if len > MAX_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooLong);
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(ValidationError::UsernameInvalidChars);
    }

    Ok(())
}

/// Validate a first or last name. Empty is allowed.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong);
    }
    Ok(())
}

/// Validate an email address.
///
/// Only the shape is checked: one `@`, a non-empty local part and a dotted
/// domain without empty labels or whitespace.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::EmailTooLong);
    }

    if email.chars().any(char::is_whitespace) {
        return Err(ValidationError::EmailInvalidFormat);
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::EmailInvalidFormat);
    };

    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(ValidationError::EmailInvalidFormat);
    }

    if domain.split('.').any(str::is_empty) {
        return Err(ValidationError::EmailInvalidFormat);
    }

    Ok(())
}

/// Validate a profile address. Empty is allowed.
pub fn validate_address(address: &str) -> Result<(), ValidationError> {
    if address.chars().count() > MAX_ADDRESS_LENGTH {
        return Err(ValidationError::AddressTooLong);
    }
    Ok(())
}
