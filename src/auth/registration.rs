//! User registration.
//!
//! Registering creates the user row and its profile. The profile insert is
//! compensated rather than wrapped in a transaction: if it fails, the user
//! row is removed again.

use thiserror::Error;
use tracing::{info, warn};

use crate::auth::profile::{Profile, ProfileRepository};
use crate::auth::validation::{
    validate_address, validate_email, validate_name, validate_username, ValidationError,
};
use crate::auth::{hash_password, PasswordError};
use crate::db::{Database, NewUser, User, UserRepository};
use crate::VaultError;

/// Registration-specific errors.
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("username already exists")]
    UsernameExists,

    #[error("{0}")]
    Password(#[from] PasswordError),

    #[error("database error: {0}")]
    Database(String),
}

impl From<RegistrationError> for VaultError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Validation(e) => e.into(),
            RegistrationError::UsernameExists => VaultError::Conflict(err.to_string()),
            RegistrationError::Password(e) => e.into(),
            RegistrationError::Database(msg) => VaultError::Database(msg),
        }
    }
}

/// Registration request data.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    /// Desired username (3-32 characters: letters, digits, `_ . -`).
    pub username: String,
    /// Password (8-128 characters).
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Initial profile address.
    pub address: Option<String>,
}

impl RegistrationRequest {
    /// Create a new registration request.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            email: email.into(),
            first_name: String::new(),
            last_name: String::new(),
            address: None,
        }
    }

    /// Set first and last name.
    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    /// Set the profile address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    fn validate(&self) -> Result<(), RegistrationError> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;
        validate_name(&self.first_name)?;
        validate_name(&self.last_name)?;
        if let Some(address) = &self.address {
            validate_address(address)?;
        }
        Ok(())
    }
}

/// Register a new user and create their profile.
///
/// Returns the user and the fresh profile (status "Pending").
pub async fn register(
    db: &Database,
    request: RegistrationRequest,
) -> Result<(User, Profile), RegistrationError> {
    request.validate()?;

    let users = UserRepository::new(db.pool());
    if users
        .username_exists(&request.username)
        .await
        .map_err(|e| RegistrationError::Database(e.to_string()))?
    {
        return Err(RegistrationError::UsernameExists);
    }

    let password_hash = hash_password(&request.password)?;

    let new_user = NewUser::new(&request.username, password_hash)
        .with_email(&request.email)
        .with_name(&request.first_name, &request.last_name);

    // A concurrent registration can take the name after the check above.
    let user = users.create(&new_user).await.map_err(|e| match e {
        VaultError::Conflict(_) => RegistrationError::UsernameExists,
        e => RegistrationError::Database(e.to_string()),
    })?;

    let address = request
        .address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty());
    let profile = match ProfileRepository::new(db.pool())
        .create(user.id, address)
        .await
    {
        Ok(profile) => profile,
        Err(e) => {
            if let Err(cleanup) = users.delete(user.id).await {
                warn!(user_id = user.id, error = %cleanup, "Failed to remove user without profile");
            }
            return Err(RegistrationError::Database(e.to_string()));
        }
    };

    info!(
        username = %user.username,
        user_id = user.id,
        "New user registered"
    );

    Ok((user, profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;

    fn request(username: &str) -> RegistrationRequest {
        RegistrationRequest::new(username, "password123", format!("{username}@example.com"))
    }

    #[tokio::test]
    async fn test_register_creates_user_and_profile() {
        let db = Database::open_in_memory().await.unwrap();

        let (user, profile) = register(
            &db,
            request("dave").with_name("Dave", "Jones").with_address("Nagoya"),
        )
        .await
        .unwrap();

        assert_eq!(user.username, "dave");
        assert_eq!(user.email, "dave@example.com");
        assert_eq!(user.first_name, "Dave");
        assert!(!user.is_staff);
        assert!(verify_password("password123", &user.password).is_ok());

        assert_eq!(profile.user_id, user.id);
        assert_eq!(profile.address.as_deref(), Some("Nagoya"));
        assert_eq!(profile.status, "Pending");
    }

    #[tokio::test]
    async fn test_register_blank_address_stored_as_none() {
        let db = Database::open_in_memory().await.unwrap();

        let (_, profile) = register(&db, request("erin").with_address("  "))
            .await
            .unwrap();
        assert!(profile.address.is_none());
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let db = Database::open_in_memory().await.unwrap();
        register(&db, request("frank")).await.unwrap();

        let result = register(&db, request("FRANK")).await;
        assert!(matches!(result, Err(RegistrationError::UsernameExists)));
        assert!(matches!(
            VaultError::from(result.unwrap_err()),
            VaultError::Conflict(_)
        ));
    }

    #[tokio::test]
    async fn test_register_same_name_concurrently() {
        let db = Database::open_in_memory().await.unwrap();

        let (first, second) = tokio::join!(
            register(&db, request("heidi")),
            register(&db, request("HEIDI"))
        );

        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(RegistrationError::UsernameExists))));
    }

    #[tokio::test]
    async fn test_register_validation_errors() {
        let db = Database::open_in_memory().await.unwrap();

        let result = register(&db, request("ab")).await;
        assert!(matches!(
            result,
            Err(RegistrationError::Validation(ValidationError::UsernameTooShort))
        ));

        let result = register(&db, RegistrationRequest::new("grace", "password123", "nope")).await;
        assert!(matches!(
            result,
            Err(RegistrationError::Validation(ValidationError::EmailInvalidFormat))
        ));

        let result = register(
            &db,
            RegistrationRequest::new("grace", "short", "grace@example.com"),
        )
        .await;
        assert!(matches!(
            result,
            Err(RegistrationError::Password(PasswordError::TooShort))
        ));

        assert!(!UserRepository::new(db.pool())
            .username_exists("grace")
            .await
            .unwrap());
    }
}
