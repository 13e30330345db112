//! Authentication module for docvault.
//!
//! This module provides password hashing, input validation, user
//! registration, profile management and account removal. Token issuance
//! lives in the web layer.

mod account;
mod password;
pub mod profile;
mod registration;
pub mod validation;

pub use account::{delete_account, AccountDeleteOutcome};
pub use password::{hash_password, validate_password, verify_password, PasswordError};
pub use profile::{
    Profile, ProfileError, ProfileRepository, ProfileService, ProfileUpdate, ProfileView,
};
pub use registration::{register, RegistrationError, RegistrationRequest};
pub use validation::ValidationError;
