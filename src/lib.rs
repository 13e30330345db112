//! docvault - file management backend
//!
//! Folders of uploaded files with lifecycle states (active, archived,
//! backed up, confidential), user profiles and an append-only audit trail,
//! served over a JSON REST API.

pub mod audit;
pub mod auth;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use auth::{hash_password, register, verify_password, RegistrationRequest};
pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository, UserUpdate};
pub use error::{Result, VaultError};
pub use file::{FileService, FileStorage, FolderService};
pub use web::WebServer;
