//! Append-only audit trail.
//!
//! Two kinds of entries are kept:
//! - [`AuditLog`]: free-form records posted by clients (up to four text fields).
//! - [`SystemLog`]: records written by the server itself, e.g. when a blob
//!   could not be removed during a delete.
//!
//! Entries are never updated or deleted.

mod repository;

pub use repository::{AuditLog, LogRepository, NewAuditLog, SystemLog};
