//! Core types, error taxonomy, and validation for the browsing history service.

pub mod aggregate;
pub mod auth;
pub mod catalog;
pub mod error;
pub mod history;
pub mod limits;

pub use aggregate::*;
pub use auth::*;
pub use catalog::*;
pub use error::{Error, Result};
pub use error::{AuthErrorCode, DbErrorCode};
pub use history::*;
