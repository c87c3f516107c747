//! Repository pattern implementations for database operations
//!
//! This module provides a clean separation between database access and business logic.

pub mod settings_repo;

pub use settings_repo::*;
