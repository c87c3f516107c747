//! Utility modules for Quest Runner
//!
//! This module contains shared utilities used across the codebase.

pub mod json;
pub mod paths;

pub use json::{safe_parse_json, safe_parse_str};
pub use paths::{normalize_path_id, same_executable};
