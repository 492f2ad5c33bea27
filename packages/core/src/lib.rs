// ABOUTME: Core constants and utilities for Planea
// ABOUTME: Foundational package providing shared functionality across all Planea packages

pub mod constants;
pub mod utils;

// Re-export constants
pub use constants::{database_path, planea_dir, uploads_dir};

// Re-export utilities
pub use utils::{generate_id, normalize_email, path_exists};
