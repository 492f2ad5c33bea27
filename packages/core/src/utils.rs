// ABOUTME: Shared utility functions for Planea
// ABOUTME: ID generation, email normalization, path operations

use std::path::Path;
use tokio::fs;
use uuid::Uuid;

/// Generate a unique record ID
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Normalize an email address for storage and lookup
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Checks if a path exists
pub async fn path_exists(path: impl AsRef<Path>) -> bool {
    fs::metadata(path).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_is_unique() {
        let id1 = generate_id();
        let id2 = generate_id();

        assert_ne!(id1, id2);
        // UUID v4 string format: 36 characters with hyphens
        assert_eq!(id1.len(), 36);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana.Lopez@Example.COM "), "ana.lopez@example.com");
        assert_eq!(normalize_email("plain@host"), "plain@host");
    }

    #[tokio::test]
    async fn test_path_exists() {
        assert!(!path_exists("/nonexistent/path").await);
        assert!(path_exists("/tmp").await);
    }
}
