use std::env;
use std::path::PathBuf;

/// Get the path to the Planea directory (~/.planea)
pub fn planea_dir() -> PathBuf {
    // First try HOME environment variable (useful for tests)
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".planea")
    } else {
        // Fall back to dirs crate for normal usage
        dirs::home_dir()
            .expect("Unable to get home directory")
            .join(".planea")
    }
}

/// Get the path to the SQLite database file (~/.planea/planea.db)
pub fn database_path() -> PathBuf {
    planea_dir().join("planea.db")
}

/// Get the default directory for locally stored attachments (~/.planea/uploads)
pub fn uploads_dir() -> PathBuf {
    planea_dir().join("uploads")
}
