use std::env;
use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("Session TTL must be a positive number of hours")]
    InvalidSessionTtl,
}

#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub cors_origin: String,
    pub database_path: Option<PathBuf>,
    pub upload_dir: PathBuf,
    pub session_ttl_hours: i64,
    pub drive_access_token: Option<String>,
    pub drive_folder_id: Option<String>,
    pub calendar_access_token: Option<String>,
    pub calendar_id: Option<String>,
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port_str = env::var("PORT").unwrap_or_else(|_| "4010".to_string());

        let port = port_str.parse::<u16>()?;
        if port == 0 {
            return Err(ConfigError::PortOutOfRange(port));
        }

        let cors_origin =
            env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".to_string());

        let database_path = non_empty("PLANEA_DB_PATH").map(PathBuf::from);

        let upload_dir = non_empty("PLANEA_UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(planea_core::uploads_dir);

        let session_ttl_hours = env::var("SESSION_TTL_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse::<i64>()?;
        if session_ttl_hours <= 0 {
            return Err(ConfigError::InvalidSessionTtl);
        }

        Ok(Config {
            port,
            cors_origin,
            database_path,
            upload_dir,
            session_ttl_hours,
            drive_access_token: non_empty("GOOGLE_DRIVE_ACCESS_TOKEN"),
            drive_folder_id: non_empty("GOOGLE_DRIVE_FOLDER_ID"),
            calendar_access_token: non_empty("GOOGLE_CALENDAR_ACCESS_TOKEN"),
            calendar_id: non_empty("GOOGLE_CALENDAR_ID"),
        })
    }
}
