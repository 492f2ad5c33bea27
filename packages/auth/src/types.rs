use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed role set; no hierarchy, every operation enumerates its own allow-list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Coordinator,
    Professor,
}

impl Role {
    /// Reviewers may approve, reject and request adjustments
    pub fn is_reviewer(self) -> bool {
        matches!(self, Role::Admin | Role::Coordinator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Coordinator => write!(f, "coordinator"),
            Role::Professor => write!(f, "professor"),
        }
    }
}

/// Identity resolved from a verified bearer credential
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub role: Role,
    pub email: String,
    pub name: String,
}
