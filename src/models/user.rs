//! User model
//!
//! Users only author posts and comments and like posts; identity
//! management lives outside this system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of a username
pub const MAX_USERNAME_LENGTH: usize = 150;

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Staff users may author posts
    pub is_staff: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Input for creating a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserInput {
    pub username: String,
    #[serde(default)]
    pub is_staff: bool,
}

impl CreateUserInput {
    pub fn new(username: &str, is_staff: bool) -> Self {
        Self {
            username: username.to_string(),
            is_staff,
        }
    }
}
