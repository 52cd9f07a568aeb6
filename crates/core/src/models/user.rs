//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identity
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Argon2id PHC string
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A user row about to be inserted
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            username,
            email,
            password_hash,
        }
    }
}
