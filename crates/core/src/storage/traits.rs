//! Storage repository traits
//!
//! These traits define the storage interface the identity service and
//! folder registry are written against.

use crate::error::Result;
use crate::models::{FolderRegistration, NewUser, User};

/// User repository operations
pub trait UserRepository {
    /// Insert a user and return it with its store-assigned id
    fn create_user(&self, user: &NewUser) -> Result<User>;

    /// Find user by ID
    fn find_user_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Find user by username
    fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Find user by email
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Find user by username and email together
    fn find_user_by_username_and_email(&self, username: &str, email: &str)
        -> Result<Option<User>>;

    /// Exact match on the full identity
    fn find_user_by_identity(
        &self,
        id: i64,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<User>>;
}

/// Folder registration repository operations
pub trait FolderRepository {
    /// Insert a registration
    fn create_folder(
        &self,
        owner_id: i64,
        folder_name: &str,
        folder_path: &str,
    ) -> Result<FolderRegistration>;

    /// Whether the owner already registered this path
    fn folder_exists(&self, owner_id: i64, folder_path: &str) -> Result<bool>;

    /// All registrations for an owner, in store order
    fn list_folders(&self, owner_id: i64) -> Result<Vec<FolderRegistration>>;
}
