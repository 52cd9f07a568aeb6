//! SQLite storage layer for Encrypto

mod folders;
mod migrations;
mod parse;
mod traits;
mod users;

use rusqlite::Connection;
use std::path::Path;
use tracing::instrument;

use crate::error::Result;
use crate::models::{FolderRegistration, NewUser, User};

pub use folders::FolderStore;
pub use traits::{FolderRepository, UserRepository};
pub use users::UserStore;

/// Main database handle
///
/// Services open one per logical operation and drop it when done, so no
/// connection outlives a prompt.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initialize database schema via migrations
    fn init(&self) -> Result<()> {
        migrations::run_migrations(&self.conn)
    }

    /// Get current schema version
    pub fn schema_version(&self) -> Result<u32> {
        migrations::current_version(&self.conn)
    }

    /// Get user store
    pub fn users(&self) -> UserStore<'_> {
        UserStore::new(&self.conn)
    }

    /// Get folder store
    pub fn folders(&self) -> FolderStore<'_> {
        FolderStore::new(&self.conn)
    }
}

impl UserRepository for Database {
    fn create_user(&self, user: &NewUser) -> Result<User> {
        self.users().create(user)
    }

    fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.users().find_by_id(id)
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.users().find_by_username(username)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.users().find_by_email(email)
    }

    fn find_user_by_username_and_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>> {
        self.users().find_by_username_and_email(username, email)
    }

    fn find_user_by_identity(
        &self,
        id: i64,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<User>> {
        self.users()
            .find_by_identity(id, username, email, password_hash)
    }
}

impl FolderRepository for Database {
    fn create_folder(
        &self,
        owner_id: i64,
        folder_name: &str,
        folder_path: &str,
    ) -> Result<FolderRegistration> {
        self.folders().create(owner_id, folder_name, folder_path)
    }

    fn folder_exists(&self, owner_id: i64, folder_path: &str) -> Result<bool> {
        self.folders().exists(owner_id, folder_path)
    }

    fn list_folders(&self, owner_id: i64) -> Result<Vec<FolderRegistration>> {
        self.folders().list_for_owner(owner_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_database_persists_across_opens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.db");

        let id = {
            let db = Database::open(&path).unwrap();
            db.create_user(&NewUser::new(
                "alice".to_string(),
                "alice@example.com".to_string(),
                "phc".to_string(),
            ))
            .unwrap()
            .id
        };

        let db = Database::open(&path).unwrap();
        assert_eq!(db.schema_version().unwrap(), 2);
        let user = db.find_user_by_id(id).unwrap().unwrap();
        assert_eq!(user.username, "alice");
    }
}
