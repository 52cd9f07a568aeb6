//! User storage operations

use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode};
use tracing::instrument;

use super::parse::{user_from_row, OptionalExt};
use crate::error::{Error, Result};
use crate::models::{NewUser, User};

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at";

pub struct UserStore<'a> {
    conn: &'a Connection,
}

impl<'a> UserStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a user; the store assigns the id
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub fn create(&self, user: &NewUser) -> Result<User> {
        let created_at = Utc::now();
        let inserted = self.conn.execute(
            "INSERT INTO users (username, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                user.username,
                user.email,
                user.password_hash,
                created_at.to_rfc3339(),
            ],
        );

        match inserted {
            Ok(_) => Ok(User {
                id: self.conn.last_insert_rowid(),
                username: user.username.clone(),
                email: user.email.clone(),
                password_hash: user.password_hash.clone(),
                created_at,
            }),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(Error::Duplicate(format!(
                    "username '{}' or email '{}' is taken",
                    user.username, user.email
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Find user by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        self.find_one("id = ?1", params![id])
    }

    /// Find user by username
    #[instrument(skip(self))]
    pub fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.find_one("username = ?1", params![username])
    }

    /// Find user by email
    #[instrument(skip(self))]
    pub fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find_one("email = ?1", params![email])
    }

    /// Find the user matching username and email together
    #[instrument(skip(self))]
    pub fn find_by_username_and_email(&self, username: &str, email: &str) -> Result<Option<User>> {
        self.find_one("username = ?1 AND email = ?2", params![username, email])
    }

    /// Exact match on every identity field, as mirrored into the session cache
    #[instrument(skip(self, password_hash))]
    pub fn find_by_identity(
        &self,
        id: i64,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<User>> {
        self.find_one(
            "id = ?1 AND username = ?2 AND email = ?3 AND password_hash = ?4",
            params![id, username, email, password_hash],
        )
    }

    /// Number of stored users
    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn find_one(&self, predicate: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {predicate}");
        let mut stmt = self.conn.prepare(&sql)?;
        let user = stmt.query_row(params, user_from_row).optional()?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    fn alice() -> NewUser {
        NewUser::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "phc-alice".to_string(),
        )
    }

    #[test]
    fn test_create_assigns_distinct_ids() {
        let db = Database::open_in_memory().unwrap();
        let users = db.users();

        let a = users.create(&alice()).unwrap();
        let b = users
            .create(&NewUser::new(
                "bob".to_string(),
                "bob@example.com".to_string(),
                "phc-bob".to_string(),
            ))
            .unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(users.count().unwrap(), 2);
        assert_eq!(users.find_by_id(a.id).unwrap(), Some(a));
    }

    #[test]
    fn test_duplicate_username_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let users = db.users();
        users.create(&alice()).unwrap();

        let clash = NewUser::new(
            "alice".to_string(),
            "other@example.com".to_string(),
            "phc".to_string(),
        );
        assert!(matches!(users.create(&clash), Err(Error::Duplicate(_))));
        assert_eq!(users.count().unwrap(), 1);
    }

    #[test]
    fn test_find_by_identity_requires_every_field() {
        let db = Database::open_in_memory().unwrap();
        let users = db.users();
        let user = users.create(&alice()).unwrap();

        assert!(users
            .find_by_identity(user.id, "alice", "alice@example.com", "phc-alice")
            .unwrap()
            .is_some());
        assert!(users
            .find_by_identity(user.id, "alice", "alice@example.com", "tampered")
            .unwrap()
            .is_none());
        assert!(users
            .find_by_identity(user.id + 1, "alice", "alice@example.com", "phc-alice")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_lookups_by_name_and_email() {
        let db = Database::open_in_memory().unwrap();
        let users = db.users();
        users.create(&alice()).unwrap();

        assert!(users.find_by_username("alice").unwrap().is_some());
        assert!(users.find_by_email("alice@example.com").unwrap().is_some());
        assert!(users
            .find_by_username_and_email("alice", "bob@example.com")
            .unwrap()
            .is_none());
        assert!(users.find_by_username("nobody").unwrap().is_none());
    }
}
