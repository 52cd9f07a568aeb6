//! Folder registration storage

use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode};
use tracing::instrument;

use super::parse::folder_from_row;
use crate::error::{Error, Result};
use crate::models::FolderRegistration;

pub struct FolderStore<'a> {
    conn: &'a Connection,
}

impl<'a> FolderStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Register a folder for an owner
    #[instrument(skip(self))]
    pub fn create(
        &self,
        owner_id: i64,
        folder_name: &str,
        folder_path: &str,
    ) -> Result<FolderRegistration> {
        let created_at = Utc::now();
        let inserted = self.conn.execute(
            "INSERT INTO folders (owner_id, folder_name, folder_path, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![owner_id, folder_name, folder_path, created_at.to_rfc3339()],
        );

        match inserted {
            Ok(_) => Ok(FolderRegistration {
                id: self.conn.last_insert_rowid(),
                owner_id,
                folder_name: folder_name.to_string(),
                folder_path: folder_path.to_string(),
                created_at,
            }),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(Error::Duplicate(format!(
                    "folder {folder_path} is already registered"
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Whether the owner already registered this path
    #[instrument(skip(self))]
    pub fn exists(&self, owner_id: i64, folder_path: &str) -> Result<bool> {
        let found: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM folders WHERE owner_id = ?1 AND folder_path = ?2)",
            params![owner_id, folder_path],
            |row| row.get(0),
        )?;
        Ok(found)
    }

    /// All registrations for an owner, in insertion order
    #[instrument(skip(self))]
    pub fn list_for_owner(&self, owner_id: i64) -> Result<Vec<FolderRegistration>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner_id, folder_name, folder_path, created_at
             FROM folders
             WHERE owner_id = ?1
             ORDER BY id",
        )?;

        let folders = stmt
            .query_map(params![owner_id], folder_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(folders)
    }

    /// Number of registrations for an owner
    pub fn count_for_owner(&self, owner_id: i64) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM folders WHERE owner_id = ?1",
            params![owner_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    #[test]
    fn test_list_preserves_insertion_order() {
        let db = Database::open_in_memory().unwrap();
        let folders = db.folders();

        folders.create(1, "zeta", "/data/zeta").unwrap();
        folders.create(1, "alpha", "/data/alpha").unwrap();
        folders.create(2, "other", "/data/other").unwrap();

        let names: Vec<_> = folders
            .list_for_owner(1)
            .unwrap()
            .into_iter()
            .map(|f| f.folder_name)
            .collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(folders.count_for_owner(2).unwrap(), 1);
    }

    #[test]
    fn test_exists_is_scoped_per_owner() {
        let db = Database::open_in_memory().unwrap();
        let folders = db.folders();
        folders.create(1, "reports", "/data/reports").unwrap();

        assert!(folders.exists(1, "/data/reports").unwrap());
        assert!(!folders.exists(2, "/data/reports").unwrap());
        assert!(!folders.exists(1, "/data/other").unwrap());
    }

    #[test]
    fn test_second_insert_is_duplicate() {
        let db = Database::open_in_memory().unwrap();
        let folders = db.folders();
        folders.create(1, "reports", "/data/reports").unwrap();

        let again = folders.create(1, "reports", "/data/reports");
        assert!(matches!(again, Err(Error::Duplicate(_))));
        assert_eq!(folders.count_for_owner(1).unwrap(), 1);
    }
}
