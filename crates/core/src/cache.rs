//! Session cache
//!
//! A denormalized JSON snapshot of the signed-in user and their folders.
//! The store stays authoritative: every write is built from a store query
//! and replaces the whole file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::atomic::write_atomic;
use crate::error::{Error, Result};
use crate::models::{FolderRegistration, User};

/// Timestamp layout used for `created_at`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One cached folder entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedFolder {
    pub name: String,
    pub path: String,
}

impl From<&FolderRegistration> for CachedFolder {
    fn from(folder: &FolderRegistration) -> Self {
        Self {
            name: folder.folder_name.clone(),
            path: folder.folder_path.clone(),
        }
    }
}

/// Snapshot of the active session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCache {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    /// Stored credential (PHC string), compared verbatim against the store
    #[serde(rename = "password")]
    pub password_hash: String,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub folders: Vec<CachedFolder>,
}

impl SessionCache {
    /// Fresh snapshot of `user` and their registrations, stamped now
    pub fn snapshot(user: &User, folders: &[FolderRegistration]) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            created_at: Local::now().naive_local(),
            folders: folders.iter().map(CachedFolder::from).collect(),
        }
    }
}

/// The cache file on disk
#[derive(Debug, Clone)]
pub struct SessionCacheFile {
    path: PathBuf,
}

impl SessionCacheFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the snapshot; `None` when no cache has been written yet
    ///
    /// Any other read failure counts as corruption.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<Option<SessionCache>> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::CacheCorruption(format!("unreadable: {e}"))),
        };

        if raw.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::CacheCorruption("cache file is empty".into()));
        }

        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|e| Error::CacheCorruption(e.to_string()))
    }

    /// Replace the whole cache file with `cache`
    #[instrument(skip(self, cache), fields(user_id = cache.user_id))]
    pub fn write(&self, cache: &SessionCache) -> Result<()> {
        let json = serde_json::to_string_pretty(cache)?;
        write_atomic(&self.path, json.as_bytes())?;
        debug!(folders = cache.folders.len(), "Session cache written");
        Ok(())
    }

    /// Remove the cache file if present
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    fn user() -> User {
        User {
            id: 7,
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "$argon2id$stub".into(),
            created_at: Utc::now(),
        }
    }

    fn folder(id: i64, name: &str, path: &str) -> FolderRegistration {
        FolderRegistration {
            id,
            owner_id: 7,
            folder_name: name.into(),
            folder_path: path.into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_missing_cache_is_none() {
        let dir = tempdir().unwrap();
        let file = SessionCacheFile::new(dir.path().join("config.json"));
        assert!(!file.exists());
        assert_eq!(file.load().unwrap(), None);
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempdir().unwrap();
        let file = SessionCacheFile::new(dir.path().join("config.json"));
        let cache = SessionCache::snapshot(&user(), &[folder(1, "reports", "/data/reports")]);

        file.write(&cache).unwrap();
        let loaded = file.load().unwrap().unwrap();

        assert_eq!(loaded.user_id, 7);
        assert_eq!(loaded.folders, cache.folders);
        // Second precision on disk
        assert_eq!(
            loaded.created_at.format(TIMESTAMP_FORMAT).to_string(),
            cache.created_at.format(TIMESTAMP_FORMAT).to_string()
        );
    }

    #[test]
    fn test_on_disk_layout() {
        let dir = tempdir().unwrap();
        let file = SessionCacheFile::new(dir.path().join("config.json"));
        file.write(&SessionCache::snapshot(&user(), &[])).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(value["user_id"], 7);
        assert_eq!(value["password"], "$argon2id$stub");
        assert_eq!(value["folders"], serde_json::json!([]));
        let stamp = value["created_at"].as_str().unwrap();
        assert!(NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn test_garbage_is_corruption() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let file = SessionCacheFile::new(&path);

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(file.load(), Err(Error::CacheCorruption(_))));

        fs::write(&path, "").unwrap();
        assert!(matches!(file.load(), Err(Error::CacheCorruption(_))));
    }

    #[test]
    fn test_folders_key_may_be_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"user_id": 3, "username": "bob", "email": "bob@example.com",
                "password": "x", "created_at": "2024-03-01 09:30:00"}"#,
        )
        .unwrap();

        let cache = SessionCacheFile::new(&path).load().unwrap().unwrap();
        assert!(cache.folders.is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_corruption() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, [0xff, 0xfe, 0x80]).unwrap();

        assert!(matches!(
            SessionCacheFile::new(&path).load(),
            Err(Error::CacheCorruption(_))
        ));
    }

    #[test]
    fn test_directory_in_place_is_corruption() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::create_dir(&path).unwrap();

        assert!(matches!(
            SessionCacheFile::new(&path).load(),
            Err(Error::CacheCorruption(_))
        ));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempdir().unwrap();
        let file = SessionCacheFile::new(dir.path().join("config.json"));
        file.write(&SessionCache::snapshot(&user(), &[])).unwrap();

        file.clear().unwrap();
        file.clear().unwrap();
        assert!(!file.exists());
    }
}
