//! Folder registry
//!
//! Registers folders under a user. The store insert and the cache append are
//! separate steps: if the process dies in between, the store wins and the
//! next sign-in rebuilds the cache.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::cache::{CachedFolder, SessionCache, SessionCacheFile};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{default_folder_name, FolderRegistration};
use crate::storage::{Database, FolderRepository, UserRepository};

/// Result of a registration attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered(FolderRegistration),
    /// The owner already has this path; pick another folder
    AlreadyRegistered,
}

/// A file or directory inside a registered folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
    pub size_bytes: u64,
}

pub struct FolderRegistry {
    database_path: PathBuf,
    cache: SessionCacheFile,
}

impl FolderRegistry {
    pub fn new(config: &Config) -> Self {
        Self {
            database_path: config.database_path(),
            cache: SessionCacheFile::new(config.cache_path()),
        }
    }

    /// Register `path` for `owner_id` and mirror it into the session cache
    ///
    /// `display_name` defaults to the final path component.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn register_folder(
        &self,
        path: &Path,
        display_name: Option<&str>,
        owner_id: i64,
    ) -> Result<RegisterOutcome> {
        if !path.is_absolute() {
            return Err(Error::Validation(format!(
                "{} is not an absolute path",
                path.display()
            )));
        }
        let folder_path = path
            .to_str()
            .ok_or_else(|| Error::Validation(format!("{} is not valid UTF-8", path.display())))?;
        let folder_name = display_name
            .map(str::to_string)
            .unwrap_or_else(|| default_folder_name(path));

        let (registration, rebuilt) = {
            let store = Database::open(&self.database_path)?;

            if store.folder_exists(owner_id, folder_path)? {
                warn!(owner_id, "Folder already registered");
                return Ok(RegisterOutcome::AlreadyRegistered);
            }

            let registration = match store.create_folder(owner_id, &folder_name, folder_path) {
                Ok(registration) => registration,
                Err(Error::Duplicate(_)) => {
                    warn!(owner_id, "Folder already registered");
                    return Ok(RegisterOutcome::AlreadyRegistered);
                }
                Err(e) => return Err(e),
            };
            info!(owner_id, name = %folder_name, "Folder registered");

            let cache = self.cache_after_insert(&store, &registration)?;
            (registration, cache)
        };

        if let Some(cache) = rebuilt {
            self.cache.write(&cache)?;
        }

        Ok(RegisterOutcome::Registered(registration))
    }

    /// Cache contents following a store insert
    ///
    /// Appends to the owner's current cache; an absent, corrupt or foreign
    /// cache is rebuilt from the store instead. `None` when the owner has no
    /// user row to snapshot.
    fn cache_after_insert(
        &self,
        store: &Database,
        registration: &FolderRegistration,
    ) -> Result<Option<SessionCache>> {
        let owner_id = registration.owner_id;

        match self.cache.load() {
            Ok(Some(mut cache)) if cache.user_id == owner_id => {
                cache.folders.push(CachedFolder::from(registration));
                return Ok(Some(cache));
            }
            Ok(_) => {}
            Err(Error::CacheCorruption(reason)) => {
                warn!(%reason, "Session cache unreadable, rebuilding from store");
            }
            Err(e) => return Err(e),
        }

        let Some(user) = store.find_user_by_id(owner_id)? else {
            warn!(owner_id, "Owner has no user record, cache not updated");
            return Ok(None);
        };
        let folders = store.list_folders(owner_id)?;
        Ok(Some(SessionCache::snapshot(&user, &folders)))
    }
}

/// List a folder's visible entries: directories first, then by name
pub fn folder_files(path: &Path) -> Result<Vec<FolderEntry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        let name = entry.file_name().to_string_lossy().to_string();

        if name.starts_with('.') {
            continue;
        }

        entries.push(FolderEntry {
            name,
            path: entry.path(),
            is_directory: metadata.is_dir(),
            size_bytes: metadata.len(),
        });
    }

    entries.sort_by(|a, b| match (a.is_directory, b.is_directory) {
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        _ => a.name.cmp(&b.name),
    });

    Ok(entries)
}
