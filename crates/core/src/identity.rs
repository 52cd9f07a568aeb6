//! Identity service
//!
//! Sign-up and sign-in against the store, each ending in a full rewrite of
//! the session cache. On start-up the cache is only a shortcut: its identity
//! is re-verified against the store before it is trusted.

use std::path::PathBuf;

use tracing::{info, instrument, warn};

use crate::cache::{SessionCache, SessionCacheFile};
use crate::config::Config;
use crate::credentials::{hash_password, verify_password};
use crate::error::{Error, Result};
use crate::models::{NewUser, User};
use crate::storage::{Database, FolderRepository, UserRepository};

/// Result of a sign-up attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// New user stored and cached
    Created(User),
    /// The exact identity is already registered; offer sign-in instead
    AlreadyExists,
    /// Username or email belongs to a different account
    Rejected(String),
}

/// What the cache says about the current session at start-up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Cache identity matches the store
    SignedIn(SessionCache),
    /// No cache yet (first run)
    NoSession,
    /// Cache references a user the store does not know
    NotFound,
    /// Cache file could not be parsed
    Corrupt,
}

pub struct IdentityService {
    database_path: PathBuf,
    cache: SessionCacheFile,
}

impl IdentityService {
    pub fn new(config: &Config) -> Self {
        Self {
            database_path: config.database_path(),
            cache: SessionCacheFile::new(config.cache_path()),
        }
    }

    pub fn cache(&self) -> &SessionCacheFile {
        &self.cache
    }

    fn open_store(&self) -> Result<Database> {
        Database::open(&self.database_path)
    }

    /// Register a new user and start their session with no folders
    #[instrument(skip(self, password))]
    pub fn sign_up(&self, username: &str, email: &str, password: &str) -> Result<SignUpOutcome> {
        let user = {
            let store = self.open_store()?;

            if let Some(existing) = store.find_user_by_username_and_email(username, email)? {
                if verify_password(password, &existing.password_hash)? {
                    warn!(username, "User already exists");
                    return Ok(SignUpOutcome::AlreadyExists);
                }
            }

            if store.find_user_by_username(username)?.is_some()
                || store.find_user_by_email(email)?.is_some()
            {
                warn!(username, "Username or email already taken");
                return Ok(SignUpOutcome::Rejected(
                    "username or email is already registered".into(),
                ));
            }

            let new_user = NewUser::new(username.into(), email.into(), hash_password(password)?);
            match store.create_user(&new_user) {
                Ok(user) => user,
                Err(Error::Duplicate(reason)) => return Ok(SignUpOutcome::Rejected(reason)),
                Err(e) => return Err(e),
            }
        };

        self.cache.write(&SessionCache::snapshot(&user, &[]))?;
        info!(username, user_id = user.id, "User created");

        Ok(SignUpOutcome::Created(user))
    }

    /// Verify credentials and rebuild the cache from the store
    ///
    /// Returns `false` on bad credentials; the cache is left untouched.
    #[instrument(skip(self, password))]
    pub fn sign_in(&self, username: &str, password: &str) -> Result<bool> {
        let snapshot = {
            let store = self.open_store()?;

            let user = match store.find_user_by_username(username)? {
                Some(user) if verify_password(password, &user.password_hash)? => user,
                _ => {
                    warn!(username, "Sign-in failed");
                    return Ok(false);
                }
            };

            let folders = store.list_folders(user.id)?;
            SessionCache::snapshot(&user, &folders)
        };

        self.cache.write(&snapshot)?;
        info!(username, folders = snapshot.folders.len(), "User signed in");

        Ok(true)
    }

    /// Re-verify the cached identity against the store
    #[instrument(skip(self))]
    pub fn resolve(&self) -> Result<Resolution> {
        let cache = match self.cache.load() {
            Ok(Some(cache)) => cache,
            Ok(None) => return Ok(Resolution::NoSession),
            Err(Error::CacheCorruption(reason)) => {
                warn!(%reason, "Session cache unreadable");
                return Ok(Resolution::Corrupt);
            }
            Err(e) => return Err(e),
        };

        let store = self.open_store()?;
        let verified = store.find_user_by_identity(
            cache.user_id,
            &cache.username,
            &cache.email,
            &cache.password_hash,
        )?;

        match verified {
            Some(_) => {
                info!(username = %cache.username, "Session restored from cache");
                Ok(Resolution::SignedIn(cache))
            }
            None => {
                warn!(user_id = cache.user_id, "Cached user not found in store");
                Ok(Resolution::NotFound)
            }
        }
    }

    /// Rebuild the cache for `user_id` from the store
    #[instrument(skip(self))]
    pub fn resync(&self, user_id: i64) -> Result<SessionCache> {
        let snapshot = {
            let store = self.open_store()?;
            let user = store
                .find_user_by_id(user_id)?
                .ok_or_else(|| Error::NotFound(format!("user {user_id}")))?;
            let folders = store.list_folders(user_id)?;
            SessionCache::snapshot(&user, &folders)
        };

        self.cache.write(&snapshot)?;
        Ok(snapshot)
    }

    /// Forget the cached session
    pub fn sign_out(&self) -> Result<()> {
        self.cache.clear()?;
        info!("Session cache cleared");
        Ok(())
    }
}
