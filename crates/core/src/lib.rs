//! Encrypto Core Library
//!
//! Identity, folder registration, session cache synchronization and the
//! reversible file transform behind the Encrypto command-line tool.

mod atomic;
pub mod cache;
pub mod config;
pub mod credentials;
pub mod error;
pub mod identity;
pub mod models;
pub mod registry;
pub mod storage;
pub mod transform;

pub use cache::{CachedFolder, SessionCache, SessionCacheFile};
pub use config::{Config, TransformConfig};
pub use error::{Error, Precondition, Result};
pub use identity::{IdentityService, Resolution, SignUpOutcome};
pub use models::*;
pub use registry::{folder_files, FolderEntry, FolderRegistry, RegisterOutcome};
pub use storage::{Database, FolderRepository, FolderStore, UserRepository, UserStore};
pub use transform::{TransformPipeline, TransformReport};
