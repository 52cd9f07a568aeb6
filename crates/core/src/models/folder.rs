//! Folder registration model

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A folder a user has registered for transforms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRegistration {
    pub id: i64,
    /// Back-reference to `User::id`
    pub owner_id: i64,
    pub folder_name: String,
    /// Absolute path, as registered
    pub folder_path: String,
    pub created_at: DateTime<Utc>,
}

/// Display name for a folder: its final path component
pub fn default_folder_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_folder_name() {
        assert_eq!(default_folder_name(Path::new("/data/reports")), "reports");
        assert_eq!(default_folder_name(Path::new("/data/reports/")), "reports");
        assert_eq!(default_folder_name(Path::new("/")), "/");
    }
}
