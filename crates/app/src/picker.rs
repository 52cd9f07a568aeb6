//! Folder and file pickers
//!
//! A picker answers with an absolute path or `None`; `None` means the
//! operator gave nothing usable and the caller decides whether to ask again.

use std::path::{Path, PathBuf};

use encrypto_core::{folder_files, Result};

use crate::prompt::Prompt;

pub trait FolderPicker {
    /// Ask for a directory, starting from `start`
    fn pick_folder(&mut self, prompt: &mut dyn Prompt, start: &Path) -> Result<Option<PathBuf>>;

    /// Ask for a regular file inside `folder`
    fn pick_file(&mut self, prompt: &mut dyn Prompt, folder: &Path) -> Result<Option<PathBuf>>;
}

/// Picker driven by typed paths and numbered file menus
#[derive(Debug, Default)]
pub struct TerminalPicker;

impl FolderPicker for TerminalPicker {
    fn pick_folder(&mut self, prompt: &mut dyn Prompt, start: &Path) -> Result<Option<PathBuf>> {
        let answer = prompt.text(&format!("Folder path (relative to {})", start.display()))?;
        Ok(resolve_folder(start, &answer))
    }

    fn pick_file(&mut self, prompt: &mut dyn Prompt, folder: &Path) -> Result<Option<PathBuf>> {
        let files: Vec<_> = folder_files(folder)?
            .into_iter()
            .filter(|entry| !entry.is_directory)
            .collect();

        if files.is_empty() {
            prompt.say(&format!("{} has no files.", folder.display()));
            return Ok(None);
        }

        let labels: Vec<String> = files
            .iter()
            .map(|entry| format!("{} ({} bytes)", entry.name, entry.size_bytes))
            .collect();
        let choice = prompt.choose("Select a file", &labels)?;

        Ok(files.into_iter().nth(choice).map(|entry| entry.path))
    }
}

/// Turn a typed answer into an existing absolute directory
///
/// Relative answers resolve against `start`; blanks and non-directories
/// yield `None`.
pub fn resolve_folder(start: &Path, answer: &str) -> Option<PathBuf> {
    let answer = answer.trim();
    if answer.is_empty() {
        return None;
    }

    let candidate = start.join(answer);
    if !candidate.is_dir() {
        return None;
    }
    candidate.canonicalize().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_blank_answer_is_none() {
        let dir = tempdir().unwrap();
        assert_eq!(resolve_folder(dir.path(), "   "), None);
    }

    #[test]
    fn test_relative_answer_resolves_against_start() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("reports")).unwrap();

        let picked = resolve_folder(dir.path(), "reports").unwrap();
        assert!(picked.is_absolute());
        assert_eq!(picked.file_name().unwrap(), "reports");
    }

    #[test]
    fn test_files_are_not_folders() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        assert_eq!(resolve_folder(dir.path(), "notes.txt"), None);
        assert_eq!(resolve_folder(dir.path(), "missing"), None);
    }
}
