//! Transform pipeline
//!
//! `encode` writes `<dir>/<output_dir>/<stem>.<marker>` next to the source;
//! `decode` writes `<stem>.<original extension>` two directories above the
//! encoded file. Sources are never modified and artifacts are written via a
//! temp file and rename.

pub mod cipher;

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::atomic::write_atomic;
use crate::config::TransformConfig;
use crate::error::{Error, Precondition, Result};

/// Outcome of one transformed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformReport {
    pub source: PathBuf,
    pub artifact: PathBuf,
    /// Files transformed by this pipeline so far, this one included
    pub sequence: u64,
}

pub struct TransformPipeline {
    output_dir: String,
    marker: String,
    overwrite: bool,
    transformed: u64,
}

impl TransformPipeline {
    pub fn new(config: &TransformConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            marker: config.marker_extension.trim_start_matches('.').to_string(),
            overwrite: config.overwrite,
            transformed: 0,
        }
    }

    /// Files transformed so far
    pub fn transformed(&self) -> u64 {
        self.transformed
    }

    /// Whether `path` carries the output marker extension (any case)
    pub fn is_transformed(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.marker))
    }

    /// Apply the forward permutation to `source`
    #[instrument(skip(self), fields(source = %source.display()))]
    pub fn encode(&mut self, source: &Path) -> Result<TransformReport> {
        if self.is_transformed(source) {
            return Err(Error::TransformPrecondition(
                Precondition::AlreadyTransformed(source.to_path_buf()),
            ));
        }
        let (parent, stem) = split_source(source)?;

        let contents = fs::read(source)?;
        let out_dir = parent.join(&self.output_dir);
        fs::create_dir_all(&out_dir)?;

        let artifact = out_dir.join(with_extension(stem, &self.marker));
        self.finish(source, artifact, &cipher::encode(&contents))
    }

    /// Apply the inverse permutation to an encoded `source`
    ///
    /// The result lands two directories up from the encoded file, named with
    /// `original_extension`.
    #[instrument(skip(self), fields(source = %source.display()))]
    pub fn decode(&mut self, source: &Path, original_extension: &str) -> Result<TransformReport> {
        if !self.is_transformed(source) {
            return Err(Error::TransformPrecondition(Precondition::NotTransformed(
                source.to_path_buf(),
            )));
        }
        let (parent, stem) = split_source(source)?;
        let target_dir = parent
            .parent()
            .and_then(Path::parent)
            .ok_or_else(|| invalid_source(source))?;

        let extension = original_extension.trim().trim_start_matches('.');
        if extension.contains(['/', '\\']) {
            return Err(Error::TransformPrecondition(Precondition::InvalidExtension(
                original_extension.to_string(),
            )));
        }

        let contents = fs::read(source)?;

        let artifact = target_dir.join(with_extension(stem, extension));
        self.finish(source, artifact, &cipher::decode(&contents))
    }

    fn finish(
        &mut self,
        source: &Path,
        artifact: PathBuf,
        contents: &[u8],
    ) -> Result<TransformReport> {
        if artifact == source {
            return Err(Error::TransformPrecondition(
                Precondition::WouldOverwriteSource(artifact),
            ));
        }
        if artifact.exists() && !self.overwrite {
            return Err(Error::TransformPrecondition(Precondition::ArtifactExists(
                artifact,
            )));
        }

        write_atomic(&artifact, contents)?;

        self.transformed += 1;
        info!(
            sequence = self.transformed,
            artifact = %artifact.display(),
            "File transformed"
        );

        Ok(TransformReport {
            source: source.to_path_buf(),
            artifact,
            sequence: self.transformed,
        })
    }
}

fn split_source(source: &Path) -> Result<(&Path, &std::ffi::OsStr)> {
    match (source.parent(), source.file_stem()) {
        (Some(parent), Some(stem)) => Ok((parent, stem)),
        _ => Err(invalid_source(source)),
    }
}

fn invalid_source(source: &Path) -> Error {
    Error::TransformPrecondition(Precondition::InvalidSource(source.to_path_buf()))
}

fn with_extension(stem: &std::ffi::OsStr, extension: &str) -> OsString {
    let mut name = stem.to_os_string();
    if !extension.is_empty() {
        name.push(".");
        name.push(extension);
    }
    name
}
