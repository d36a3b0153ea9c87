//! Artifacts produced by a library build.

pub mod writer;

use std::path::{Path, PathBuf};

use kiln_config::{LibraryFormat, LintWarning};
use serde::Serialize;

use crate::Result;

/// What an artifact is, for reporting and selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "format", rename_all = "snake_case")]
pub enum ArtifactKind {
    /// The library bundle for one format
    Bundle(LibraryFormat),
    /// A code-split chunk of one format
    Chunk(LibraryFormat),
    /// A `.d.ts` file
    Declaration,
    /// Any other emitted file, such as a source map
    Asset,
}

/// A single output file, held in memory until written.
#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
    /// Path relative to the output directory, `/`-separated
    pub file_name: String,
    pub kind: ArtifactKind,
    #[serde(skip)]
    pub contents: Vec<u8>,
    /// Source modules rendered into this artifact (bundles and chunks)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<String>,
}

impl Artifact {
    pub fn size(&self) -> usize {
        self.contents.len()
    }

    /// Contents as text; artifacts kiln emits are UTF-8.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.contents)
    }
}

/// Result of building every format of a library.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LibraryBuild {
    pub artifacts: Vec<Artifact>,
    /// Configuration lint warnings observed before building
    pub warnings: Vec<LintWarning>,
}

impl LibraryBuild {
    pub fn bundles(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts
            .iter()
            .filter(|a| matches!(a.kind, ArtifactKind::Bundle(_)))
    }

    pub fn bundle(&self, format: LibraryFormat) -> Option<&Artifact> {
        self.artifacts
            .iter()
            .find(|a| a.kind == ArtifactKind::Bundle(format))
    }

    pub fn declarations(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts
            .iter()
            .filter(|a| a.kind == ArtifactKind::Declaration)
    }

    pub fn get(&self, file_name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.file_name == file_name)
    }

    pub fn total_size(&self) -> usize {
        self.artifacts.iter().map(Artifact::size).sum()
    }

    /// Writes every artifact under `dir`, atomically.
    ///
    /// Fails with [`Error::OutputExists`](crate::Error::OutputExists) when a
    /// file is present and `overwrite` is false, and with
    /// [`Error::InvalidOutputPath`](crate::Error::InvalidOutputPath) when an
    /// artifact name would land outside `dir`.
    pub fn write_to(&self, dir: impl AsRef<Path>, overwrite: bool) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let written = writer::write_files_to(
            self.artifacts
                .iter()
                .map(|a| (a.file_name.as_str(), a.contents.as_slice())),
            dir,
            overwrite,
        )?;
        tracing::info!(
            dir = %dir.display(),
            files = written.len(),
            "wrote library artifacts"
        );
        Ok(written)
    }
}
