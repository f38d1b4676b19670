//! Outcome verification
//!
//! One strategy per test scenario: a substring in captured stdout, an
//! artifact file on disk, or an exact directory listing. Artifact checks
//! delete stale files before the run and archive verified artifacts so
//! repeated runs do not collide.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::{Error, Result};

/// The verification strategy a case declares
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// The expected string must appear verbatim in captured stdout
    OutputContains { needle: String },
    /// The file must exist on disk after the run
    ArtifactCreated { path: PathBuf },
    /// The directory must contain exactly the expected file names
    DirectoryContents {
        directory: PathBuf,
        expected: Vec<String>,
    },
    /// Nothing beyond the run itself (supervised shutdown cases)
    None,
}

impl Check {
    /// Remove stale state so a pass unambiguously means this run produced it
    pub fn prepare(&self) -> Result<()> {
        if let Check::ArtifactCreated { path } = self {
            if path.exists() {
                tracing::debug!("removing stale artifact {}", path.display());
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    /// Inspect the run outcome
    pub fn verify(&self, stdout: &str) -> Result<()> {
        match self {
            Check::OutputContains { needle } => {
                if stdout.contains(needle.as_str()) {
                    Ok(())
                } else {
                    Err(Error::OutputMismatch {
                        expected: needle.clone(),
                        actual: stdout.to_string(),
                    })
                }
            }
            Check::ArtifactCreated { path } => {
                if path.is_file() {
                    Ok(())
                } else {
                    Err(Error::ArtifactMissing(path.display().to_string()))
                }
            }
            Check::DirectoryContents {
                directory,
                expected,
            } => verify_directory(directory, expected),
            Check::None => Ok(()),
        }
    }

    /// Move a verified artifact into the archive, keyed by case name
    ///
    /// Returns the archive path, or None for strategies without artifacts.
    pub fn archive(&self, case_name: &str, archive_dir: &Path) -> Result<Option<PathBuf>> {
        let Check::ArtifactCreated { path } = self else {
            return Ok(None);
        };

        fs::create_dir_all(archive_dir)?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact".to_string());
        let dest = archive_dir.join(format!("{case_name}_{file_name}"));

        fs::rename(path, &dest)?;
        tracing::debug!("archived {} -> {}", path.display(), dest.display());

        Ok(Some(dest))
    }
}

fn verify_directory(directory: &Path, expected: &[String]) -> Result<()> {
    if !directory.is_dir() {
        return Err(Error::DirectoryMissing(directory.display().to_string()));
    }

    let mut actual = BTreeSet::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            actual.insert(entry.file_name().to_string_lossy().into_owned());
        }
    }

    let expected: BTreeSet<String> = expected.iter().cloned().collect();
    let missing: Vec<String> = expected.difference(&actual).cloned().collect();
    let unexpected: Vec<String> = actual.difference(&expected).cloned().collect();

    if missing.is_empty() && unexpected.is_empty() {
        Ok(())
    } else {
        Err(Error::DirectoryMismatch {
            directory: directory.display().to_string(),
            missing,
            unexpected,
        })
    }
}
