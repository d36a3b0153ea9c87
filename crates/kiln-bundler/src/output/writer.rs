//! Atomic, path-checked writing of build artifacts.
//!
//! Every artifact is written to a temporary sibling first. Only when all of
//! them are on disk are they renamed into place. Files being replaced are
//! moved to a `.bak` sibling until every rename succeeded, so a failed rename
//! removes the new files, restores the replaced ones and leaves the output
//! directory as it was. File names are cleaned and must stay inside the
//! output directory.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;

use crate::{Error, Result};

/// Writes `(file name, contents)` pairs under `dir`.
///
/// Returns the written paths in input order.
pub fn write_files_to<'a, I>(files: I, dir: &Path, overwrite: bool) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let dir = validate_and_normalize_dir(dir)?;

    fs::create_dir_all(&dir).map_err(|e| {
        Error::WriteFailure(format!(
            "Failed to create output directory '{}': {}",
            dir.display(),
            e
        ))
    })?;

    let mut operations = Vec::new();
    for (filename, contents) in files {
        let target_path = validate_output_path(&dir, filename)?;

        if !overwrite && target_path.exists() {
            return Err(Error::OutputExists(format!(
                "File already exists: '{}'",
                target_path.display()
            )));
        }

        operations.push((target_path, contents));
    }

    write_files_atomic(&operations)?;

    Ok(operations.into_iter().map(|(path, _)| path).collect())
}

/// Cleans `dir` and makes it absolute.
fn validate_and_normalize_dir(dir: &Path) -> Result<PathBuf> {
    let cleaned = dir.clean();

    if cleaned.is_absolute() {
        return Ok(cleaned);
    }

    Ok(std::env::current_dir()
        .map_err(|e| Error::InvalidOutputPath(format!("Failed to get current directory: {}", e)))?
        .join(&cleaned)
        .clean())
}

/// Resolves `filename` under `base_dir`, rejecting anything that escapes it
/// (`..` traversal, absolute names, NUL bytes).
pub(crate) fn validate_output_path(base_dir: &Path, filename: &str) -> Result<PathBuf> {
    if filename.contains('\0') {
        return Err(Error::InvalidOutputPath(
            "Filename contains null byte".to_string(),
        ));
    }

    #[cfg(target_os = "windows")]
    {
        let upper = filename.to_uppercase();
        let device_names = [
            "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7",
            "COM8", "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
        ];
        for device in &device_names {
            if upper == *device || upper.starts_with(&format!("{}.", device)) {
                return Err(Error::InvalidOutputPath(format!(
                    "Filename is a reserved device name: {}",
                    filename
                )));
            }
        }
    }

    let full_path = base_dir.join(Path::new(filename).clean()).clean();

    if !full_path.starts_with(base_dir) || full_path == base_dir {
        return Err(Error::InvalidOutputPath(format!(
            "Path '{}' escapes output directory '{}' (resolved to '{}')",
            filename,
            base_dir.display(),
            full_path.display()
        )));
    }

    Ok(full_path)
}

/// `index.mjs` → `index.mjs.tmp`, so artifacts sharing a stem never collide.
fn temp_path_for(target: &Path) -> PathBuf {
    sibling_with_suffix(target, ".tmp")
}

fn sibling_with_suffix(target: &Path, suffix: &str) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("artifact"));
    name.push(suffix);
    target.with_file_name(name)
}

fn write_files_atomic(operations: &[(PathBuf, &[u8])]) -> Result<()> {
    let mut temp_files = Vec::new();

    for (target_path, content) in operations {
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                cleanup_temp_files(&temp_files);
                Error::WriteFailure(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let temp_path = temp_path_for(target_path);
        fs::write(&temp_path, content).map_err(|e| {
            cleanup_temp_files(&temp_files);
            Error::WriteFailure(format!(
                "Failed to write temporary file '{}': {}",
                temp_path.display(),
                e
            ))
        })?;

        temp_files.push((temp_path, target_path.clone()));
    }

    let mut placed: Vec<(PathBuf, Option<PathBuf>)> = Vec::new();
    for (temp_path, target_path) in &temp_files {
        if let Err(e) = place(temp_path, target_path, &mut placed) {
            rollback(&placed);
            cleanup_temp_files(&temp_files);
            return Err(Error::WriteFailure(format!(
                "Failed to rename '{}' to '{}': {}",
                temp_path.display(),
                target_path.display(),
                e
            )));
        }
    }

    for (_, backup) in &placed {
        if let Some(backup) = backup {
            if let Err(e) = fs::remove_file(backup) {
                tracing::warn!(path = %backup.display(), error = %e, "failed to remove backup file");
            }
        }
    }

    Ok(())
}

/// Moves `temp_path` over `target_path`, backing up a replaced file first.
fn place(
    temp_path: &Path,
    target_path: &Path,
    placed: &mut Vec<(PathBuf, Option<PathBuf>)>,
) -> std::io::Result<()> {
    let backup = if target_path.is_file() {
        let backup = sibling_with_suffix(target_path, ".bak");
        fs::rename(target_path, &backup)?;
        Some(backup)
    } else {
        None
    };

    if let Err(e) = fs::rename(temp_path, target_path) {
        if let Some(backup) = &backup {
            let _ = fs::rename(backup, target_path);
        }
        return Err(e);
    }

    placed.push((target_path.to_path_buf(), backup));
    Ok(())
}

/// Undoes completed renames, newest first.
fn rollback(placed: &[(PathBuf, Option<PathBuf>)]) {
    for (target_path, backup) in placed.iter().rev() {
        let restored = match backup {
            Some(backup) => fs::rename(backup, target_path),
            None => fs::remove_file(target_path),
        };
        if let Err(e) = restored {
            tracing::warn!(
                path = %target_path.display(),
                error = %e,
                "failed to roll back output file"
            );
        }
    }
}

/// Best-effort removal of temporaries, already on an error path.
fn cleanup_temp_files(temp_files: &[(PathBuf, PathBuf)]) {
    for (temp_path, _) in temp_files {
        if temp_path.exists() {
            if let Err(e) = fs::remove_file(temp_path) {
                tracing::warn!(
                    path = %temp_path.display(),
                    error = %e,
                    "failed to clean up temporary file"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_output_path_nested() {
        let base = Path::new("/tmp/output");
        let result = validate_output_path(base, "types/components/Badge.d.ts");
        assert_eq!(
            result.unwrap(),
            Path::new("/tmp/output/types/components/Badge.d.ts")
        );
    }

    #[test]
    fn test_validate_output_path_current_dir() {
        let base = Path::new("/tmp/output");
        let result = validate_output_path(base, "./index.mjs");
        assert_eq!(result.unwrap(), Path::new("/tmp/output/index.mjs"));
    }

    #[test]
    fn test_validate_output_path_traversal() {
        let base = Path::new("/tmp/output");
        for name in ["../etc/passwd", "safe/../../../../etc/passwd", "/etc/passwd", ".", "a\0b.js"] {
            assert!(
                matches!(
                    validate_output_path(base, name),
                    Err(Error::InvalidOutputPath(_))
                ),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn temp_names_keep_the_full_file_name() {
        assert_eq!(
            temp_path_for(Path::new("/out/lib.umd.js")),
            Path::new("/out/lib.umd.js.tmp")
        );
    }

    #[test]
    fn writes_all_files_and_respects_overwrite() {
        let dir = TempDir::new().unwrap();
        let files = [("lib.mjs", b"export {}".as_slice()), ("types/lib.d.ts", b"export {};".as_slice())];

        let written = write_files_to(files, dir.path(), false).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(fs::read_to_string(dir.path().join("types/lib.d.ts")).unwrap(), "export {};");
        assert!(!dir.path().join("lib.mjs.tmp").exists());

        let err = write_files_to(files, dir.path(), false).unwrap_err();
        assert!(matches!(err, Error::OutputExists(_)));
        assert!(write_files_to(files, dir.path(), true).is_ok());
    }

    #[test]
    fn failed_rename_restores_previous_output() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("lib.mjs"), "old").unwrap();
        // A non-empty directory cannot be replaced by a file.
        fs::create_dir_all(dir.path().join("lib.umd.js/nested")).unwrap();

        let files = [
            ("lib.mjs", b"new".as_slice()),
            ("lib.d.ts", b"export {};".as_slice()),
            ("lib.umd.js", b"umd".as_slice()),
        ];
        let err = write_files_to(files, dir.path(), true).unwrap_err();
        assert!(matches!(err, Error::WriteFailure(_)));

        assert_eq!(fs::read_to_string(dir.path().join("lib.mjs")).unwrap(), "old");
        assert!(!dir.path().join("lib.d.ts").exists());
        assert!(dir.path().join("lib.umd.js").is_dir());
        for leftover in ["lib.mjs.bak", "lib.mjs.tmp", "lib.d.ts.tmp", "lib.umd.js.tmp"] {
            assert!(!dir.path().join(leftover).exists(), "{leftover} left behind");
        }
    }

    #[test]
    fn successful_overwrite_removes_backups() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("lib.mjs"), "old").unwrap();

        write_files_to([("lib.mjs", b"new".as_slice())], dir.path(), true).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("lib.mjs")).unwrap(), "new");
        assert!(!dir.path().join("lib.mjs.bak").exists());
    }
}
