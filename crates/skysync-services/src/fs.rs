use crate::{Result, SkySyncError};
use color_eyre::eyre::WrapErr;
use std::path::Path;
use walkdir::WalkDir;

/// Filesystem operations the synchronizer needs. `StdFs` is the real thing;
/// tests substitute doubles to observe or break individual steps.
pub trait Fs {
    fn exists(&self, path: &Path) -> bool;
    /// Remove a directory tree or file. Missing paths are not an error.
    fn remove_tree(&self, path: &Path) -> Result<()>;
    /// Recursively copy `from` into the new directory `to`.
    fn copy_tree(&self, from: &Path, to: &Path) -> Result<()>;
    fn copy_file(&self, from: &Path, to: &Path) -> Result<()>;
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StdFs;

impl Fs for StdFs {
    fn exists(&self, path: &Path) -> bool {
        path.symlink_metadata().is_ok()
    }

    fn remove_tree(&self, path: &Path) -> Result<()> {
        let meta = match path.symlink_metadata() {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e).wrap_err_with(|| format!("inspecting {}", path.display())),
        };
        let removed = if meta.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        };
        removed.wrap_err_with(|| format!("removing {}", path.display()))
    }

    fn copy_tree(&self, from: &Path, to: &Path) -> Result<()> {
        let copy_failed = || SkySyncError::CopyFailed {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        };
        for entry in WalkDir::new(from).follow_links(true).sort_by_file_name() {
            let entry = entry.wrap_err_with(copy_failed)?;
            let rel = entry.path().strip_prefix(from).wrap_err_with(copy_failed)?;
            let dst = to.join(rel);
            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&dst).wrap_err_with(copy_failed)?;
            } else {
                std::fs::copy(entry.path(), &dst).wrap_err_with(copy_failed)?;
            }
        }
        Ok(())
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        std::fs::copy(from, to).wrap_err_with(|| SkySyncError::CopyFailed {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        })?;
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        std::fs::rename(from, to)
            .wrap_err_with(|| format!("renaming {} to {}", from.display(), to.display()))
    }
}
