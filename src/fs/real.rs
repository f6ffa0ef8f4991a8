use super::{DirEntry, FileSystem, FileType};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("Failed to read file {:?}", path))
    }

    /// Entries in name order. Symlinks are reported as such and never followed,
    /// so a walk cannot leave the bundle root.
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let mut entries = fs::read_dir(path)
            .with_context(|| format!("Failed to read directory {:?}", path))?
            .map(|entry| {
                let entry = entry.context("Failed to read directory entry")?;
                let kind = entry
                    .file_type()
                    .with_context(|| format!("Failed to stat {:?}", entry.path()))?;
                let file_type = if kind.is_symlink() {
                    FileType::Symlink
                } else if kind.is_dir() {
                    FileType::Directory
                } else {
                    FileType::File
                };
                Ok(DirEntry {
                    path: entry.path(),
                    name: entry.file_name().to_string_lossy().into_owned(),
                    file_type,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
