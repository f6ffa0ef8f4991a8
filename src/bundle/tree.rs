use crate::error::{DeployError, Result};
use crate::fs::{DirEntry, FileSystem, RealFileSystem};
use ignore::WalkBuilder;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub max_depth: usize,
    pub max_files: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_depth: 16,
            max_files: 50_000,
        }
    }
}

/// Ordered set of bundle-relative file paths, each readable on demand.
///
/// The tree never writes to the bundle and never changes after it is built.
#[derive(Clone)]
pub struct FileTree {
    root: PathBuf,
    files: Vec<PathBuf>,
    fs: Arc<dyn FileSystem>,
}

/// Depth of the layer holding the manifest, loader jars and startup scripts.
/// Files this shallow are always collected; `max_files` bounds what lies below.
const SIGNAL_DEPTH: usize = 2;

impl FileTree {
    /// Walks an extracted bundle on disk.
    pub fn scan(root: impl Into<PathBuf>, config: &ScanConfig) -> Result<Self> {
        let root = root.into();
        Self::check_root(&RealFileSystem, &root)?;

        let signal_depth = SIGNAL_DEPTH.min(config.max_depth);
        let mut files: Vec<PathBuf> = walk_disk(&root, signal_depth).map(|(_, rel)| rel).collect();

        if config.max_depth > signal_depth {
            let budget = config.max_files.saturating_sub(files.len());
            let mut deep = walk_disk(&root, config.max_depth)
                .filter(|(depth, _)| *depth > signal_depth)
                .map(|(_, rel)| rel);
            files.extend(deep.by_ref().take(budget));
            if deep.next().is_some() {
                warn!(
                    max_files = config.max_files,
                    "Reached file limit, stopping bundle scan"
                );
            }
        }

        Ok(Self::from_parts(root, files, Arc::new(RealFileSystem)))
    }

    /// Builds a tree from any [`FileSystem`], e.g. an in-memory bundle.
    ///
    /// Visits entries in the same name-sorted depth-first order as [`FileTree::scan`],
    /// so both builders keep the same files under a file limit.
    pub fn from_fs(
        fs: Arc<dyn FileSystem>,
        root: impl Into<PathBuf>,
        config: &ScanConfig,
    ) -> Result<Self> {
        let root = root.into();
        Self::check_root(fs.as_ref(), &root)?;

        let signal_depth = SIGNAL_DEPTH.min(config.max_depth);
        let mut files = Vec::new();
        walk_fs(fs.as_ref(), &root, signal_depth, |_, rel| {
            files.push(rel.to_path_buf());
            true
        })?;

        if config.max_depth > signal_depth {
            let budget = config.max_files.saturating_sub(files.len());
            let mut added = 0usize;
            let mut truncated = false;
            walk_fs(fs.as_ref(), &root, config.max_depth, |depth, rel| {
                if depth <= signal_depth {
                    return true;
                }
                if added == budget {
                    truncated = true;
                    return false;
                }
                files.push(rel.to_path_buf());
                added += 1;
                true
            })?;
            if truncated {
                warn!(
                    max_files = config.max_files,
                    "Reached file limit, stopping bundle scan"
                );
            }
        }

        Ok(Self::from_parts(root, files, fs))
    }

    fn check_root(fs: &dyn FileSystem, root: &Path) -> Result<()> {
        if !fs.exists(root) {
            return Err(DeployError::BundleNotFound(root.to_path_buf()));
        }
        if !fs.is_dir(root) {
            return Err(DeployError::NotADirectory(root.to_path_buf()));
        }
        Ok(())
    }

    fn from_parts(root: PathBuf, mut files: Vec<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        files.sort();
        files.dedup();
        debug!(root = %root.display(), files = files.len(), "Bundle file tree built");
        Self { root, files, fs }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Final component of the bundle root, used as a fallback bundle name.
    pub fn name(&self) -> Option<&str> {
        self.root.file_name().and_then(|n| n.to_str())
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, rel: impl AsRef<Path>) -> bool {
        self.files
            .binary_search_by(|p| p.as_path().cmp(rel.as_ref()))
            .is_ok()
    }

    /// Files whose parent is the root (depth 0) or a direct child of it (depth 1).
    pub fn shallow_files(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.iter().filter(|p| p.components().count() <= 2)
    }

    pub fn read_to_string(&self, rel: impl AsRef<Path>) -> Result<String> {
        let path = self.root.join(rel.as_ref());
        self.fs.read_to_string(&path).map_err(|e| DeployError::Read {
            path,
            message: e.to_string(),
        })
    }
}

impl fmt::Debug for FileTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileTree")
            .field("root", &self.root)
            .field("files", &self.files.len())
            .finish()
    }
}

/// Regular files under `root` down to `max_depth`, depth-first in file name order.
/// Symlinks are not followed.
fn walk_disk(root: &Path, max_depth: usize) -> impl Iterator<Item = (usize, PathBuf)> + '_ {
    WalkBuilder::new(root)
        .max_depth(Some(max_depth))
        .hidden(false)
        .git_ignore(false)
        .git_exclude(false)
        .git_global(false)
        .ignore(false)
        .parents(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build()
        .filter_map(|result| match result {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(error = %err, "Failed to read bundle entry");
                None
            }
        })
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(move |entry| {
            let rel = entry.path().strip_prefix(root).ok()?.to_path_buf();
            Some((entry.depth(), rel))
        })
}

/// [`walk_disk`] over a [`FileSystem`]. `visit` receives each file's depth and
/// relative path and returns `false` to stop the walk.
fn walk_fs(
    fs: &dyn FileSystem,
    root: &Path,
    max_depth: usize,
    mut visit: impl FnMut(usize, &Path) -> bool,
) -> Result<()> {
    if max_depth == 0 {
        return Ok(());
    }
    let mut stack: Vec<(DirEntry, usize)> = Vec::new();
    push_children(fs, root, 1, &mut stack)?;

    while let Some((entry, depth)) = stack.pop() {
        if entry.is_dir() {
            if depth < max_depth {
                push_children(fs, &entry.path, depth + 1, &mut stack)?;
            }
        } else if entry.is_file() {
            if let Ok(rel) = entry.path.strip_prefix(root) {
                if !visit(depth, rel) {
                    return Ok(());
                }
            }
        }
    }
    Ok(())
}

/// Pushes the children of `dir` so they pop in name order.
fn push_children(
    fs: &dyn FileSystem,
    dir: &Path,
    depth: usize,
    stack: &mut Vec<(DirEntry, usize)>,
) -> Result<()> {
    let mut entries = fs.read_dir(dir).map_err(|e| DeployError::Read {
        path: dir.to_path_buf(),
        message: e.to_string(),
    })?;
    entries.sort_by(|a, b| b.name.cmp(&a.name));
    stack.extend(entries.into_iter().map(|entry| (entry, depth)));
    Ok(())
}

/// Bundle-relative path rendered with forward slashes.
pub(crate) fn rel_string(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use std::fs;
    use tempfile::TempDir;

    fn mock_tree() -> FileTree {
        let mock = MockFileSystem::with_root(PathBuf::from("/bundle"));
        mock.add_file("manifest.json", "{}");
        mock.add_file("overrides/config/jei.toml", "x");
        mock.add_file("overrides/config/deep/more/nested.cfg", "y");
        FileTree::from_fs(Arc::new(mock), "/bundle", &ScanConfig::default()).unwrap()
    }

    #[test]
    fn test_from_fs_sorted_relative_paths() {
        let tree = mock_tree();
        let files: Vec<String> = tree.files().iter().map(|p| rel_string(p)).collect();
        assert_eq!(
            files,
            vec![
                "manifest.json",
                "overrides/config/deep/more/nested.cfg",
                "overrides/config/jei.toml",
            ]
        );
        assert_eq!(tree.name(), Some("bundle"));
    }

    #[test]
    fn test_contains_and_read() {
        let tree = mock_tree();
        assert!(tree.contains("manifest.json"));
        assert!(!tree.contains("start.sh"));
        assert_eq!(tree.read_to_string("manifest.json").unwrap(), "{}");
    }

    #[test]
    fn test_read_missing_file_is_read_error() {
        let tree = mock_tree();
        let err = tree.read_to_string("nope.txt").unwrap_err();
        assert!(matches!(err, DeployError::Read { .. }));
    }

    #[test]
    fn test_shallow_files_limits_depth() {
        let mock = MockFileSystem::with_root(PathBuf::from("/bundle"));
        mock.add_file("a.jar", "");
        mock.add_file("server/b.jar", "");
        mock.add_file("server/libs/c.jar", "");
        let tree = FileTree::from_fs(Arc::new(mock), "/bundle", &ScanConfig::default()).unwrap();

        let shallow: Vec<String> = tree.shallow_files().map(|p| rel_string(p)).collect();
        assert_eq!(shallow, vec!["a.jar", "server/b.jar"]);
    }

    #[test]
    fn test_max_depth_and_max_files() {
        let mock = Arc::new(MockFileSystem::with_root(PathBuf::from("/bundle")));
        mock.add_file("a.txt", "");
        mock.add_file("d1/b.txt", "");
        mock.add_file("d1/d2/c.txt", "");
        mock.add_file("d1/d2/d.txt", "");

        let shallow = FileTree::from_fs(
            mock.clone(),
            "/bundle",
            &ScanConfig {
                max_depth: 2,
                max_files: 100,
            },
        )
        .unwrap();
        assert_eq!(shallow.len(), 2);

        let limited = FileTree::from_fs(
            mock,
            "/bundle",
            &ScanConfig {
                max_depth: 16,
                max_files: 3,
            },
        )
        .unwrap();
        let files: Vec<String> = limited.files().iter().map(|p| rel_string(p)).collect();
        assert_eq!(files, vec!["a.txt", "d1/b.txt", "d1/d2/c.txt"]);
    }

    #[test]
    fn test_file_limit_keeps_signal_layer() {
        let mock = Arc::new(MockFileSystem::with_root(PathBuf::from("/bundle")));
        for i in 0..20 {
            mock.add_file(format!("overrides/config/f{}.toml", i), "x");
        }
        mock.add_file("manifest.json", "{}");
        mock.add_file("start.sh", "java");

        let tree = FileTree::from_fs(
            mock,
            "/bundle",
            &ScanConfig {
                max_depth: 16,
                max_files: 5,
            },
        )
        .unwrap();

        assert!(tree.contains("manifest.json"));
        assert!(tree.contains("start.sh"));
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_scan_and_from_fs_agree_under_file_limit() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("overrides/config")).unwrap();
        fs::create_dir_all(temp.path().join("mods/extra/deep")).unwrap();
        for i in 0..20 {
            fs::write(temp.path().join(format!("overrides/config/f{}.toml", i)), "x").unwrap();
        }
        fs::write(temp.path().join("mods/extra/deep/a.jar"), "").unwrap();
        fs::write(temp.path().join("manifest.json"), "{}").unwrap();

        let config = ScanConfig {
            max_depth: 16,
            max_files: 8,
        };
        let scanned = FileTree::scan(temp.path(), &config).unwrap();
        let walked =
            FileTree::from_fs(Arc::new(RealFileSystem::new()), temp.path(), &config).unwrap();

        assert!(scanned.contains("manifest.json"));
        assert_eq!(scanned.len(), 8);
        assert_eq!(scanned.files(), walked.files());
    }

    #[test]
    fn test_missing_root() {
        let mock = MockFileSystem::with_root(PathBuf::from("/bundle"));
        let err = FileTree::from_fs(Arc::new(mock), "/elsewhere", &ScanConfig::default())
            .unwrap_err();
        assert!(matches!(err, DeployError::BundleNotFound(_)));
    }

    #[test]
    fn test_scan_real_directory() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("config")).unwrap();
        fs::write(temp.path().join("start.sh"), "java").unwrap();
        fs::write(temp.path().join("config/a.toml"), "a").unwrap();
        fs::write(temp.path().join(".hidden"), "h").unwrap();

        let tree = FileTree::scan(temp.path(), &ScanConfig::default()).unwrap();
        assert!(tree.contains("start.sh"));
        assert!(tree.contains("config/a.toml"));
        assert!(tree.contains(".hidden"));
        assert_eq!(tree.read_to_string("start.sh").unwrap(), "java");
    }

    #[test]
    fn test_scan_file_is_not_a_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("pack.zip");
        fs::write(&file, "zip").unwrap();

        let err = FileTree::scan(&file, &ScanConfig::default()).unwrap_err();
        assert!(matches!(err, DeployError::NotADirectory(_)));
    }
}
