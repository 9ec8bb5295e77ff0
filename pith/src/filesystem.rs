//! Host file access.
//!
//! The runtime never touches the OS directly; the embedding host supplies
//! a [`FileSystem`]. [`MemoryFileSystem`] is provided for tests and for
//! hosts that keep projects in memory.

use std::{
    collections::BTreeMap,
    io,
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use parking_lot::RwLock;

/// File operations the runtime delegates to its host.
pub trait FileSystem {
    /// Read a whole file as text.
    fn read_file(&self, path: &Path) -> io::Result<String>;

    /// Create or truncate a file with `contents`.
    fn write_file(&self, path: &Path, contents: &str) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;

    /// Full paths of the entries directly inside `path`.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;
}

/// An in-memory file system.
///
/// Clones share the same storage, so a test can keep a handle and
/// inspect what the runtime wrote. Directories exist implicitly when a
/// file lives below them.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: Arc<RwLock<BTreeMap<PathBuf, String>>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a file system pre-populated with `(path, contents)` pairs.
    pub fn with_files<I, P, S>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, S)>,
        P: AsRef<Path>,
        S: Into<String>,
    {
        let fs = Self::new();
        {
            let mut map = fs.files.write();
            for (path, contents) in files {
                map.insert(normalize(path.as_ref()), contents.into());
            }
        }
        fs
    }

    pub fn file_count(&self) -> usize {
        self.files.read().len()
    }
}

/// Drops `.` components and resolves `..` lexically.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} not found", path.display()),
    )
}

impl FileSystem for MemoryFileSystem {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        self.files
            .read()
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| not_found(path))
    }

    fn write_file(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.files
            .write()
            .insert(normalize(path), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let path = normalize(path);
        let files = self.files.read();
        files.contains_key(&path) || files.keys().any(|file| file.starts_with(&path))
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let dir = normalize(path);
        let files = self.files.read();
        let mut entries: Vec<PathBuf> = Vec::new();
        for file in files.keys() {
            let Ok(rest) = file.strip_prefix(&dir) else {
                continue;
            };
            let Some(first) = rest.components().next() else {
                continue;
            };
            let entry = dir.join(first);
            if !entries.contains(&entry) {
                entries.push(entry);
            }
        }
        if entries.is_empty() && !files.contains_key(&dir) && !dir.as_os_str().is_empty() {
            return Err(not_found(path));
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read() {
        let fs = MemoryFileSystem::new();
        fs.write_file(Path::new("/a/b.txt"), "hi").unwrap();
        assert_eq!(fs.read_file(Path::new("/a/b.txt")).unwrap(), "hi");
        assert!(fs.read_file(Path::new("/a/c.txt")).is_err());
    }

    #[test]
    fn directories_are_implicit() {
        let fs = MemoryFileSystem::with_files([("/p/pith/runtime.pith", "x")]);
        assert!(fs.exists(Path::new("/p")));
        assert!(fs.exists(Path::new("/p/pith")));
        assert!(!fs.exists(Path::new("/q")));
    }

    #[test]
    fn list_dir_returns_direct_children_once() {
        let fs = MemoryFileSystem::with_files([
            ("/d/one.txt", ""),
            ("/d/sub/two.txt", ""),
            ("/d/sub/three.txt", ""),
        ]);
        let entries = fs.list_dir(Path::new("/d")).unwrap();
        assert_eq!(
            entries,
            vec![PathBuf::from("/d/one.txt"), PathBuf::from("/d/sub")]
        );
        assert!(fs.list_dir(Path::new("/missing")).is_err());
    }

    #[test]
    fn clones_share_storage() {
        let fs = MemoryFileSystem::new();
        let other = fs.clone();
        fs.write_file(Path::new("./x/../y.txt"), "y").unwrap();
        assert_eq!(other.read_file(Path::new("y.txt")).unwrap(), "y");
        assert_eq!(other.file_count(), 1);
    }
}
