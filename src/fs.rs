//! Filesystem abstraction used by the config reader and the starter-config
//! writer.
//!
//! [`OsFs`] talks to the real filesystem. [`MemoryFs`] keeps everything in a
//! map so resolution can be exercised without touching disk.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

pub trait FileSystem {
    /// Read a whole file. A missing file must report `io::ErrorKind::NotFound`.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Open a file for streaming reads, with the same `NotFound` contract as
    /// [`read_to_string`](Self::read_to_string).
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>>;

    /// Whether `path` exists and is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// The operating system filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl FileSystem for OsFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(std::fs::File::open(path)?))
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        std::fs::write(path, contents)
    }
}

/// An in-memory filesystem. Paths are normalized lexically (`.` and `..`
/// are folded) but never canonicalized.
#[derive(Debug, Default)]
pub struct MemoryFs {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating its parent directories.
    pub fn with_file(self, path: impl AsRef<Path>, contents: &str) -> Self {
        let path = normalize(path.as_ref());
        {
            let mut state = self.lock();
            if let Some(parent) = path.parent() {
                add_dirs(&mut state.dirs, parent);
            }
            state.files.insert(path, contents.to_string());
        }
        self
    }

    pub fn is_dir(&self, path: &Path) -> bool {
        self.lock().dirs.contains(&normalize(path))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // A panic while holding the lock cannot leave the maps half-updated.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl FileSystem for MemoryFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.lock()
            .files
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        let contents = self.read_to_string(path)?;
        Ok(Box::new(io::Cursor::new(contents.into_bytes())))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.lock().files.contains_key(&normalize(path))
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let path = normalize(path);
        let mut state = self.lock();
        if state.files.contains_key(&path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} is a file", path.display()),
            ));
        }
        add_dirs(&mut state.dirs, &path);
        Ok(())
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let path = normalize(path);
        let mut state = self.lock();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !state.dirs.contains(parent)
        {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("parent directory {} does not exist", parent.display()),
            ));
        }
        state.files.insert(path, contents.to_string());
        Ok(())
    }
}

fn add_dirs(dirs: &mut BTreeSet<PathBuf>, path: &Path) {
    for ancestor in path.ancestors() {
        if ancestor.as_os_str().is_empty() {
            break;
        }
        dirs.insert(ancestor.to_path_buf());
    }
}

/// Fold `.` and `..` components without consulting the filesystem.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_read_missing_is_not_found() {
        let fs = MemoryFs::new();
        let err = fs.read_to_string(Path::new("/nope.json")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn memory_with_file_is_readable() {
        let fs = MemoryFs::new().with_file("/home/u/.app.json", "{}");
        assert!(fs.is_file(Path::new("/home/u/.app.json")));
        assert!(fs.is_dir(Path::new("/home/u")));
        assert_eq!(fs.read_to_string(Path::new("/home/u/.app.json")).unwrap(), "{}");
    }

    #[test]
    fn memory_open_streams_contents() {
        let fs = MemoryFs::new().with_file("/in/data.json", "{\"a\": 1}");
        let mut buf = String::new();
        fs.open(Path::new("/in/./data.json"))
            .unwrap()
            .read_to_string(&mut buf)
            .unwrap();
        assert_eq!(buf, "{\"a\": 1}");
        let err = fs.open(Path::new("/in/other.json")).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn memory_paths_are_normalized() {
        let fs = MemoryFs::new().with_file("/work/./proj/../.app.toml", "a = 1");
        assert!(fs.is_file(Path::new("/work/.app.toml")));
    }

    #[test]
    fn memory_write_requires_parent() {
        let fs = MemoryFs::new();
        let path = Path::new("/out/sub/config.yaml");
        assert!(fs.write(path, "x: 1").is_err());
        fs.create_dir_all(path.parent().unwrap()).unwrap();
        fs.write(path, "x: 1").unwrap();
        assert_eq!(fs.read_to_string(path).unwrap(), "x: 1");
    }

    #[test]
    fn os_fs_round_trips_through_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        OsFs.create_dir_all(path.parent().unwrap()).unwrap();
        OsFs.write(&path, "port = 1").unwrap();
        assert!(OsFs.is_file(&path));
        assert_eq!(OsFs.read_to_string(&path).unwrap(), "port = 1");
        let mut buf = String::new();
        OsFs.open(&path).unwrap().read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "port = 1");
    }

    #[test]
    fn normalize_folds_dots() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
    }
}
