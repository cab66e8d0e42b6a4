use crate::errors::WireplayError;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Filesystem seam used by mode resolution and the server pool. The fixture
/// store itself (what the mock engine writes under `mappings/`) is outside
/// this crate; the pool only needs existence checks, eager directory
/// creation, and recursive deletion for reset-then-record.
pub trait FileSystem: Send + Sync {
    fn read_to_string(&self, path: &Path) -> Result<String, WireplayError>;
    fn create_dir_all(&self, path: &Path) -> Result<(), WireplayError>;
    fn remove_dir_all(&self, path: &Path) -> Result<(), WireplayError>;
    fn dir_exists(&self, path: &Path) -> bool;
}

pub struct ProductionFileSystem;

impl FileSystem for ProductionFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, WireplayError> {
        std::fs::read_to_string(path).map_err(|e| WireplayError::Io(e.to_string()))
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), WireplayError> {
        std::fs::create_dir_all(path).map_err(|e| WireplayError::Io(e.to_string()))
    }

    fn remove_dir_all(&self, path: &Path) -> Result<(), WireplayError> {
        std::fs::remove_dir_all(path).map_err(|e| WireplayError::Io(e.to_string()))
    }

    fn dir_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

#[derive(Default, Clone)]
pub struct FakeFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, String>>>,
    dirs: Arc<Mutex<HashSet<PathBuf>>>,
    fail_next: Arc<Mutex<Option<WireplayError>>>,
}

impl FakeFileSystem {
    pub fn with_file(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        let fs = Self::default();
        fs.files
            .lock()
            .expect("files lock")
            .insert(path.into(), contents.into());
        fs
    }

    pub fn with_dir(path: impl Into<PathBuf>) -> Self {
        let fs = Self::default();
        fs.dirs.lock().expect("dirs lock").insert(path.into());
        fs
    }

    pub fn add_dir(&self, path: impl Into<PathBuf>) {
        self.dirs.lock().expect("dirs lock").insert(path.into());
    }

    pub fn set_fail_next(&self, error: WireplayError) {
        *self.fail_next.lock().expect("fail lock") = Some(error);
    }

    fn maybe_fail(&self) -> Result<(), WireplayError> {
        if let Some(err) = self.fail_next.lock().expect("fail lock").take() {
            return Err(err);
        }
        Ok(())
    }
}

impl FileSystem for FakeFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, WireplayError> {
        self.maybe_fail()?;
        self.files
            .lock()
            .expect("files lock")
            .get(path)
            .cloned()
            .ok_or_else(|| WireplayError::Io(format!("missing file {}", path.display())))
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), WireplayError> {
        self.maybe_fail()?;
        let mut dirs = self.dirs.lock().expect("dirs lock");
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            dirs.insert(current.clone());
        }
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<(), WireplayError> {
        self.maybe_fail()?;
        self.dirs
            .lock()
            .expect("dirs lock")
            .retain(|dir| !dir.starts_with(path));
        self.files
            .lock()
            .expect("files lock")
            .retain(|file, _| !file.starts_with(path));
        Ok(())
    }

    fn dir_exists(&self, path: &Path) -> bool {
        self.dirs.lock().expect("dirs lock").contains(path)
    }
}
