//! File attachments stored next to the database.
//!
//! Files live under `<root>/<collection>/<record_id>/<stored_name>`. Writes
//! are staged: files written during a transaction are removed again if it
//! rolls back, and files they replace are only deleted once it commits.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::ids;

/// Length of the random suffix appended to stored file names.
const SUFFIX_LENGTH: usize = 10;

/// A file about to be attached to a record.
#[derive(Clone, PartialEq, Eq)]
pub struct NewFile {
    /// Original file name, used to derive the stored name.
    pub name: String,
    pub content: Vec<u8>,
}

impl NewFile {
    pub fn from_bytes(content: Vec<u8>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    /// Read a file from disk, keeping its file name.
    pub fn from_path(path: &Path) -> Result<Self, StoreError> {
        let content = fs::read(path).map_err(|source| StoreError::File {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        Ok(Self { name, content })
    }
}

impl std::fmt::Debug for NewFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewFile")
            .field("name", &self.name)
            .field("len", &self.content.len())
            .finish()
    }
}

#[derive(Debug, Default)]
struct Staged {
    written: Vec<PathBuf>,
    replaced: Vec<PathBuf>,
}

/// On-disk attachment storage with transaction-scoped staging.
#[derive(Debug)]
pub struct FileStorage {
    root: PathBuf,
    staged: RefCell<Staged>,
}

impl FileStorage {
    /// Open storage rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::File {
            path: root.clone(),
            source,
        })?;
        Ok(Self {
            root,
            staged: RefCell::new(Staged::default()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn record_dir(&self, collection: &str, record_id: &str) -> PathBuf {
        self.root.join(collection).join(record_id)
    }

    pub fn path_of(&self, collection: &str, record_id: &str, stored_name: &str) -> PathBuf {
        self.record_dir(collection, record_id).join(stored_name)
    }

    /// Write `file` for a record and return its stored name.
    ///
    /// `previous` is the stored name currently held by the field (empty when
    /// none); it is scheduled for deletion on commit.
    pub fn attach(
        &self,
        collection: &str,
        record_id: &str,
        previous: &str,
        file: &NewFile,
    ) -> Result<String, StoreError> {
        let dir = self.record_dir(collection, record_id);
        fs::create_dir_all(&dir).map_err(|source| StoreError::File {
            path: dir.clone(),
            source,
        })?;

        let stored_name = stored_file_name(&file.name);
        let path = dir.join(&stored_name);
        fs::write(&path, &file.content).map_err(|source| StoreError::File {
            path: path.clone(),
            source,
        })?;
        log::debug!("Stored {} ({} bytes)", path.display(), file.content.len());

        let mut staged = self.staged.borrow_mut();
        staged.written.push(path);
        if !previous.is_empty() && previous != stored_name {
            staged.replaced.push(dir.join(previous));
        }
        Ok(stored_name)
    }

    /// Read back the content of a stored file.
    pub fn read(
        &self,
        collection: &str,
        record_id: &str,
        stored_name: &str,
    ) -> Result<Vec<u8>, StoreError> {
        let path = self.path_of(collection, record_id, stored_name);
        fs::read(&path).map_err(|source| StoreError::File { path, source })
    }

    /// Make staged writes permanent and delete replaced files.
    pub fn commit(&self) {
        let staged = std::mem::take(&mut *self.staged.borrow_mut());
        for path in staged.replaced {
            if let Err(e) = fs::remove_file(&path) {
                log::warn!("Failed to remove replaced file {}: {}", path.display(), e);
            }
        }
    }

    /// Remove files written since the last commit.
    pub fn rollback(&self) {
        let staged = std::mem::take(&mut *self.staged.borrow_mut());
        for path in staged.written.iter().rev() {
            if let Err(e) = fs::remove_file(path) {
                log::warn!("Failed to remove staged file {}: {}", path.display(), e);
                continue;
            }
            // Drops the record directory only if nothing else is in it.
            if let Some(dir) = path.parent() {
                let _ = fs::remove_dir(dir);
            }
        }
    }

    /// Number of files written but not yet committed.
    pub fn pending(&self) -> usize {
        self.staged.borrow().written.len()
    }
}

/// Build `<stem>_<random>.<ext>` from an original file name.
fn stored_file_name(original: &str) -> String {
    let (stem, ext) = match original.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (original, None),
    };

    let mut clean: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if clean.is_empty() {
        clean.push_str("file");
    }

    let suffix = ids::random_string(SUFFIX_LENGTH);
    match ext {
        Some(ext) => format!("{}_{}.{}", clean, suffix, ext.to_ascii_lowercase()),
        None => format!("{}_{}", clean, suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_name_shape() {
        let name = stored_file_name("Iron Blade.PNG");
        assert!(name.starts_with("iron_blade_"), "{name}");
        assert!(name.ends_with(".png"), "{name}");
        assert_eq!(
            name.len(),
            "iron_blade_".len() + SUFFIX_LENGTH + ".png".len()
        );
    }

    #[test]
    fn stored_name_without_extension() {
        let name = stored_file_name("seed");
        assert!(name.starts_with("seed_"));
        assert!(!name.contains('.'));
    }

    #[test]
    fn rollback_removes_written_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let file = NewFile::from_bytes(vec![1, 2, 3], "x.png");
        let stored = storage.attach("weapons", "abc", "", &file).unwrap();
        let path = storage.path_of("weapons", "abc", &stored);
        assert!(path.exists());

        storage.rollback();
        assert!(!path.exists());
        assert!(!storage.record_dir("weapons", "abc").exists());
    }

    #[test]
    fn commit_deletes_replaced_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let first = storage
            .attach("weapons", "abc", "", &NewFile::from_bytes(vec![1], "a.png"))
            .unwrap();
        storage.commit();

        let file = NewFile::from_bytes(vec![2], "b.png");
        let second = storage.attach("weapons", "abc", &first, &file).unwrap();
        assert!(storage.path_of("weapons", "abc", &first).exists());
        storage.commit();

        assert!(!storage.path_of("weapons", "abc", &first).exists());
        assert_eq!(storage.read("weapons", "abc", &second).unwrap(), vec![2]);
        assert_eq!(storage.pending(), 0);
    }
}
