use std::{
    collections::HashMap,
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use eventdesk_shared::User;
use serde::{Deserialize, Serialize};

use crate::SessionError;

/// The durable part of a session. Never carries the loading flag.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PersistedSession {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub token: Option<String>,
}

pub trait SessionStorage: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<PersistedSession>, SessionError>;
    fn save(&self, key: &str, record: &PersistedSession) -> Result<(), SessionError>;
    fn remove(&self, key: &str) -> Result<(), SessionError>;
}

/// One JSON file per key inside `dir`.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SessionStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<PersistedSession>, SessionError> {
        let content = match fs::read_to_string(self.path(key)) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&self, key: &str, record: &PersistedSession) -> Result<(), SessionError> {
        let content = serde_json::to_vec_pretty(record)?;
        write_atomic(&self.path(key), &content)?;
        tracing::debug!(key, "session record saved");

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Writes `content` next to `path`, flushes it to disk and renames it into
/// place so readers never observe a torn file.
pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(&tmp)?;
    file.write_all(content)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp, path)
}

/// Keeps records as JSON text in memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn raw(&self, key: &str) -> Option<String> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn insert_raw(&self, key: &str, content: impl Into<String>) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), content.into());
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<PersistedSession>, SessionError> {
        self.raw(key)
            .map(|content| serde_json::from_str(&content))
            .transpose()
            .map_err(SessionError::from)
    }

    fn save(&self, key: &str, record: &PersistedSession) -> Result<(), SessionError> {
        self.insert_raw(key, serde_json::to_string(record)?);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}
