use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use thiserror::Error;

use crate::authentication::ClaimsError;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Credential storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Stored access token is invalid: {0}")]
    Claims(#[from] ClaimsError),
}

/// The well-known keys the credential pair is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    AccessToken,
    RefreshToken,
}

impl CredentialKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKey::AccessToken => "accessToken",
            CredentialKey::RefreshToken => "refreshToken",
        }
    }
}

/// Persistent key/value storage for the session credentials.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: CredentialKey) -> Result<Option<String>, SessionError>;

    fn set(&self, key: CredentialKey, value: &str) -> Result<(), SessionError>;

    fn remove(&self, key: CredentialKey) -> Result<(), SessionError>;
}

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    values: Mutex<HashMap<CredentialKey, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> SessionError {
    SessionError::StorageUnavailable("credential lock poisoned".to_string())
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: CredentialKey) -> Result<Option<String>, SessionError> {
        Ok(self.values.lock().map_err(poisoned)?.get(&key).cloned())
    }

    fn set(&self, key: CredentialKey, value: &str) -> Result<(), SessionError> {
        self.values.lock().map_err(poisoned)?.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: CredentialKey) -> Result<(), SessionError> {
        self.values.lock().map_err(poisoned)?.remove(&key);
        Ok(())
    }
}

/// Stores credentials as a JSON object in `<storage_dir>/<profile>.json`.
///
/// Writes go to a sibling temp file that is renamed into place, so a reader in
/// another process never sees a partially written file.
#[derive(Debug)]
pub struct FileCredentialStore {
    file_path: PathBuf,
    lock: Mutex<()>,
}

/// Returns `$HOME/.stockroom`.
pub fn default_storage_dir() -> Result<PathBuf, SessionError> {
    let home_dir = std::env::var("HOME")
        .map_err(|_| SessionError::StorageUnavailable("HOME is not set".to_string()))?;
    Ok(PathBuf::from(home_dir).join(".stockroom"))
}

impl FileCredentialStore {
    pub fn new(storage_dir: &Path, profile_name: &str) -> Self {
        Self {
            file_path: storage_dir.join(format!("{}.json", profile_name)),
            lock: Mutex::new(()),
        }
    }

    /// Opens the store for a profile under the default storage directory.
    pub fn for_profile(profile_name: &str) -> Result<Self, SessionError> {
        Ok(Self::new(&default_storage_dir()?, profile_name))
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, SessionError> {
        if !self.file_path.exists() {
            return Ok(BTreeMap::new());
        }

        let json_data = fs::read_to_string(&self.file_path)?;
        if json_data.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        Ok(serde_json::from_str(&json_data)?)
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(dir) = self.file_path.parent() {
            fs::create_dir_all(dir)?;
        }

        let json_data = serde_json::to_string_pretty(values)?;
        let temp_path = self.file_path.with_extension("json.tmp");
        fs::write(&temp_path, json_data)?;
        fs::rename(&temp_path, &self.file_path)?;
        Ok(())
    }

    fn update<F>(&self, change: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let _guard = self.lock.lock().map_err(poisoned)?;

        let mut values = self.read_all()?;
        if change(&mut values) {
            self.write_all(&values)?;
        }
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: CredentialKey) -> Result<Option<String>, SessionError> {
        let _guard = self.lock.lock().map_err(poisoned)?;
        Ok(self.read_all()?.remove(key.as_str()))
    }

    fn set(&self, key: CredentialKey, value: &str) -> Result<(), SessionError> {
        self.update(|values| {
            values.insert(key.as_str().to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: CredentialKey) -> Result<(), SessionError> {
        self.update(|values| values.remove(key.as_str()).is_some())
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    #[test]
    fn memory_store_round_trips_values() {
        let store = MemoryCredentialStore::new();

        store.set(CredentialKey::AccessToken, "at-1").unwrap();
        assert_eq!(store.get(CredentialKey::AccessToken).unwrap().as_deref(), Some("at-1"));
        assert_eq!(store.get(CredentialKey::RefreshToken).unwrap(), None);

        store.remove(CredentialKey::AccessToken).unwrap();
        assert_eq!(store.get(CredentialKey::AccessToken).unwrap(), None);
    }

    #[test]
    fn file_store_reads_missing_file_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path(), "default");

        assert_eq!(store.get(CredentialKey::AccessToken).unwrap(), None);
        store.remove(CredentialKey::RefreshToken).unwrap();
        assert!(!store.file_path().exists());
    }

    #[test]
    fn file_store_persists_under_well_known_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(&dir.path().join("nested"), "warehouse");

        store.set(CredentialKey::AccessToken, "at-1").unwrap();
        store.set(CredentialKey::RefreshToken, "rt-1").unwrap();

        let raw = fs::read_to_string(dir.path().join("nested").join("warehouse.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["accessToken"], "at-1");
        assert_eq!(json["refreshToken"], "rt-1");

        let reopened = FileCredentialStore::new(&dir.path().join("nested"), "warehouse");
        assert_eq!(reopened.get(CredentialKey::RefreshToken).unwrap().as_deref(), Some("rt-1"));
    }

    #[test]
    fn file_store_removes_only_the_requested_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path(), "default");
        store.set(CredentialKey::AccessToken, "at-1").unwrap();
        store.set(CredentialKey::RefreshToken, "rt-1").unwrap();

        store.remove(CredentialKey::AccessToken).unwrap();

        assert_eq!(store.get(CredentialKey::AccessToken).unwrap(), None);
        assert_eq!(store.get(CredentialKey::RefreshToken).unwrap().as_deref(), Some("rt-1"));
    }

    #[test]
    fn profiles_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let first = FileCredentialStore::new(dir.path(), "first");
        let second = FileCredentialStore::new(dir.path(), "second");

        first.set(CredentialKey::AccessToken, "at-first").unwrap();

        assert_eq!(second.get(CredentialKey::AccessToken).unwrap(), None);
    }

    #[test]
    fn reads_never_miss_a_token_while_it_is_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileCredentialStore::new(dir.path(), "default"));
        store.set(CredentialKey::AccessToken, "at-0").unwrap();

        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 1..=500 {
                    store.set(CredentialKey::AccessToken, &format!("at-{}", i)).unwrap();
                }
            })
        };

        let mut missing = 0;
        while !writer.is_finished() {
            if store.get(CredentialKey::AccessToken).unwrap().is_none() {
                missing += 1;
            }
        }
        writer.join().unwrap();

        assert_eq!(missing, 0);
        assert_eq!(store.get(CredentialKey::AccessToken).unwrap().as_deref(), Some("at-500"));
        assert!(!dir.path().join("default.json.tmp").exists());
    }

    #[test]
    fn other_process_readers_see_complete_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileCredentialStore::new(dir.path(), "default"));
        store.set(CredentialKey::AccessToken, "at-0").unwrap();
        let file_path = store.file_path().to_path_buf();

        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 1..=500 {
                    store.set(CredentialKey::RefreshToken, &format!("rt-{}", i)).unwrap();
                }
            })
        };

        // a second store on the same file shares no lock with the writer
        let reader = FileCredentialStore::new(dir.path(), "default");
        while !writer.is_finished() {
            assert_eq!(reader.get(CredentialKey::AccessToken).unwrap().as_deref(), Some("at-0"));
        }
        writer.join().unwrap();

        assert!(file_path.exists());
    }
}
