use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::{Credential, CredentialStore};

/// On-disk layout of a credential slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SlotData {
    token: Credential,
    stored_at: DateTime<Utc>,
}

/// Credential store backed by one JSON file per slot, so a session survives
/// restarts of the process.
pub struct FileStore {
    dir: PathBuf,
    slot: String,
}

impl FileStore {
    pub fn new(dir: PathBuf, slot: &str) -> Self {
        Self {
            dir,
            slot: slot.to_string(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.slot))
    }

    fn load(&self) -> Result<Option<SlotData>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .context("Failed to read credential file")?;
        let data = serde_json::from_str(&contents)
            .context("Failed to parse credential file")?;
        Ok(Some(data))
    }

    /// Write through a uniquely named sibling temp file so readers never see
    /// a partial slot and concurrent writers never share a temp file.
    fn save(&self, data: &SlotData) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .context("Failed to create credential directory")?;
        let contents = serde_json::to_string_pretty(data)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)
            .context("Failed to create temporary credential file")?;
        tmp.write_all(contents.as_bytes())
            .context("Failed to write credential file")?;
        tmp.persist(self.path())
            .map_err(|e| e.error)
            .context("Failed to replace credential file")?;
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        match std::fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to delete credential file"),
        }
    }
}

impl CredentialStore for FileStore {
    fn get(&self) -> Option<Credential> {
        match self.load() {
            Ok(data) => data.map(|d| d.token),
            Err(e) => {
                warn!(slot = %self.slot, error = %e, "Unreadable credential slot, treating as empty");
                None
            }
        }
    }

    fn set(&self, credential: Credential) {
        let data = SlotData {
            token: credential,
            stored_at: Utc::now(),
        };
        if let Err(e) = self.save(&data) {
            warn!(slot = %self.slot, error = %e, "Failed to persist credential");
        } else {
            debug!(slot = %self.slot, "Credential stored");
        }
    }

    fn clear(&self) {
        if let Err(e) = self.remove() {
            warn!(slot = %self.slot, error = %e, "Failed to clear credential");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        FileStore::new(dir.path().to_path_buf(), "admin_token").set(Credential::new("tok-1"));

        let reopened = FileStore::new(dir.path().to_path_buf(), "admin_token");
        assert_eq!(reopened.get(), Some(Credential::new("tok-1")));
        assert!(reopened.path().ends_with("admin_token.json"));
    }

    #[test]
    fn test_slots_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let admin = FileStore::new(dir.path().to_path_buf(), "admin_token");
        let mobile = FileStore::new(dir.path().to_path_buf(), "h5_token");

        admin.set(Credential::new("admin"));
        assert!(mobile.get().is_none());
        assert_eq!(admin.get(), Some(Credential::new("admin")));
    }

    #[test]
    fn test_clear_missing_file_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"), "admin_token");
        store.clear();
        store.set(Credential::new("tok"));
        store.clear();
        store.clear();
        assert!(store.get().is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_corrupt_file_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf(), "admin_token");
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(store.get().is_none());

        store.set(Credential::new("fresh"));
        assert_eq!(store.get(), Some(Credential::new("fresh")));
    }

    #[test]
    fn test_concurrent_writers_on_one_slot() {
        let dir = tempfile::tempdir().unwrap();
        let dir_path = dir.path().to_path_buf();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let dir_path = dir_path.clone();
                std::thread::spawn(move || {
                    let store = FileStore::new(dir_path, "admin_token");
                    for round in 0..25 {
                        let data = SlotData {
                            token: Credential::new(format!("tok-{}-{}", i, round)),
                            stored_at: Utc::now(),
                        };
                        store.save(&data).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let store = FileStore::new(dir_path.clone(), "admin_token");
        let token = store.get().unwrap();
        assert!(token.expose().starts_with("tok-"));

        let leftovers: Vec<_> = std::fs::read_dir(&dir_path)
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("admin_token.json")]);
    }
}
