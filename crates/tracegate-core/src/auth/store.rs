use std::sync::RwLock;

use super::Credential;

/// A persistent single-slot holder for the session credential.
///
/// Every operation is atomic on its own and none of them can fail: a backend
/// that cannot read its slot reports the credential as absent, and write or
/// delete problems are logged. Callers never read-modify-write the slot, so
/// no multi-operation transactions are offered.
pub trait CredentialStore: Send + Sync {
    /// Current credential, if any.
    fn get(&self) -> Option<Credential>;

    /// Replace whatever is stored.
    fn set(&self, credential: Credential);

    /// Remove the stored credential. Clearing an empty store is a no-op.
    fn clear(&self);

    fn is_present(&self) -> bool {
        self.get().is_some()
    }
}

/// In-process store. Does not survive a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: RwLock<Option<Credential>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: RwLock::new(Some(credential)),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self) -> Option<Credential> {
        self.slot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set(&self, credential: Credential) {
        *self
            .slot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(credential);
    }

    fn clear(&self) {
        self.slot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
    }
}
