use keyring::Entry;
use tracing::warn;

use super::{Credential, CredentialStore};

const SERVICE_NAME: &str = "tracegate";

/// Credential store backed by the OS keychain. The slot name is the
/// keychain account.
pub struct KeyringStore {
    slot: String,
}

impl KeyringStore {
    pub fn new(slot: &str) -> Self {
        Self {
            slot: slot.to_string(),
        }
    }

    fn entry(&self) -> Option<Entry> {
        match Entry::new(SERVICE_NAME, &self.slot) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(slot = %self.slot, error = %e, "Failed to create keyring entry");
                None
            }
        }
    }
}

impl CredentialStore for KeyringStore {
    fn get(&self) -> Option<Credential> {
        let entry = self.entry()?;
        match entry.get_password() {
            Ok(token) => Some(Credential::new(token)),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(slot = %self.slot, error = %e, "Failed to read credential from keychain");
                None
            }
        }
    }

    fn set(&self, credential: Credential) {
        if let Some(entry) = self.entry() {
            if let Err(e) = entry.set_password(credential.expose()) {
                warn!(slot = %self.slot, error = %e, "Failed to store credential in keychain");
            }
        }
    }

    fn clear(&self) {
        if let Some(entry) = self.entry() {
            match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => {
                    warn!(slot = %self.slot, error = %e, "Failed to delete credential from keychain");
                }
            }
        }
    }
}
