//! Credential storage for authenticated sessions.
//!
//! This module provides:
//! - `Credential`: the opaque bearer token proving an authenticated session
//! - `CredentialStore`: a single-slot holder shared by the HTTP pipeline and
//!   the navigation guard
//! - `MemoryStore`, `FileStore`, `KeyringStore`: in-process, on-disk and
//!   OS keychain backends
//!
//! Presence of a credential is the only "authenticated" signal. Nothing here
//! tracks expiry; the remote service reports it with a 401.

pub mod credentials;
pub mod file_store;
pub mod keyring_store;
pub mod store;

use std::path::Path;
use std::sync::Arc;

pub use credentials::Credential;
pub use file_store::FileStore;
pub use keyring_store::KeyringStore;
pub use store::{CredentialStore, MemoryStore};

use crate::config::StoreBackend;

/// Open the store for a named slot using the configured backend.
pub fn open_store(backend: StoreBackend, slot: &str, dir: &Path) -> Arc<dyn CredentialStore> {
    match backend {
        StoreBackend::File => Arc::new(FileStore::new(dir.to_path_buf(), slot)),
        StoreBackend::Keyring => Arc::new(KeyringStore::new(slot)),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    }
}
