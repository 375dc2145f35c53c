use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of leading characters shown when a credential is debug-printed.
const VISIBLE_PREFIX_CHARS: usize = 4;

/// Opaque session token. Its contents are never interpreted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for placing on the wire.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Value for an `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(VISIBLE_PREFIX_CHARS).collect();
        write!(f, "Credential({}***)", prefix)
    }
}
