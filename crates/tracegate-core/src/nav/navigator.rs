use std::sync::Mutex;

use tracing::debug;

/// Access to the current location and a way to force a full navigation.
pub trait Navigator: Send + Sync {
    /// Current location: path plus query string, if any.
    fn location(&self) -> String;

    /// Leave the current location for `target`, bypassing guards.
    fn navigate(&self, target: &str);

    /// Path component of the current location.
    fn current_path(&self) -> String {
        path_of(&self.location()).to_string()
    }
}

/// Strip the query string and fragment from a location.
pub(crate) fn path_of(location: &str) -> &str {
    let end = location.find(['?', '#']).unwrap_or(location.len());
    &location[..end]
}

/// In-process navigator that records every location it has visited.
#[derive(Debug)]
pub struct HistoryNavigator {
    entries: Mutex<Vec<String>>,
}

impl HistoryNavigator {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: Mutex::new(vec![initial.into()]),
        }
    }

    /// Every location entered after the initial one, oldest first.
    pub fn visits(&self) -> Vec<String> {
        let entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.iter().skip(1).cloned().collect()
    }
}

impl Navigator for HistoryNavigator {
    fn location(&self) -> String {
        let entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.last().cloned().unwrap_or_else(|| "/".to_string())
    }

    fn navigate(&self, target: &str) {
        debug!(%target, "Navigating");
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(target.to_string());
    }
}
