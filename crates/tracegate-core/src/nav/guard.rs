use std::sync::Arc;

use tracing::debug;

use super::route::{with_query, Route};
use crate::auth::CredentialStore;

/// Query parameter carrying the originally requested location to login.
pub const REDIRECT_PARAM: &str = "redirect";

/// Result of a guard. Returning it is the single continuation of a
/// transition: every call produces exactly one outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Allow,
    Redirect(String),
    Abort,
}

/// A check run before every route transition.
pub trait Guard: Send + Sync {
    /// `from` is the location being left, if any.
    fn check(&self, to: &Route, from: Option<&Route>) -> Outcome;
}

/// Admits protected routes only with a stored credential and keeps a
/// signed-in user off the login page.
pub struct AuthGuard {
    store: Arc<dyn CredentialStore>,
    login_path: String,
    home_path: String,
}

impl AuthGuard {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        login_path: impl Into<String>,
        home_path: impl Into<String>,
    ) -> Self {
        Self {
            store,
            login_path: login_path.into(),
            home_path: home_path.into(),
        }
    }
}

impl Guard for AuthGuard {
    fn check(&self, to: &Route, _from: Option<&Route>) -> Outcome {
        let signed_in = self.store.is_present();

        let outcome = if to.requires_auth {
            if signed_in {
                Outcome::Allow
            } else {
                Outcome::Redirect(with_query(
                    &self.login_path,
                    &[(REDIRECT_PARAM, to.full_path.as_str())],
                ))
            }
        } else if to.path == self.login_path && signed_in {
            Outcome::Redirect(self.home_path.clone())
        } else {
            Outcome::Allow
        };

        debug!(to = %to.full_path, signed_in, ?outcome, "Route guard evaluated");
        outcome
    }
}
