//! Wiring of one front-end surface.
//!
//! A `Gate` shares a single credential store between the HTTP pipeline and
//! the router guard, and a single navigator between the session-expiry
//! interceptor and the router.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::api::{ApiError, BearerAuth, HttpClient, SessionExpiry};
use crate::auth::{open_store, Credential, CredentialStore};
use crate::config::Config;
use crate::nav::{AuthGuard, Navigation, Navigator, Router, RouterError};
use crate::surface::Surface;

pub struct Gate {
    surface: Surface,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    http: HttpClient,
    router: Router,
}

impl Gate {
    /// Build a gate with the configured credential backend.
    pub fn new(surface: Surface, config: &Config, navigator: Arc<dyn Navigator>) -> Result<Self> {
        let store = open_store(config.store, &surface.storage_key, &config.credential_dir()?);
        Ok(Self::with_parts(surface, config, store, navigator)?)
    }

    pub fn with_parts(
        surface: Surface,
        config: &Config,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let http = HttpClient::new(&config.origin, &surface.api_prefix, config.timeout())?
            .with_interceptor(Arc::new(BearerAuth::new(store.clone())))
            .with_interceptor(Arc::new(SessionExpiry::new(
                store.clone(),
                navigator.clone(),
                surface.login_path.clone(),
            )));

        let router = Router::new(surface.route_table(), navigator.clone(), surface.home_path.clone())
            .before_each(Arc::new(AuthGuard::new(
                store.clone(),
                surface.login_path.clone(),
                surface.home_path.clone(),
            )));

        Ok(Self {
            surface,
            store,
            navigator,
            http,
            router,
        })
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.is_present()
    }

    /// Store a credential obtained by the login flow and leave the login page.
    pub fn login(&self, credential: Credential) -> Result<Navigation, RouterError> {
        self.store.set(credential);
        info!(surface = %self.surface.name, "Signed in");
        self.router.after_login()
    }

    /// Drop the credential and return to the login page.
    pub fn logout(&self) -> Result<Navigation, RouterError> {
        self.store.clear();
        info!(surface = %self.surface.name, "Signed out");
        self.router.push(&self.surface.login_path)
    }
}
