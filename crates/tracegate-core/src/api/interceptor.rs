//! Hooks run around every outbound call.
//!
//! An interceptor sees the request just before it is sent and the outcome
//! right after it is known. Interceptors observe and annotate; they never
//! swallow a failure or introduce a new one, so the caller always receives
//! exactly what the transport and the remote service produced.

use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Request, Response};
use tracing::{debug, info, warn};

use super::ApiError;
use crate::auth::CredentialStore;
use crate::nav::Navigator;

pub trait Interceptor: Send + Sync {
    /// Outbound hook. Runs before the request is handed to the transport.
    fn on_request(&self, _request: &mut Request) {}

    /// Inbound hook for a successful response.
    fn on_response(&self, _response: &Response) {}

    /// Inbound hook for a failed call, remote or transport.
    fn on_error(&self, _error: &ApiError) {}
}

/// Ordered list of interceptors. Both hooks run in registration order.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.interceptors.push(interceptor);
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub fn before_send(&self, request: &mut Request) {
        for interceptor in &self.interceptors {
            interceptor.on_request(request);
        }
    }

    pub fn after_receive(&self, outcome: &Result<Response, ApiError>) {
        for interceptor in &self.interceptors {
            match outcome {
                Ok(response) => interceptor.on_response(response),
                Err(error) => interceptor.on_error(error),
            }
        }
    }
}

/// Attaches the stored credential as `Authorization: Bearer <token>`.
/// With an empty store the request goes out untouched; the server decides.
pub struct BearerAuth {
    store: Arc<dyn CredentialStore>,
}

impl BearerAuth {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }
}

impl Interceptor for BearerAuth {
    fn on_request(&self, request: &mut Request) {
        let Some(credential) = self.store.get() else {
            debug!(url = %request.url(), "No credential, sending unauthenticated");
            return;
        };
        match HeaderValue::from_str(&credential.bearer()) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers_mut().insert(AUTHORIZATION, value);
            }
            Err(_) => {
                warn!(url = %request.url(), "Stored credential is not a valid header value, sending unauthenticated");
            }
        }
    }
}

/// Reacts to a 401 by evicting the credential and forcing navigation to the
/// login destination. Safe to run any number of times: clearing an empty
/// store is a no-op and the redirect is skipped when already on login.
pub struct SessionExpiry {
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    login_path: String,
}

impl SessionExpiry {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
        login_path: impl Into<String>,
    ) -> Self {
        Self {
            store,
            navigator,
            login_path: login_path.into(),
        }
    }
}

impl Interceptor for SessionExpiry {
    fn on_error(&self, error: &ApiError) {
        if !error.is_unauthorized() {
            return;
        }
        info!("Credential rejected by server, clearing session");
        self.store.clear();

        let current = self.navigator.current_path();
        if current != self.login_path {
            info!(from = %current, to = %self.login_path, "Redirecting to login");
            self.navigator.navigate(&self.login_path);
        }
    }
}
