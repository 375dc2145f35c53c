//! Client-side session and navigation guard layer for the tracegate
//! front-ends.
//!
//! The credential store is the only shared state. The HTTP pipeline
//! ([`api`]) attaches it to every call and evicts it when the server answers
//! 401; the router ([`nav`]) consults it before every route transition.

pub mod api;
pub mod auth;
pub mod config;
pub mod gate;
pub mod nav;
pub mod surface;

pub use api::{ApiError, HttpClient};
pub use auth::{Credential, CredentialStore};
pub use config::{Config, StoreBackend};
pub use gate::Gate;
pub use nav::{Navigation, Navigator, Router, RouterError};
pub use surface::Surface;
