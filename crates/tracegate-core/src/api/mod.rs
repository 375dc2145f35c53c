//! HTTP client and request interceptor pipeline.
//!
//! Every outbound call made through `HttpClient` passes through an ordered
//! chain of interceptors. The session interceptors attach the stored
//! credential as a bearer token and, when the remote service answers 401,
//! evict it and send the user back to the login destination.

pub mod client;
pub mod error;
pub mod interceptor;

pub use client::HttpClient;
pub use error::ApiError;
pub use interceptor::{BearerAuth, Interceptor, InterceptorChain, SessionExpiry};
