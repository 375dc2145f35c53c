//! HTTP client for the tracegate backend.
//!
//! `HttpClient` owns a pooled `reqwest::Client`, the fixed API base address
//! and the interceptor chain that wraps every call.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use super::{ApiError, Interceptor, InterceptorChain};

/// Default timeout for requests. Elapsing it is a transport failure, not an
/// authorization rejection.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Path prefix every API call is sent under.
pub const DEFAULT_API_PREFIX: &str = "/api";

/// Clone is cheap: the reqwest client and the chain are reference counted.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    interceptors: Arc<InterceptorChain>,
}

impl HttpClient {
    /// Create a client for `origin` + `api_prefix` with no interceptors.
    pub fn new(origin: &str, api_prefix: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("client setup: {}", e)))?;
        let base = format!(
            "{}/{}/",
            origin.trim_end_matches('/'),
            api_prefix.trim_matches('/')
        );
        let base_url = Url::parse(&base).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base, e)))?;

        Ok(Self {
            client,
            base_url,
            interceptors: Arc::new(InterceptorChain::new()),
        })
    }

    /// Append an interceptor to the end of the chain.
    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        Arc::make_mut(&mut self.interceptors).push(interceptor);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an API path (with or without a leading slash) against the base.
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Start a request. Send it with [`HttpClient::send`] so the
    /// interceptors run.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.client.request(method, self.url(path)?))
    }

    /// Run the outbound hooks, send, map non-success statuses to
    /// [`ApiError`], run the inbound hooks and hand the outcome back.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let mut request = builder
            .build()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.interceptors.before_send(&mut request);

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "Sending request");

        let outcome = match self.client.execute(request).await {
            Ok(response) => Self::check_response(response).await,
            Err(e) => Err(ApiError::Network(e)),
        };
        if let Err(ref e) = outcome {
            debug!(%method, %url, error = %e, "Request failed");
        }

        self.interceptors.after_receive(&outcome);
        outcome
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", path, e)))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, path)?).await?;
        Self::parse_json(response, path).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::POST, path)?.json(body)).await?;
        Self::parse_json(response, path).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::PUT, path)?.json(body)).await?;
        Self::parse_json(response, path).await
    }

    /// DELETE, discarding any response body.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, path)?).await?;
        Ok(())
    }
}
