//! Transport seam and the interception shim that diverts matching calls.

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::time::sleep;
use tracing::info;
use url::Url;

use crate::request::{RequestDescriptor, RequestOptions};
use crate::response::Response;
use crate::router::Router;
use crate::settings::ApiConfig;

/// The network-call interface: (target, options) to a response future.
///
/// Both the real network and the interceptor implement this, so composition
/// is explicit; callers choose which transport to hold instead of anything
/// mutating an ambient global.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn fetch(&self, url: &Url, options: RequestOptions) -> Result<Response>;
}

/// Wraps an inner transport and redirects calls matching the API base prefix
/// to the router, after a simulated latency delay. Everything else is
/// forwarded to the inner transport with the original arguments.
pub struct MockInterceptor<T> {
    inner: T,
    router: Router,
    base_prefix: String,
    path_prefix: String,
    latency: Duration,
}

impl<T: HttpTransport> MockInterceptor<T> {
    pub fn new(inner: T, router: Router, config: &ApiConfig) -> Self {
        Self {
            inner,
            router,
            base_prefix: config.base_url.clone(),
            path_prefix: config.path_prefix.clone(),
            latency: Duration::from_millis(config.latency_ms),
        }
    }

    /// The router handling intercepted calls.
    pub fn router(&self) -> &Router {
        &self.router
    }
}

#[async_trait]
impl<T: HttpTransport> HttpTransport for MockInterceptor<T> {
    async fn fetch(&self, url: &Url, options: RequestOptions) -> Result<Response> {
        if !url.as_str().starts_with(&self.base_prefix) {
            return self.inner.fetch(url, options).await;
        }

        info!("Intercepted {} {}", options.method, url);

        // Simulated network latency; a timer suspension, never a blocking
        // sleep, so concurrent work proceeds while the call is in flight.
        sleep(self.latency).await;

        let request = RequestDescriptor::from_parts(url, &options, &self.path_prefix);
        self.router.dispatch(&request)
    }
}

/// Inner transport for setups without a real backend: any call that escapes
/// interception is reported as a network fault.
pub struct OfflineTransport;

#[async_trait]
impl HttpTransport for OfflineTransport {
    async fn fetch(&self, url: &Url, _options: RequestOptions) -> Result<Response> {
        Err(anyhow!("no network transport configured for {url}"))
    }
}
