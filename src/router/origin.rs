use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client};

use crate::store::{CachedResponse, Method, Request};

/// HTTP request timeout in seconds.
/// 30s allows for slow responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// A response as it came off the network, before any caching decision.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchedResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Stamp this response into its cacheable representation.
    pub fn into_cached(self) -> CachedResponse {
        CachedResponse::new(self.status, self.content_type, self.body)
    }
}

/// The network seam the router fetches through.
///
/// Production uses `HttpOrigin`; tests script one that counts calls and
/// can be taken offline.
#[async_trait]
pub trait Origin: Send + Sync {
    /// Perform the request once. An `Err` means the network itself failed
    /// (unreachable, timeout); HTTP error statuses come back as `Ok` with
    /// the status set.
    async fn fetch(&self, request: &Request) -> Result<FetchedResponse>;
}

/// `reqwest`-backed origin. Relative request URLs are resolved against
/// the configured base URL so the router can work with the same
/// path-shaped manifest the original app shipped.
pub struct HttpOrigin {
    client: Client,
    base_url: String,
}

impl HttpOrigin {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn absolute(&self, url: &str) -> String {
        if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            url.to_string()
        }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Head => reqwest::Method::HEAD,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Patch => reqwest::Method::PATCH,
    }
}

#[async_trait]
impl Origin for HttpOrigin {
    async fn fetch(&self, request: &Request) -> Result<FetchedResponse> {
        let url = self.absolute(&request.url);
        let response = self
            .client
            .request(to_reqwest_method(request.method), &url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?
            .to_vec();

        Ok(FetchedResponse {
            status,
            content_type,
            body,
        })
    }
}
