//! HTTP client trait and implementations.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::FetchError;

/// Many recipe sites refuse requests that don't look like a desktop browser.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for HTTP clients, enabling mockability in tests.
///
/// Implementations make exactly one request per call. Retrying is up to the caller.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Fetch a page's HTML. Any status other than 200 is an error.
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError>;
}

/// Configuration for BrowserClient.
#[derive(Clone)]
pub struct BrowserClientBuilder {
    timeout: Duration,
    user_agent: String,
}

impl Default for BrowserClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserClientBuilder {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn build(self) -> Result<BrowserClient, reqwest::Error> {
        let inner = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()?;

        Ok(BrowserClient { inner })
    }
}

/// Production client: reqwest with a browser identity and a request timeout.
pub struct BrowserClient {
    inner: reqwest::Client,
}

impl BrowserClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        BrowserClientBuilder::new().build()
    }

    pub fn builder() -> BrowserClientBuilder {
        BrowserClientBuilder::new()
    }
}

#[async_trait]
impl HttpClient for BrowserClient {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        tracing::debug!(url, "network: fetching");
        let response = self.inner.get(parsed).send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            tracing::debug!(url, status = %status, "network: request failed");
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let html = response.text().await?;
        tracing::debug!(url, bytes = html.len(), "network: fetched successfully");
        Ok(html)
    }
}

/// Mock response for testing.
#[derive(Clone, Debug)]
pub enum MockResponse {
    Html(String),
    Status(u16),
    Timeout,
    ConnectionRefused,
}

impl MockResponse {
    fn to_result(&self, url: &str) -> Result<String, FetchError> {
        match self {
            MockResponse::Html(html) => Ok(html.clone()),
            MockResponse::Status(code) => Err(FetchError::HttpStatus(*code)),
            MockResponse::Timeout => Err(FetchError::Timeout(format!("mock timeout: {}", url))),
            MockResponse::ConnectionRefused => {
                Err(FetchError::Connection(format!("mock connection refused: {}", url)))
            }
        }
    }
}

/// Mock HTTP client for testing.
///
/// Several responses registered for one URL are served in order; the last
/// one repeats. Unknown URLs fail with a connection error. Every request is
/// recorded so tests can assert whether the network was touched.
#[derive(Default)]
pub struct MockClient {
    responses: Mutex<HashMap<String, VecDeque<MockResponse>>>,
    requests: Mutex<Vec<String>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for a URL.
    pub fn with_response(self, url: &str, response: MockResponse) -> Self {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(url.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub fn with_html(self, url: &str, html: &str) -> Self {
        self.with_response(url, MockResponse::Html(html.to_string()))
    }

    pub fn with_status(self, url: &str, status: u16) -> Self {
        self.with_response(url, MockResponse::Status(status))
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests().len()
    }
}

#[async_trait]
impl HttpClient for MockClient {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.to_string());

        let mut responses = self.responses.lock().unwrap_or_else(|e| e.into_inner());
        let response = match responses.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        match response {
            Some(response) => response.to_result(url),
            None => Err(FetchError::Connection(format!(
                "No mock response for URL: {}",
                url
            ))),
        }
    }
}
