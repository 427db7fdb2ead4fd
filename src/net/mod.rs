//! Network utilities for HTTP requests, rate limiting, and content parsing.
//!
//! This module provides the request plumbing every adapter shares:
//!
//! - **Requests**: [`Request`] describes one call (method, headers, cookies, body)
//! - **Scheduling**: [`HttpClient::schedule`] sends it and hands back a [`Response`]
//!   with the raw body and status code
//! - **Rate Limiting**: Per-source throttling configured by [`RequestManager`]
//! - **Retry Logic**: Automatic retries with exponential backoff on 429s
//! - **Content Parsing**: HTML and JSON helpers in [`html`] and [`json`]
//!
//! # Examples
//!
//! ```rust
//! use shiori::net::{HttpClient, Request};
//!
//! # async fn example() -> shiori::Result<()> {
//! let client = HttpClient::new("my_source")
//!     .with_requests_per_second(2.0)
//!     .with_max_retries(3);
//!
//! let html = client.get_text("https://example.com").await?;
//! let response = client
//!     .schedule(Request::post("https://example.com/wp-admin/admin-ajax.php").form("action=ping"))
//!     .await?;
//! println!("{} -> {}", response.status, response.text()?);
//! # Ok(())
//! # }
//! ```

use bytes::Bytes;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use reqwest::{Client, Method, header::HeaderMap};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub mod html;
pub mod json;

/// Global HTTP client instance.
///
/// Timeouts are applied per request from each source's [`RequestManager`], so the
/// client itself only carries an upper bound.
static CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(60))
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
        .pool_max_idle_per_host(10)
        .gzip(true)
        .brotli(true)
        .build()
        .expect("Failed to build HTTP client")
});

/// Static request configuration of a source: how many requests per second it
/// may send and how long a single request may take.
///
/// ```rust
/// use shiori::net::RequestManager;
/// use std::time::Duration;
///
/// let manager = RequestManager::new(4.0, Duration::from_secs(15));
/// assert_eq!(manager.min_delay(), Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestManager {
    pub requests_per_second: f64,
    pub timeout: Duration,
}

impl RequestManager {
    pub fn new(requests_per_second: f64, timeout: Duration) -> Self {
        Self {
            requests_per_second,
            timeout,
        }
    }

    /// Minimum spacing between two requests.
    pub fn min_delay(&self) -> Duration {
        if self.requests_per_second <= 0.0 {
            return Duration::ZERO;
        }
        Duration::from_millis((1000.0 / self.requests_per_second).ceil() as u64)
    }
}

impl Default for RequestManager {
    fn default() -> Self {
        Self {
            requests_per_second: 2.5,
            timeout: Duration::from_millis(5000),
        }
    }
}

/// A cookie attached to a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// `application/x-www-form-urlencoded` payload
    Form(String),
    Json(serde_json::Value),
}

/// Description of one HTTP call.
///
/// ```rust
/// use shiori::net::{Cookie, Request};
///
/// let request = Request::get("https://example.com/manga/abc")
///     .header("referer", "https://example.com")
///     .cookie(Cookie::new("wpmanga-adault", "1", "https://example.com"));
/// assert_eq!(request.cookie_header().as_deref(), Some("wpmanga-adault=1"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub url: String,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub cookies: Vec<Cookie>,
    pub body: Option<Body>,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: Vec::new(),
            cookies: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn cookie(mut self, cookie: Cookie) -> Self {
        self.cookies.push(cookie);
        self
    }

    /// Sets a form-encoded body.
    pub fn form(mut self, body: impl Into<String>) -> Self {
        self.body = Some(Body::Form(body.into()));
        self
    }

    /// Sets a JSON body.
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(Body::Json(body));
        self
    }

    /// The `Cookie` header value for the attached cookies, if any.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|c| format!("{}={}", c.name, c.value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// Raw result of a scheduled request.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub data: Bytes,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body as a UTF-8 string.
    pub fn text(&self) -> crate::Result<String> {
        String::from_utf8(self.data.to_vec())
            .map_err(|e| crate::Error::parse(format!("Invalid UTF-8: {}", e)))
    }

    /// The body deserialized as JSON.
    pub fn json<T>(&self) -> crate::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_slice(&self.data).map_err(Into::into)
    }
}

/// Per-source rate limiter to prevent overwhelming manga websites.
///
/// The rate limiter tracks the last request time for each source and enforces
/// a minimum delay between requests.
#[derive(Debug)]
pub struct RateLimiter {
    last_request: Mutex<HashMap<String, Instant>>,
    default_delay: Duration,
}

impl Clone for RateLimiter {
    fn clone(&self) -> Self {
        Self {
            last_request: Mutex::new(HashMap::new()),
            default_delay: self.default_delay,
        }
    }
}

impl RateLimiter {
    /// Creates a new rate limiter with the specified default delay.
    ///
    /// ```rust
    /// use shiori::net::RateLimiter;
    ///
    /// let limiter = RateLimiter::new(500);
    /// ```
    pub fn new(delay_ms: u64) -> Self {
        Self::with_delay(Duration::from_millis(delay_ms))
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            last_request: Mutex::new(HashMap::new()),
            default_delay: delay,
        }
    }

    /// Waits if necessary before allowing a request for the specified source.
    ///
    /// ```rust
    /// use shiori::net::RateLimiter;
    ///
    /// # async fn example() {
    /// let limiter = RateLimiter::new(1000);
    /// limiter.wait("mangadex").await;
    /// # }
    /// ```
    pub async fn wait(&self, source_id: &str) {
        self.wait_custom(source_id, self.default_delay).await
    }

    /// Waits with a custom delay for a specific source.
    pub async fn wait_custom(&self, source_id: &str, delay: Duration) {
        let now = Instant::now();
        let wait_duration = {
            let last_map = self.last_request.lock();
            last_map.get(source_id).and_then(|&last| {
                let elapsed = now.duration_since(last);
                (elapsed < delay).then(|| delay - elapsed)
            })
        };

        if let Some(duration) = wait_duration {
            tokio::time::sleep(duration).await;
        }

        self.last_request
            .lock()
            .insert(source_id.to_string(), Instant::now());
    }
}

/// HTTP client wrapper with built-in rate limiting and retry logic.
///
/// Each client belongs to one source. It applies that source's request rate,
/// timeout and default headers to every request it sends.
///
/// # Examples
///
/// ```rust
/// use shiori::net::{HttpClient, RequestManager};
/// use std::time::Duration;
///
/// # async fn example() -> shiori::Result<()> {
/// let client = HttpClient::new("mangadex")
///     .with_manager(RequestManager::new(4.0, Duration::from_secs(15)))
///     .with_max_retries(5);
///
/// let json: serde_json::Value = client.get_json("https://api.mangadex.org/manga?limit=1").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct HttpClient {
    source_id: String,
    rate_limiter: RateLimiter,
    timeout: Duration,
    max_retries: u32,
    headers: HeaderMap,
    cookies: Vec<Cookie>,
}

impl HttpClient {
    /// Creates a new HTTP client for the specified source with the default
    /// [`RequestManager`] and 3 retries.
    pub fn new(source_id: impl Into<String>) -> Self {
        let manager = RequestManager::default();
        Self {
            source_id: source_id.into(),
            rate_limiter: RateLimiter::with_delay(manager.min_delay()),
            timeout: manager.timeout,
            max_retries: 3,
            headers: HeaderMap::new(),
            cookies: Vec::new(),
        }
    }

    /// Sets the rate limit delay for this client in milliseconds.
    pub fn with_rate_limit(mut self, delay_ms: u64) -> Self {
        self.rate_limiter = RateLimiter::new(delay_ms);
        self
    }

    pub fn with_requests_per_second(mut self, requests_per_second: f64) -> Self {
        let manager = RequestManager::new(requests_per_second, self.timeout);
        self.rate_limiter = RateLimiter::with_delay(manager.min_delay());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Applies both rate and timeout from a [`RequestManager`].
    pub fn with_manager(self, manager: RequestManager) -> Self {
        self.with_requests_per_second(manager.requests_per_second)
            .with_timeout(manager.timeout)
    }

    /// Sets the maximum number of retries for failed requests.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Adds a custom header to all requests made by this client.
    ///
    /// ```rust
    /// use shiori::net::HttpClient;
    ///
    /// let client = HttpClient::new("source")
    ///     .with_header("Referer", "https://example.com");
    /// ```
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            name.parse::<reqwest::header::HeaderName>(),
            value.parse::<reqwest::header::HeaderValue>(),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Adds a cookie sent with every request made by this client.
    pub fn with_cookie(mut self, cookie: Cookie) -> Self {
        self.cookies.push(cookie);
        self
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    fn build(&self, request: &Request) -> reqwest::RequestBuilder {
        let mut builder = CLIENT
            .request(request.method.clone(), &request.url)
            .timeout(self.timeout)
            .headers(self.headers.clone());

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let cookies = self
            .cookies
            .iter()
            .chain(request.cookies.iter())
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>();
        if !cookies.is_empty() {
            builder = builder.header(reqwest::header::COOKIE, cookies.join("; "));
        }
        match &request.body {
            Some(Body::Form(form)) => {
                let has_content_type = request
                    .headers
                    .iter()
                    .any(|(name, _)| name.eq_ignore_ascii_case("content-type"));
                if !has_content_type {
                    builder = builder.header(
                        reqwest::header::CONTENT_TYPE,
                        "application/x-www-form-urlencoded; charset=UTF-8",
                    );
                }
                builder = builder.body(form.clone());
            }
            Some(Body::Json(value)) => builder = builder.json(value),
            None => {}
        }
        builder
    }

    /// Sends a request with rate limiting and retries, returning the raw response.
    ///
    /// Unlike [`get_text`](HttpClient::get_text), non-2xx statuses are returned
    /// as a [`Response`] so the caller can decide what they mean. A 429 is retried
    /// with exponential backoff and becomes [`Error::RateLimit`](crate::Error::RateLimit)
    /// once retries are exhausted.
    pub async fn schedule(&self, request: Request) -> crate::Result<Response> {
        let mut attempts = 0;

        loop {
            self.rate_limiter.wait(&self.source_id).await;
            debug!(source = %self.source_id, method = %request.method, url = %request.url, "sending request");

            match self.build(&request).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == 429 {
                        if attempts < self.max_retries {
                            attempts += 1;
                            let delay = Duration::from_secs(2_u64.pow(attempts));
                            warn!(source = %self.source_id, ?delay, "rate limited, backing off");
                            tokio::time::sleep(delay).await;
                            continue;
                        }

                        let retry_after = response
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok());

                        return Err(crate::Error::rate_limit(retry_after));
                    }

                    return Ok(Response {
                        status: status.as_u16(),
                        data: response.bytes().await?,
                    });
                }
                Err(e) => {
                    if attempts < self.max_retries {
                        attempts += 1;
                        warn!(source = %self.source_id, error = %e, attempt = attempts, "request failed, retrying");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }

    /// Sends a request and fails on any non-2xx status.
    pub async fn fetch(&self, request: Request) -> crate::Result<Response> {
        let response = self.schedule(request).await?;
        if !response.is_success() {
            return Err(crate::Error::source(
                &self.source_id,
                format!("HTTP {}", response.status),
            ));
        }
        Ok(response)
    }

    /// Performs a GET request and returns the response body bytes.
    pub async fn get(&self, url: &str) -> crate::Result<Bytes> {
        Ok(self.fetch(Request::get(url)).await?.data)
    }

    /// Performs a GET request and returns the response as a UTF-8 string.
    ///
    /// ```rust
    /// use shiori::net::HttpClient;
    ///
    /// # async fn example() -> shiori::Result<()> {
    /// let client = HttpClient::new("source");
    /// let html = client.get_text("https://example.com/manga/123").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_text(&self, url: &str) -> crate::Result<String> {
        self.fetch(Request::get(url)).await?.text()
    }

    /// Performs a GET request and deserializes the response as JSON.
    pub async fn get_json<T>(&self, url: &str) -> crate::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.fetch(Request::get(url)).await?.json()
    }

    /// POSTs a form-encoded body and returns the response text.
    ///
    /// ```rust
    /// use shiori::net::HttpClient;
    ///
    /// # async fn example() -> shiori::Result<()> {
    /// let client = HttpClient::new("madara");
    /// let html = client
    ///     .post_form("https://example.com/wp-admin/admin-ajax.php", "action=manga_get_chapters&manga=42")
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn post_form(&self, url: &str, body: impl Into<String>) -> crate::Result<String> {
        self.fetch(Request::post(url).form(body)).await?.text()
    }

    /// Sends a request and returns the body as text, failing on non-2xx.
    pub async fn send_text(&self, request: Request) -> crate::Result<String> {
        self.fetch(request).await?.text()
    }

    /// Sends a request and deserializes the body as JSON, failing on non-2xx.
    pub async fn send_json<T>(&self, request: Request) -> crate::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.fetch(request).await?.json()
    }
}
