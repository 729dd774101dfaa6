use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::{
    header::{self, HeaderMap},
    Method, StatusCode,
};
use tracing::Instrument;

use crate::{
    backoff::should_retry, BackoffPolicy, ClientBuilder, ClientOptions, Document, IseError,
    Request, Result,
};

/// Path of the first error title in an ERS error body.
pub const ERROR_MESSAGE_PATH: &str = "ERSResponse.messages.0.title";

/// Joins a base URL and a resource path with exactly one `/` between them.
///
/// Example: `("https://10.0.0.1/", "/ers/config/internaluser")` →
/// `"https://10.0.0.1/ers/config/internaluser"`
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_owned()
    } else if path.starts_with('?') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Statuses that signal a transient condition worth retrying.
pub fn is_retryable_status(status: u16) -> bool {
    status == StatusCode::REQUEST_TIMEOUT.as_u16()
        || (StatusCode::BAD_GATEWAY.as_u16()..=StatusCode::GATEWAY_TIMEOUT.as_u16())
            .contains(&status)
}

#[derive(Clone)]
/// HTTP client for the ISE ERS REST API.
pub struct IseClient {
    http: reqwest::Client,
    url: String,
    username: String,
    password: String,
    options: ClientOptions,
}

impl fmt::Debug for IseClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IseClient")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

impl IseClient {
    /// Creates a client with default options.
    ///
    /// `url` is the ISE node, e.g. `https://10.0.0.1:9060`; a trailing `/`
    /// is accepted.
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        Self::builder(url, username, password).build()
    }

    /// Starts a [`ClientBuilder`] for non-default options.
    pub fn builder(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> ClientBuilder {
        ClientBuilder::new(url, username, password)
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `ISE_URL`, `ISE_USERNAME`, `ISE_PASSWORD` (required, non-empty)
    /// - `ISE_INSECURE`, `ISE_MAX_RETRIES`, `ISE_TIMEOUT_MS` (optional)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| -> Result<String> {
            let value = lookup(name)
                .ok_or_else(|| IseError::Config(format!("missing {name} environment variable")))?;
            if value.trim().is_empty() {
                return Err(IseError::Config(format!("{name} is set but empty")));
            }
            Ok(value)
        };
        let url = required("ISE_URL")?;
        let username = required("ISE_USERNAME")?;
        let password = required("ISE_PASSWORD")?;

        let mut builder = Self::builder(url, username, password);
        if let Some(insecure) = parse_optional::<bool>(&lookup, "ISE_INSECURE")? {
            builder = builder.insecure(insecure);
        }
        if let Some(max_retries) = parse_optional::<usize>(&lookup, "ISE_MAX_RETRIES")? {
            builder = builder.max_retries(max_retries);
        }
        if let Some(timeout_ms) = parse_optional::<u64>(&lookup, "ISE_TIMEOUT_MS")? {
            builder = builder.request_timeout(Duration::from_millis(timeout_ms));
        }
        builder.build()
    }

    pub(crate) fn from_builder(builder: ClientBuilder) -> Result<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(builder.options.insecure)
            .build()
            .map_err(IseError::Build)?;
        Ok(Self {
            http,
            url: builder.url,
            username: builder.username,
            password: builder.password,
            options: builder.options,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn set_max_retries(&mut self, max_retries: usize) {
        self.options.max_retries = max_retries;
    }

    pub fn set_request_timeout(&mut self, timeout: Duration) {
        self.options.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
    }

    pub fn set_backoff(&mut self, policy: BackoffPolicy) {
        self.options.backoff_min_delay_ms =
            u64::try_from(policy.min_delay.as_millis()).unwrap_or(u64::MAX);
        self.options.backoff_max_delay_ms =
            u64::try_from(policy.max_delay.as_millis()).unwrap_or(u64::MAX);
        self.options.backoff_delay_factor = policy.factor;
    }

    /// Builds a request for `path` relative to the base URL.
    ///
    /// ```no_run
    /// # async fn run(client: ise_http::IseClient) -> ise_http::Result<()> {
    /// use ise_http::Method;
    ///
    /// let request = client
    ///     .request(Method::POST, "/ers/config/internaluser")
    ///     .body(r#"{"InternalUser":{"password":"s3cret"}}"#)
    ///     .no_log_payload();
    /// let res = client.execute(request).await?;
    /// println!("{}", res.get("ERSResponse.operation").str());
    /// # Ok(())
    /// # }
    /// ```
    pub fn request(&self, method: Method, path: &str) -> Request {
        Request::new(method, join_url(&self.url, path))
    }

    /// Makes a GET request. The document holds the data as returned by ISE.
    pub async fn get(&self, path: &str) -> Result<Document> {
        self.execute(self.request(Method::GET, path)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Document> {
        self.execute(self.request(Method::DELETE, path)).await
    }

    /// Makes a POST request; [`crate::Body`] helps build `data`.
    pub async fn post(&self, path: &str, data: impl Into<String>) -> Result<Document> {
        self.execute(self.request(Method::POST, path).body(data.into())).await
    }

    /// Makes a POST request and also returns the `Location` header.
    ///
    /// ISE answers resource creation with an empty body; the new
    /// resource's URL is only reported in `Location`.
    pub async fn post_with_location(
        &self,
        path: &str,
        data: impl Into<String>,
    ) -> Result<(Document, Option<String>)> {
        let request = self.request(Method::POST, path).body(data.into());
        let (document, headers) = self.send_with_retry(&request).await?;
        let location = headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        Ok((document, location))
    }

    /// Makes a PUT request; [`crate::Body`] helps build `data`.
    pub async fn put(&self, path: &str, data: impl Into<String>) -> Result<Document> {
        self.execute(self.request(Method::PUT, path).body(data.into())).await
    }

    /// Sends `request`, retrying transient failures.
    ///
    /// Connection and body-read failures, and the statuses 408 and 502-504,
    /// are retried up to `max_retries` times with jittered exponential
    /// backoff. Any other non-2xx status fails immediately.
    pub async fn execute(&self, request: Request) -> Result<Document> {
        self.send_with_retry(&request)
            .await
            .map(|(document, _)| document)
    }

    async fn send_with_retry(&self, request: &Request) -> Result<(Document, HeaderMap)> {
        let span = tracing::debug_span!(
            "ise_request",
            method = %request.method(),
            url = %request.url()
        );
        self.retry_loop(request).instrument(span).await
    }

    async fn retry_loop(&self, request: &Request) -> Result<(Document, HeaderMap)> {
        let backoff = self.options.backoff();
        let max_retries = self.options.max_retries;
        let mut attempt = 0usize;

        loop {
            if request.logs_payload() {
                tracing::debug!(body = %request.payload_text(), "HTTP Request");
            } else {
                tracing::debug!("HTTP Request");
            }

            let mut builder = self
                .http
                .request(request.method().clone(), request.url())
                .basic_auth(&self.username, Some(&self.password))
                .headers(request.headers().clone())
                .timeout(self.options.timeout());
            if let Some(body) = request.attempt_body() {
                builder = builder.body(body);
            }

            let response = match builder.send().await {
                Ok(response) => response,
                Err(err) => {
                    if should_retry(attempt, max_retries) {
                        tracing::error!(error = %err, retries = attempt, "HTTP Connection failed");
                        backoff.wait(attempt).await;
                        attempt += 1;
                        continue;
                    }
                    tracing::error!(error = ?err, "HTTP Connection error occurred");
                    return Err(IseError::Transport(err));
                }
            };

            let status = response.status();
            let headers = response.headers().clone();
            let payload = match response.bytes().await {
                Ok(payload) => payload,
                Err(err) => {
                    if should_retry(attempt, max_retries) {
                        tracing::error!(
                            error = %err,
                            retries = attempt,
                            "Cannot read response body"
                        );
                        backoff.wait(attempt).await;
                        attempt += 1;
                        continue;
                    }
                    tracing::error!(error = ?err, "Cannot read response body");
                    return Err(IseError::Read(err));
                }
            };

            let document = Document::parse(&payload);
            if request.logs_payload() {
                tracing::debug!(status = status.as_u16(), body = %document.raw(), "HTTP Response");
            } else {
                tracing::debug!(status = status.as_u16(), "HTTP Response");
            }

            if status.is_success() {
                return Ok((document, headers));
            }

            let status = status.as_u16();
            let message = document.get(ERROR_MESSAGE_PATH).str().to_owned();
            if is_retryable_status(status) && should_retry(attempt, max_retries) {
                tracing::error!(
                    status,
                    message = %message,
                    retries = attempt,
                    "HTTP Request failed"
                );
                backoff.wait(attempt).await;
                attempt += 1;
                continue;
            }

            tracing::error!(status, message = %message, "HTTP Request failed");
            return Err(IseError::Http {
                status,
                message,
                document: Box::new(document),
            });
        }
    }
}

fn parse_optional<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>> {
    let Some(value) = lookup(name) else {
        return Ok(None);
    };
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<T>()
        .map(Some)
        .map_err(|_| IseError::Config(format!("{name} has an invalid value '{value}'")))
}
