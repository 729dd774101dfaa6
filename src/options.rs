use std::time::Duration;

use crate::{BackoffPolicy, IseClient, Result};

/// Configures timeout, retry and TLS behavior.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientOptions {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of retries after the initial attempt.
    pub max_retries: usize,
    /// Minimum delay between two attempts in milliseconds.
    pub backoff_min_delay_ms: u64,
    /// Maximum delay between two attempts in milliseconds.
    pub backoff_max_delay_ms: u64,
    /// Exponential growth factor of the delay.
    pub backoff_delay_factor: f64,
    /// Skip TLS certificate verification.
    ///
    /// Defaults to `true`: ISE nodes usually present self-signed certificates.
    pub insecure: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 60_000,
            max_retries: 3,
            backoff_min_delay_ms: 2_000,
            backoff_max_delay_ms: 60_000,
            backoff_delay_factor: 3.0,
            insecure: true,
        }
    }
}

impl ClientOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy {
            min_delay: Duration::from_millis(self.backoff_min_delay_ms),
            max_delay: Duration::from_millis(self.backoff_max_delay_ms),
            factor: self.backoff_delay_factor,
        }
    }
}

/// Builds an [`IseClient`], applying overrides on top of the defaults in
/// call order.
///
/// ```no_run
/// use std::time::Duration;
/// use ise_http::IseClient;
///
/// let client = IseClient::builder("https://10.0.0.1", "admin", "secret")
///     .request_timeout(Duration::from_secs(120))
///     .max_retries(5)
///     .build()?;
/// # Ok::<(), ise_http::IseError>(())
/// ```
#[derive(Clone)]
pub struct ClientBuilder {
    pub(crate) url: String,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) options: ClientOptions,
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

impl ClientBuilder {
    pub(crate) fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
            options: ClientOptions::default(),
        }
    }

    /// Replaces every option at once.
    pub fn options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Allows or forbids TLS connections with unverified certificates.
    pub fn insecure(mut self, insecure: bool) -> Self {
        self.options.insecure = insecure;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.options.max_retries = max_retries;
        self
    }

    pub fn backoff_min_delay(mut self, delay: Duration) -> Self {
        self.options.backoff_min_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn backoff_max_delay(mut self, delay: Duration) -> Self {
        self.options.backoff_max_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn backoff_delay_factor(mut self, factor: f64) -> Self {
        self.options.backoff_delay_factor = factor;
        self
    }

    /// Creates the client and its connection pool.
    pub fn build(self) -> Result<IseClient> {
        IseClient::from_builder(self)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{ClientBuilder, ClientOptions};

    #[test]
    fn defaults_match_ers_client_conventions() {
        let options = ClientOptions::default();
        assert_eq!(options.timeout(), Duration::from_secs(60));
        assert_eq!(options.max_retries, 3);
        assert_eq!(options.backoff().min_delay, Duration::from_secs(2));
        assert_eq!(options.backoff().max_delay, Duration::from_secs(60));
        assert_eq!(options.backoff().factor, 3.0);
        assert!(options.insecure);
    }

    #[test]
    fn later_overrides_win() {
        let builder = ClientBuilder::new("https://ise", "usr", "pwd")
            .max_retries(7)
            .options(ClientOptions {
                max_retries: 1,
                ..ClientOptions::default()
            })
            .request_timeout(Duration::from_secs(120))
            .max_retries(2)
            .insecure(false);

        assert_eq!(builder.options.max_retries, 2);
        assert_eq!(builder.options.timeout_ms, 120_000);
        assert!(!builder.options.insecure);
    }

    #[test]
    fn debug_redacts_password() {
        let debug = format!("{:?}", ClientBuilder::new("https://ise", "usr", "hunter2"));
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("hunter2"));
    }
}
