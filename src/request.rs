use bytes::Bytes;
use reqwest::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    Method,
};

/// A single logical API call, replayable across retry attempts.
///
/// Built by [`crate::IseClient::request`] with the default JSON headers;
/// the modifiers below are applied afterwards and override them.
#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    url: String,
    body: Option<Bytes>,
    headers: HeaderMap,
    log_payload: bool,
}

impl Request {
    pub(crate) fn new(method: Method, url: String) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Self {
            method,
            url,
            body: None,
            headers,
            log_payload: true,
        }
    }

    /// Sets the request payload.
    pub fn body(mut self, data: impl Into<Bytes>) -> Self {
        self.body = Some(data.into());
        self
    }

    /// Sets a header, replacing any previous value.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Keeps the payload out of diagnostic logs.
    pub fn no_log_payload(self) -> Self {
        self.log_payload(false)
    }

    pub fn log_payload(mut self, enabled: bool) -> Self {
        self.log_payload = enabled;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Retained payload bytes.
    pub fn payload(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn logs_payload(&self) -> bool {
        self.log_payload
    }

    /// Fresh transport body for one attempt.
    pub(crate) fn attempt_body(&self) -> Option<reqwest::Body> {
        self.body.clone().map(reqwest::Body::from)
    }

    pub(crate) fn payload_text(&self) -> String {
        self.payload()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default()
    }
}
