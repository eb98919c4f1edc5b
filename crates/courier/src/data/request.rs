use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use url::Url;

use super::body::{Body, BodyData, EncodeAs};
use super::options::{ContentEncoding, ResponseOptions};
use crate::core::{encode_body, join_path};
use crate::error::{Error, Result};

/// Declarative description of one HTTP request.
///
/// Every builder method consumes the request and hands it back, so calls
/// chain; none of them perform I/O. [`Executor::send`](crate::Executor::send)
/// takes the request by value, which makes each request single-use.
///
/// # Examples
///
/// ```
/// use courier::Request;
/// use serde_json::json;
///
/// let request = Request::post("http://example.com/api")?
///     .path("v1/items")
///     .query("page", "2")
///     .header("X-Trace", "abc")
///     .body(json!({ "name": "widget" }))
///     .compress()
///     .timeout(std::time::Duration::from_secs(5));
///
/// assert_eq!(request.url().as_str(), "http://example.com/api/v1/items?page=2");
/// assert_eq!(request.get_header("x-trace"), Some("abc"));
/// # Ok::<(), courier::Error>(())
/// ```
#[derive(Clone)]
#[must_use]
pub struct Request {
    parts: RequestParts,
}

/// The frozen contents of a [`Request`], as consumed by the executor.
#[derive(Debug, Clone)]
pub struct RequestParts {
    pub url: Url,
    /// Upper-cased method token.
    pub method: String,
    /// Lower-cased header name to value.
    pub headers: BTreeMap<String, String>,
    pub body: Option<Body>,
    pub stream: bool,
    pub compress: bool,
    /// `None` means no deadline.
    pub timeout: Option<Duration>,
    /// Raw transport overrides, applied after the computed options.
    pub overrides: BTreeMap<String, String>,
    pub response: ResponseOptions,
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.parts.method)
            .field("url", &self.parts.url.as_str())
            .field("headers", &self.parts.headers)
            .field("body", &self.parts.body.as_ref().map(|b| (b.encoding(), b.len())))
            .field("stream", &self.parts.stream)
            .field("compress", &self.parts.compress)
            .field("timeout", &self.parts.timeout)
            .finish()
    }
}

impl Request {
    /// Parse `url` and start a request with `method`.
    pub fn new(url: &str, method: impl AsRef<str>) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|source| Error::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        Ok(Self::from_url(parsed, method))
    }

    /// Start a request from an already parsed URL.
    pub fn from_url(url: Url, method: impl AsRef<str>) -> Self {
        Self {
            parts: RequestParts {
                url,
                method: method.as_ref().to_ascii_uppercase(),
                headers: BTreeMap::new(),
                body: None,
                stream: false,
                compress: false,
                timeout: None,
                overrides: BTreeMap::new(),
                response: ResponseOptions::default(),
            },
        }
    }

    pub fn get(url: &str) -> Result<Self> {
        Self::new(url, "GET")
    }

    pub fn post(url: &str) -> Result<Self> {
        Self::new(url, "POST")
    }

    pub fn put(url: &str) -> Result<Self> {
        Self::new(url, "PUT")
    }

    pub fn patch(url: &str) -> Result<Self> {
        Self::new(url, "PATCH")
    }

    pub fn delete(url: &str) -> Result<Self> {
        Self::new(url, "DELETE")
    }

    pub fn head(url: &str) -> Result<Self> {
        Self::new(url, "HEAD")
    }

    /// Append one query parameter. Existing parameters with the same name
    /// are kept.
    pub fn query(mut self, key: impl AsRef<str>, value: impl ToString) -> Self {
        self.parts
            .url
            .query_pairs_mut()
            .append_pair(key.as_ref(), &value.to_string());
        self
    }

    /// Append several query parameters in iteration order.
    pub fn query_pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: ToString,
    {
        {
            let mut serializer = self.parts.url.query_pairs_mut();
            for (key, value) in pairs {
                serializer.append_pair(key.as_ref(), &value.to_string());
            }
        }
        self
    }

    /// Join `segment` onto the current path, normalizing `.`, `..` and
    /// repeated separators.
    pub fn path(mut self, segment: &str) -> Self {
        let joined = join_path(self.parts.url.path(), segment);
        self.parts.url.set_path(&joined);
        self
    }

    /// Set the body, inferring its encoding: structured values become JSON,
    /// text and bytes are sent as-is.
    pub fn body(mut self, data: impl Into<BodyData>) -> Self {
        self.parts.body = Some(encode_body(data.into(), None));
        self
    }

    /// Set the body with an explicit encoding.
    pub fn body_as(mut self, data: impl Into<BodyData>, encoding: EncodeAs) -> Self {
        self.parts.body = Some(encode_body(data.into(), Some(encoding)));
        self
    }

    /// Set one header. Names are stored lower-cased; the last value wins.
    pub fn header(mut self, name: impl AsRef<str>, value: impl ToString) -> Self {
        self.parts
            .headers
            .insert(name.as_ref().to_ascii_lowercase(), value.to_string());
        self
    }

    /// Set several headers.
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: ToString,
    {
        for (name, value) in headers {
            self.parts
                .headers
                .insert(name.as_ref().to_ascii_lowercase(), value.to_string());
        }
        self
    }

    /// Set the request deadline. A zero duration disables it.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.parts.timeout = (!duration.is_zero()).then_some(duration);
        self
    }

    /// Record a raw transport option. Overrides win over the options the
    /// executor computes from the URL, method and headers.
    pub fn option(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.parts.overrides.insert(name.into(), value.to_string());
        self
    }

    /// Resolve with a live byte stream instead of a buffered response.
    pub fn stream(mut self) -> Self {
        self.parts.stream = true;
        self
    }

    /// Negotiate gzip/deflate and decode matching responses transparently.
    pub fn compress(mut self) -> Self {
        self.parts.compress = true;
        self.parts
            .headers
            .entry("accept-encoding".to_string())
            .or_insert_with(ContentEncoding::accept_header);
        self
    }

    /// Set the buffering ceiling. `None` disables it.
    pub fn max_buffer(mut self, max_buffer: Option<usize>) -> Self {
        self.parts.response.max_buffer = max_buffer;
        self
    }

    pub fn url(&self) -> &Url {
        &self.parts.url
    }

    pub fn method(&self) -> &str {
        &self.parts.method
    }

    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.parts
            .headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn header_map(&self) -> &BTreeMap<String, String> {
        &self.parts.headers
    }

    pub fn encoded_body(&self) -> Option<&Body> {
        self.parts.body.as_ref()
    }

    pub fn into_parts(self) -> RequestParts {
        self.parts
    }
}
