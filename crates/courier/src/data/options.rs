use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use bytes::Bytes;
use url::Url;

use crate::error::{Error, Result};

/// Default ceiling for buffered response bodies (50 MB).
pub const DEFAULT_MAX_BUFFER: usize = 50 * 1_000_000;

/// URL schemes the executor can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    /// Parse a scheme, failing with [`Error::UnsupportedProtocol`] for
    /// anything other than `http` or `https`.
    pub fn from_scheme(scheme: &str) -> Result<Self> {
        match scheme.to_ascii_lowercase().as_str() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            _ => Err(Error::UnsupportedProtocol(format!("{scheme}:"))),
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response content codings the executor can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentEncoding {
    Gzip,
    Deflate,
}

impl ContentEncoding {
    /// Every supported coding, in the order advertised in `accept-encoding`.
    pub const SUPPORTED: [ContentEncoding; 2] = [ContentEncoding::Gzip, ContentEncoding::Deflate];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentEncoding::Gzip => "gzip",
            ContentEncoding::Deflate => "deflate",
        }
    }

    /// Match a `content-encoding` header value exactly.
    pub fn from_header(value: &str) -> Option<Self> {
        match value {
            "gzip" => Some(ContentEncoding::Gzip),
            "deflate" => Some(ContentEncoding::Deflate),
            _ => None,
        }
    }

    /// The `accept-encoding` value advertising every supported coding.
    pub fn accept_header() -> String {
        Self::SUPPORTED
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ContentEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response handling configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseOptions {
    /// Maximum number of body bytes held when buffering.
    ///
    /// `None` disables the limit.
    ///
    /// Default: 50,000,000
    pub max_buffer: Option<usize>,
}

impl Default for ResponseOptions {
    fn default() -> Self {
        Self {
            max_buffer: Some(DEFAULT_MAX_BUFFER),
        }
    }
}

/// Fully resolved options for a single transport call.
///
/// Built from the request's URL, method and headers, then overlaid with the
/// request's raw overrides. Keys the executor recognizes land in typed
/// fields; anything else is carried verbatim in [`extra`](Self::extra) for
/// transports that understand it.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportOptions {
    pub scheme: Scheme,
    pub host: String,
    /// Explicit port; `None` means the scheme default.
    pub port: Option<u16>,
    /// Path plus query string, e.g. `/a/b?x=1`.
    pub path: String,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Bytes>,
    pub connect_timeout: Option<Duration>,
    pub local_address: Option<IpAddr>,
    pub proxy: Option<Url>,
    pub user_agent: Option<String>,
    /// Overrides with no typed counterpart.
    pub extra: BTreeMap<String, String>,
}

impl TransportOptions {
    /// Compute the default options for `url`.
    pub fn from_url(
        url: &Url,
        method: &str,
        headers: BTreeMap<String, String>,
        body: Option<Bytes>,
    ) -> Result<Self> {
        let scheme = Scheme::from_scheme(url.scheme())?;
        let host = url.host_str().unwrap_or_default().to_string();
        let mut path = url.path().to_string();
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(query);
        }

        Ok(Self {
            scheme,
            host,
            port: url.port(),
            path,
            method: method.to_string(),
            headers,
            body,
            connect_timeout: None,
            local_address: None,
            proxy: None,
            user_agent: None,
            extra: BTreeMap::new(),
        })
    }

    /// Apply one raw override on top of the computed options.
    pub fn apply_override(&mut self, name: &str, value: &str) -> Result<()> {
        let invalid = || Error::InvalidOption {
            name: name.to_string(),
            value: value.to_string(),
        };

        match name {
            "host" => self.host = value.to_string(),
            "port" => self.port = Some(value.parse().map_err(|_| invalid())?),
            "path" => self.path = value.to_string(),
            "method" => self.method = value.to_ascii_uppercase(),
            "connect_timeout_ms" => {
                let ms: u64 = value.parse().map_err(|_| invalid())?;
                self.connect_timeout = Some(Duration::from_millis(ms));
            }
            "local_address" => self.local_address = Some(value.parse().map_err(|_| invalid())?),
            "proxy" => self.proxy = Some(Url::parse(value).map_err(|_| invalid())?),
            "user_agent" => self.user_agent = Some(value.to_string()),
            _ => {
                self.extra.insert(name.to_string(), value.to_string());
            }
        }
        Ok(())
    }

    /// The `host[:port]` authority. Hosts taken from a parsed URL already
    /// carry IPv6 brackets.
    pub fn authority(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.host, port),
            None => self.host.clone(),
        }
    }

    /// The absolute URL these options address.
    pub fn target(&self) -> String {
        format!("{}://{}{}", self.scheme, self.authority(), self.path)
    }

    /// Whether any per-call client setting was overridden.
    pub fn has_client_overrides(&self) -> bool {
        self.connect_timeout.is_some()
            || self.local_address.is_some()
            || self.proxy.is_some()
            || self.user_agent.is_some()
    }
}
