use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

use crate::data::{ResponseHead, TransportOptions};
use crate::error::Result;

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// What a transport hands back once the response head has arrived.
pub struct TransportResponse {
    pub head: ResponseHead,
    /// Raw body chunks in arrival order. Dropping it aborts the exchange.
    pub body: BoxStream<'static, Result<Bytes>>,
}

impl TransportResponse {
    pub fn new(head: ResponseHead, body: BoxStream<'static, Result<Bytes>>) -> Self {
        Self { head, body }
    }
}

impl std::fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("head", &self.head)
            .finish_non_exhaustive()
    }
}

/// Asynchronous HTTP transport abstraction.
///
/// One call performs one exchange: write the request described by `options`
/// (including its body), then resolve once the response head is in.
/// Implementations must not follow redirects.
///
/// # Implementations
///
/// - [`ReqwestTransport`]: Production implementation using `reqwest`
/// - Mock implementations for testing
///
/// # Errors
///
/// Connection, DNS and TLS failures map to [`Error::Transport`](crate::Error::Transport).
/// A body that ends early maps to [`Error::AbortedByPeer`](crate::Error::AbortedByPeer).
pub trait Transport: Send + Sync {
    fn open(&self, options: TransportOptions) -> impl Future<Output = Result<TransportResponse>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::io;
    use std::task::{Context, Poll};

    use futures_util::StreamExt;
    use reqwest::header::{CONTENT_LENGTH, HeaderMap, HeaderName, HeaderValue};
    use reqwest::{Client, Method};
    use tracing::debug;

    use super::*;
    use crate::config::ClientConfig;
    use crate::error::Error;

    /// Production transport using `reqwest`.
    ///
    /// Requests without client-level overrides share one client; the others
    /// get a client built for that call alone.
    #[derive(Debug, Clone)]
    pub struct ReqwestTransport {
        client: Client,
        config: ClientConfig,
    }

    impl ReqwestTransport {
        pub fn new() -> Result<Self> {
            Self::from_config(ClientConfig::default())
        }

        pub fn from_config(config: ClientConfig) -> Result<Self> {
            let client = config.build()?;
            Ok(Self { client, config })
        }

        pub fn config(&self) -> &ClientConfig {
            &self.config
        }

        fn client_for(&self, options: &TransportOptions) -> Result<Client> {
            if !options.has_client_overrides() {
                return Ok(self.client.clone());
            }

            let mut cb = self.config.builder()?;
            if let Some(timeout) = options.connect_timeout {
                cb = cb.connect_timeout(timeout);
            }
            if let Some(addr) = options.local_address {
                cb = cb.local_address(addr);
            }
            if let Some(proxy) = &options.proxy {
                let proxy = reqwest::Proxy::all(proxy.as_str()).map_err(|_| Error::InvalidOption {
                    name: "proxy".to_string(),
                    value: proxy.to_string(),
                })?;
                cb = cb.proxy(proxy);
            }
            if let Some(agent) = &options.user_agent {
                cb = cb.user_agent(agent.as_str());
            }
            cb.build().map_err(Error::transport)
        }
    }

    fn header_map(headers: &std::collections::BTreeMap<String, String>) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| Error::InvalidHeader(name.clone()))?;
            let value =
                HeaderValue::from_str(value).map_err(|_| Error::InvalidHeader(name.to_string()))?;
            map.insert(name, value);
        }
        Ok(map)
    }

    fn response_head(response: &reqwest::Response) -> ResponseHead {
        let status = response.status();
        let mut head = ResponseHead::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown"),
        );
        for (name, value) in response.headers() {
            head.append_header(name.as_str(), &String::from_utf8_lossy(value.as_bytes()));
        }
        head
    }

    /// Whether a reqwest error was caused by the peer going away.
    fn is_peer_abort(err: &reqwest::Error) -> bool {
        let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
        while let Some(e) = source {
            if let Some(io_err) = e.downcast_ref::<io::Error>()
                && matches!(
                    io_err.kind(),
                    io::ErrorKind::ConnectionReset
                        | io::ErrorKind::ConnectionAborted
                        | io::ErrorKind::UnexpectedEof
                        | io::ErrorKind::BrokenPipe
                )
            {
                return true;
            }
            source = e.source();
        }
        false
    }

    /// Tracks body bytes against the declared `content-length` so an early
    /// close is reported as [`Error::AbortedByPeer`].
    struct BodyStream {
        inner: BoxStream<'static, reqwest::Result<Bytes>>,
        expected: Option<u64>,
        received: u64,
        done: bool,
    }

    impl Stream for BodyStream {
        type Item = Result<Bytes>;

        fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
            let this = self.get_mut();
            if this.done {
                return Poll::Ready(None);
            }

            match this.inner.poll_next_unpin(cx) {
                Poll::Pending => Poll::Pending,
                Poll::Ready(Some(Ok(chunk))) => {
                    this.received += chunk.len() as u64;
                    Poll::Ready(Some(Ok(chunk)))
                }
                Poll::Ready(Some(Err(e))) => {
                    this.done = true;
                    let short = this.expected.is_some_and(|n| this.received < n);
                    if short || is_peer_abort(&e) {
                        debug!(received = this.received, expected = ?this.expected, "peer closed mid-body");
                        Poll::Ready(Some(Err(Error::AbortedByPeer)))
                    } else {
                        Poll::Ready(Some(Err(Error::transport(e))))
                    }
                }
                Poll::Ready(None) => {
                    this.done = true;
                    if this.expected.is_some_and(|n| this.received < n) {
                        Poll::Ready(Some(Err(Error::AbortedByPeer)))
                    } else {
                        Poll::Ready(None)
                    }
                }
            }
        }
    }

    impl Transport for ReqwestTransport {
        async fn open(&self, options: TransportOptions) -> Result<TransportResponse> {
            let method = Method::from_bytes(options.method.as_bytes())
                .map_err(|_| Error::InvalidMethod(options.method.clone()))?;
            let is_head = method == Method::HEAD;
            let headers = header_map(&options.headers)?;

            for name in options.extra.keys() {
                debug!(option = %name, "transport option not understood by reqwest, ignoring");
            }

            let client = self.client_for(&options)?;
            let mut builder = client.request(method, options.target()).headers(headers);
            if let Some(body) = options.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(Error::transport)?;
            let head = response_head(&response);
            let bodiless = is_head || matches!(head.status, 204 | 304);
            let expected = head
                .header(CONTENT_LENGTH.as_str())
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|_| !bodiless);

            let body = BodyStream {
                inner: Box::pin(response.bytes_stream()),
                expected,
                received: 0,
                done: false,
            };
            Ok(TransportResponse::new(head, Box::pin(body)))
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestTransport;
